//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::Result;

use super::args::{ForestArgs, SearchArgs, ShowArgs, TreeArgs};
use crate::app::App;
use crate::domain::{IssueKey, IssueNode};
use crate::output::{self, OutputConfig, OutputMode};
use crate::remote::{FieldSelector, IssueSource};

/// Execute the tree command
pub async fn execute_tree(app: &App, args: &TreeArgs, output_mode: OutputMode) -> Result<()> {
    let key = IssueKey::new(&args.key);
    let tree = app
        .hierarchy()
        .build_rooted(&key, args.depth, args.include_epic)
        .await?;
    output::print_rooted(&tree, output_mode)?;
    Ok(())
}

/// Execute the forest command
pub async fn execute_forest(app: &App, args: &ForestArgs, output_mode: OutputMode) -> Result<()> {
    let forest = app.hierarchy().build_forest(&args.query, args.max).await?;
    output::print_forest(&forest, output_mode)?;
    Ok(())
}

/// Execute the show command
pub async fn execute_show(app: &App, args: &ShowArgs, output_mode: OutputMode) -> Result<()> {
    let key = IssueKey::new(&args.key);
    let raw = app
        .client()
        .get_issue(&key, &FieldSelector::details())
        .await?
        .ok_or_else(|| anyhow::anyhow!("Issue not found: {key}"))?;

    output::print_issue_details(&raw.to_details(), output_mode)?;
    Ok(())
}

/// Execute the search command
pub async fn execute_search(app: &App, args: &SearchArgs, output_mode: OutputMode) -> Result<()> {
    let page = app
        .client()
        .search_issues(&args.query, &FieldSelector::hierarchy(), args.max)
        .await?;
    let nodes: Vec<IssueNode> = page.issues.iter().map(|raw| raw.to_node()).collect();

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "total": page.total,
                "issues": nodes,
            }))?;
        }
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            for node in &nodes {
                println!(
                    "{} {} {}",
                    output::info(node.key.as_str(), &config),
                    node.summary,
                    node.status.name
                );
            }
            if page.total > nodes.len() as u64 {
                println!("({} of {} shown)", nodes.len(), page.total);
            }
        }
    }
    Ok(())
}
