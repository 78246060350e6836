//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for trellis using clap's
//! derive API.
//!
//! # Commands
//!
//! - `tree`: Render the hierarchy below one issue
//! - `forest`: Render the hierarchy of a query result
//! - `show`: Show issue details
//! - `search`: Flat search results
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! trellis tree PROJ-123 --depth 5 --include-epic
//! trellis forest "project = PROJ AND sprint in openSprints()"
//! trellis show PROJ-123
//! ```

mod args;
mod execute;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{ForestArgs, SearchArgs, ShowArgs, TreeArgs, validate_issue_key};

use crate::app::App;
use crate::output::OutputMode;

/// Trellis - hierarchy explorer for a remote issue tracker
///
/// Renders epics, parent/child links, and coverage links from a
/// Jira-compatible tracker as trees. Connection settings come from the
/// environment (`JIRA_URL`, `JIRA_PAT`, ...) or `.trellis.yaml`.
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render the hierarchy below one issue
    ///
    /// Fetches the issue and expands its containment and coverage links up
    /// to the depth bound; `--include-epic` also expands epic membership.
    Tree(TreeArgs),

    /// Render the hierarchy of a query result
    ///
    /// Runs a search and assembles the result into epic sections and root
    /// trees, grouped by folder when a structure is configured.
    Forest(ForestArgs),

    /// Show detailed information about an issue
    ///
    /// Displays all fields of an issue including its hierarchy-relevant
    /// relationships.
    Show(ShowArgs),

    /// Flat search results
    ///
    /// Runs a search and lists matching issues without assembling a
    /// hierarchy.
    Search(SearchArgs),
}

impl Cli {
    /// Parse arguments from the process command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Execute the parsed command.
    ///
    /// # Errors
    ///
    /// Returns configuration, transport, and not-found errors from the
    /// executed command.
    pub async fn execute(&self) -> Result<()> {
        let output_mode = OutputMode::from_json_flag(self.json);
        let app = App::from_env()?;

        match &self.command {
            Commands::Tree(args) => execute::execute_tree(&app, args, output_mode).await,
            Commands::Forest(args) => execute::execute_forest(&app, args, output_mode).await,
            Commands::Show(args) => execute::execute_show(&app, args, output_mode).await,
            Commands::Search(args) => execute::execute_search(&app, args, output_mode).await,
        }
    }
}
