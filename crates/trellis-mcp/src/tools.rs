//! MCP tool implementations.
//!
//! This module contains the implementations for all MCP tools exposed by the
//! server. Tools translate between MCP models and the trellis core, and
//! record the last issue shown to the caller.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::models::{
    ForestResponse, IssueResponse, LastViewedResponse, SearchHit, SearchResponse, TreeResponse,
};
use std::sync::Arc;
use trellis::config::DEFAULT_MAX_RESULTS;
use trellis::domain::IssueKey;
use trellis::remote::FieldSelector;

/// Tool implementations for the trellis MCP server.
pub struct Tools {
    context: Arc<Context>,
}

impl Tools {
    /// Create a new Tools instance with the given context.
    pub fn new(context: Arc<Context>) -> Self {
        Self { context }
    }

    /// Build the hierarchy below one issue.
    ///
    /// # Errors
    ///
    /// Returns an error when the start key cannot be resolved or the search
    /// transport fails.
    pub async fn issue_tree(
        &self,
        issue_key: &str,
        max_depth: Option<usize>,
        include_epic: Option<bool>,
    ) -> Result<TreeResponse> {
        let key = IssueKey::new(issue_key);
        let tree = self
            .context
            .builder()
            .build_rooted(
                &key,
                max_depth.unwrap_or(trellis::config::DEFAULT_TREE_DEPTH),
                include_epic.unwrap_or(false),
            )
            .await
            .map_err(map_not_found)?;

        self.context.viewed().set(key.clone());
        Ok(TreeResponse::from_hierarchy(&key, &tree))
    }

    /// Build the hierarchy of a query result.
    ///
    /// # Errors
    ///
    /// Returns an error when the search itself fails; per-node conditions
    /// are reported as warnings in the response.
    pub async fn issue_forest(
        &self,
        query: &str,
        max_results: Option<u32>,
    ) -> Result<ForestResponse> {
        let forest = self
            .context
            .builder()
            .build_forest(query, max_results.unwrap_or(DEFAULT_MAX_RESULTS))
            .await?;
        Ok(ForestResponse::from_hierarchy(&forest))
    }

    /// Fetch one issue's detail view.
    ///
    /// # Errors
    ///
    /// Returns `Error::IssueNotFound` when the key resolves to no record.
    pub async fn get_issue(&self, issue_key: &str) -> Result<IssueResponse> {
        let key = IssueKey::new(issue_key);
        let raw = self
            .context
            .issues()
            .get_issue(&key, &FieldSelector::details())
            .await?
            .ok_or_else(|| Error::IssueNotFound(issue_key.to_string()))?;

        self.context.viewed().set(key);
        Ok(IssueResponse::from(raw.to_details()))
    }

    /// Run a flat search.
    ///
    /// # Errors
    ///
    /// Returns an error when the search transport fails.
    pub async fn search_issues(
        &self,
        query: &str,
        max_results: Option<u32>,
    ) -> Result<SearchResponse> {
        let page = self
            .context
            .issues()
            .search_issues(
                query,
                &FieldSelector::hierarchy(),
                max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            )
            .await?;

        Ok(SearchResponse {
            total: page.total,
            issues: page
                .issues
                .iter()
                .map(|raw| {
                    let node = raw.to_node();
                    SearchHit {
                        key: node.key.to_string(),
                        summary: node.summary,
                        status: node.status.name,
                        priority: node.priority,
                        issue_type: node.issue_type,
                    }
                })
                .collect(),
        })
    }

    /// The last issue key shown to this caller.
    ///
    /// # Errors
    ///
    /// This function does not currently return errors but returns `Result`
    /// for API consistency.
    pub fn last_viewed(&self) -> Result<LastViewedResponse> {
        Ok(LastViewedResponse {
            issue_key: self.context.viewed().get().map(|k| k.to_string()),
        })
    }
}

/// Map the core's not-found error onto the MCP error type, passing every
/// other core error through.
fn map_not_found(err: trellis::error::Error) -> Error {
    match err {
        trellis::error::Error::IssueNotFound(key) => Error::IssueNotFound(key.to_string()),
        other => Error::Core(other),
    }
}
