//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use crate::config::{DEFAULT_MAX_RESULTS, DEFAULT_TREE_DEPTH};
use clap::Parser;

/// Validate an issue key argument.
///
/// Keys are tracker-defined; only obviously broken input (empty, embedded
/// whitespace) is rejected here.
pub fn validate_issue_key(key: &str) -> Result<String, String> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err("Issue key must not be empty".to_string());
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(format!("Issue key must not contain whitespace: '{trimmed}'"));
    }
    Ok(trimmed.to_string())
}

/// Arguments for the `tree` command
#[derive(Parser, Debug, Clone)]
pub struct TreeArgs {
    /// Issue key to start from (e.g. "PROJ-123")
    #[arg(value_parser = validate_issue_key)]
    pub key: String,

    /// Maximum traversal depth (clamped to 1-20)
    #[arg(short, long, default_value_t = DEFAULT_TREE_DEPTH)]
    pub depth: usize,

    /// Also expand epic membership (GroupLink edges)
    #[arg(long)]
    pub include_epic: bool,
}

/// Arguments for the `forest` command
#[derive(Parser, Debug, Clone)]
pub struct ForestArgs {
    /// Search query selecting the working set (JQL)
    pub query: String,

    /// Maximum number of issues to fetch
    #[arg(short, long, default_value_t = DEFAULT_MAX_RESULTS)]
    pub max: u32,
}

/// Arguments for the `show` command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Issue key to show
    #[arg(value_parser = validate_issue_key)]
    pub key: String,
}

/// Arguments for the `search` command
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Search query (JQL)
    pub query: String,

    /// Maximum number of results
    #[arg(short, long, default_value_t = DEFAULT_MAX_RESULTS)]
    pub max: u32,
}
