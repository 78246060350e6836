//! Error types for the trellis MCP server.

use thiserror::Error;

/// Errors that can occur in the trellis MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested issue was not found.
    #[error("Issue not found: {0}")]
    IssueNotFound(String),

    /// Invalid argument value provided.
    #[error("Invalid {field}: '{value}'. Valid values: {valid_values}")]
    InvalidArgument {
        /// The field name that had an invalid value.
        field: &'static str,
        /// The invalid value that was provided.
        value: String,
        /// Description of valid values.
        valid_values: &'static str,
    },

    /// An error from the trellis core (transport, auth, configuration).
    #[error("Tracker error: {0}")]
    Core(#[from] trellis::error::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MCP protocol error.
    #[error("MCP error: {0}")]
    Mcp(String),
}

/// Result type for trellis MCP operations.
pub type Result<T> = std::result::Result<T, Error>;
