//! Error types for trellis operations.

use crate::domain::IssueKey;
use thiserror::Error;

/// The error type for trellis operations.
///
/// Only `IssueNotFound` is a distinguishable failure of a hierarchy build:
/// partial data, an unavailable folder topology, and a reached depth bound
/// are absorbed into the build result as markers, never raised as errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested issue does not exist or is not visible.
    #[error("Issue not found: {0}")]
    IssueNotFound(IssueKey),

    /// Configuration error (missing or invalid settings).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The tracker rejected every configured credential.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The tracker returned a non-success HTTP status.
    #[error("Tracker returned HTTP {status} for {endpoint}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Endpoint path that was requested.
        endpoint: String,
    },

    /// Transport-level failure talking to the tracker.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A URL could not be constructed from the configured base.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for trellis operations.
pub type Result<T> = std::result::Result<T, Error>;
