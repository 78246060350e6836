//! Configuration for the remote tracker connection.
//!
//! Settings come from an optional `.trellis.yaml` file in the working
//! directory, overridden by environment variables. Credentials are read from
//! the environment only, never from the file.
//!
//! Environment variables:
//! - `JIRA_URL`: base URL of the tracker (required if not in the file)
//! - `JIRA_PAT`: personal access token for Bearer authentication
//! - `JIRA_USERNAME` / `JIRA_API_TOKEN`: Basic-auth fallback credentials
//! - `TRELLIS_STRUCTURE_ID`: id of the folder structure to overlay, if any
//! - `TRELLIS_CHILD_CAP`: per-node child display cap (clamped to 20-30)
//! - `TRELLIS_CONFIG`: alternate path to the config file

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use url::Url;

/// Name of the optional configuration file.
pub const CONFIG_FILE_NAME: &str = ".trellis.yaml";

/// Default per-node child display cap.
pub const DEFAULT_CHILD_CAP: usize = 25;

/// Lower bound for the child display cap.
pub const MIN_CHILD_CAP: usize = 20;

/// Upper bound for the child display cap.
pub const MAX_CHILD_CAP: usize = 30;

/// Default depth bound for rooted traversals.
pub const DEFAULT_TREE_DEPTH: usize = 10;

/// Lower bound for the rooted-traversal depth.
pub const MIN_TREE_DEPTH: usize = 1;

/// Upper bound for the rooted-traversal depth.
pub const MAX_TREE_DEPTH: usize = 20;

/// Default page size for search-driven builds.
pub const DEFAULT_MAX_RESULTS: u32 = 50;

/// Optional configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileConfig {
    /// Base URL of the tracker.
    pub url: Option<String>,

    /// Id of the folder structure to overlay.
    #[serde(rename = "structure-id")]
    pub structure_id: Option<u64>,

    /// Per-node child display cap.
    #[serde(rename = "child-cap")]
    pub child_cap: Option<usize>,
}

impl FileConfig {
    /// Load the configuration file, returning defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Credentials for the tracker, in fallback order.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Personal access token, sent as a Bearer header when present.
    pub token: Option<String>,

    /// Username for the Basic-auth fallback.
    pub username: Option<String>,

    /// API token / password for the Basic-auth fallback.
    pub password: Option<String>,
}

impl AuthConfig {
    /// Whether Basic-auth credentials are configured.
    pub fn has_basic(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

/// Resolved tracker configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Base URL of the tracker.
    pub base_url: Url,

    /// Credentials.
    pub auth: AuthConfig,

    /// Id of the folder structure to overlay, if configured.
    pub structure_id: Option<u64>,

    /// Per-node child display cap, clamped to [`MIN_CHILD_CAP`]..=[`MAX_CHILD_CAP`].
    pub child_cap: usize,
}

impl TrackerConfig {
    /// Resolve configuration from the config file and the environment.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no tracker URL is configured anywhere or
    /// the URL does not parse.
    pub fn from_env() -> Result<Self> {
        let file_path = env::var("TRELLIS_CONFIG")
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|_| std::path::PathBuf::from(CONFIG_FILE_NAME));
        let file = FileConfig::load(&file_path)?;

        let raw_url = env::var("JIRA_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .or(file.url)
            .ok_or_else(|| {
                Error::Config("No tracker URL configured (set JIRA_URL)".to_string())
            })?;
        let base_url = Url::parse(&raw_url).map_err(|e| {
            Error::Config(format!("Invalid tracker URL '{raw_url}': {e}"))
        })?;

        let auth = AuthConfig {
            token: env::var("JIRA_PAT").ok().filter(|s| !s.is_empty()),
            username: env::var("JIRA_USERNAME").ok().filter(|s| !s.is_empty()),
            password: env::var("JIRA_API_TOKEN").ok().filter(|s| !s.is_empty()),
        };
        if auth.token.is_none() && !auth.has_basic() {
            tracing::debug!("No credentials configured, requests will be anonymous");
        }

        let structure_id = match env::var("TRELLIS_STRUCTURE_ID") {
            Ok(s) if !s.is_empty() => match s.parse() {
                Ok(id) => Some(id),
                Err(_) => {
                    tracing::warn!(
                        env_var = "TRELLIS_STRUCTURE_ID",
                        value = %s,
                        "Invalid value, ignoring"
                    );
                    None
                }
            },
            _ => file.structure_id,
        };

        let raw_cap = match env::var("TRELLIS_CHILD_CAP") {
            Ok(s) if !s.is_empty() => match s.parse() {
                Ok(cap) => cap,
                Err(_) => {
                    tracing::warn!(
                        env_var = "TRELLIS_CHILD_CAP",
                        value = %s,
                        default = DEFAULT_CHILD_CAP,
                        "Invalid value, using default"
                    );
                    DEFAULT_CHILD_CAP
                }
            },
            _ => file.child_cap.unwrap_or(DEFAULT_CHILD_CAP),
        };
        let child_cap = clamp_child_cap(raw_cap);

        Ok(Self {
            base_url,
            auth,
            structure_id,
            child_cap,
        })
    }
}

/// Clamp a requested child cap into the supported band, warning when the
/// requested value falls outside it.
pub fn clamp_child_cap(cap: usize) -> usize {
    let clamped = cap.clamp(MIN_CHILD_CAP, MAX_CHILD_CAP);
    if clamped != cap {
        tracing::warn!(requested = cap, used = clamped, "Child cap out of range");
    }
    clamped
}

/// Clamp a requested rooted-traversal depth into the supported band.
pub fn clamp_tree_depth(depth: usize) -> usize {
    depth.clamp(MIN_TREE_DEPTH, MAX_TREE_DEPTH)
}
