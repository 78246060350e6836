//! Application context for CLI command execution.
//!
//! Wires resolved configuration into a tracker client and hands out
//! hierarchy builders configured from it.

use crate::config::TrackerConfig;
use crate::error::Result;
use crate::hierarchy::{HierarchyBuilder, HierarchyOptions};
use crate::remote::jira::JiraClient;

/// Application context for CLI operations.
pub struct App {
    client: JiraClient,
    config: TrackerConfig,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("base_url", &self.config.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create an App from the environment and the optional config file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no tracker URL is configured.
    pub fn from_env() -> Result<Self> {
        let config = TrackerConfig::from_env()?;
        let client = JiraClient::new(&config);
        Ok(Self { client, config })
    }

    /// The tracker client.
    pub fn client(&self) -> &JiraClient {
        &self.client
    }

    /// The resolved configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// A hierarchy builder configured against this app's tracker.
    pub fn hierarchy(&self) -> HierarchyBuilder<'_> {
        HierarchyBuilder::new(self.client())
            .with_structure(self.client())
            .with_options(HierarchyOptions {
                child_cap: self.config.child_cap,
                structure_id: self.config.structure_id,
                ..HierarchyOptions::default()
            })
    }
}
