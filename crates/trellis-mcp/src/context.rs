//! Tracker connection context for the MCP server.
//!
//! The context owns the configured sources, the hierarchy options, and the
//! caller-scoped last-viewed store. Tools borrow hierarchy builders from it
//! per call; nothing about a build outlives the call.

use std::sync::Arc;
use trellis::config::TrackerConfig;
use trellis::hierarchy::{HierarchyBuilder, HierarchyOptions};
use trellis::remote::jira::JiraClient;
use trellis::remote::{IssueSource, StructureSource};
use trellis::viewed::{InMemoryViewedStore, ViewedStore};

/// Shared state for all MCP tools.
pub struct Context {
    issues: Arc<dyn IssueSource>,
    structure: Option<Arc<dyn StructureSource>>,
    viewed: Arc<dyn ViewedStore>,
    options: HierarchyOptions,
}

impl Context {
    /// Create a context over explicit sources.
    pub fn new(
        issues: Arc<dyn IssueSource>,
        structure: Option<Arc<dyn StructureSource>>,
        options: HierarchyOptions,
    ) -> Self {
        Self {
            issues,
            structure,
            viewed: Arc::new(InMemoryViewedStore::new()),
            options,
        }
    }

    /// Create a context from the environment and the optional config file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no tracker URL is configured.
    pub fn from_env() -> trellis::error::Result<Self> {
        let config = TrackerConfig::from_env()?;
        let options = HierarchyOptions {
            child_cap: config.child_cap,
            structure_id: config.structure_id,
            ..HierarchyOptions::default()
        };
        let client = Arc::new(JiraClient::new(&config));
        let structure: Option<Arc<dyn StructureSource>> = if config.structure_id.is_some() {
            Some(client.clone())
        } else {
            None
        };
        Ok(Self::new(client, structure, options))
    }

    /// The configured issue source.
    pub fn issues(&self) -> &dyn IssueSource {
        self.issues.as_ref()
    }

    /// The caller-scoped last-viewed store.
    pub fn viewed(&self) -> &dyn ViewedStore {
        self.viewed.as_ref()
    }

    /// A hierarchy builder configured from this context.
    pub fn builder(&self) -> HierarchyBuilder<'_> {
        let mut builder =
            HierarchyBuilder::new(self.issues.as_ref()).with_options(self.options.clone());
        if let Some(structure) = &self.structure {
            builder = builder.with_structure(structure.as_ref());
        }
        builder
    }
}
