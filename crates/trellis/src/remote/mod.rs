//! Remote tracker abstraction layer.
//!
//! This module defines the collaborator traits the hierarchy subsystem
//! consumes, the field selector used to shape requests, and the concrete
//! HTTP client in [`jira`].
//!
//! The traits are async and object-safe so the hierarchy builder can run
//! against the real tracker, or against [`MockTracker`] in tests.
//!
//! # Test Utilities
//!
//! [`MockTracker`] is available when running tests or when the `test-util`
//! feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! trellis = { version = "...", features = ["test-util"] }
//! ```

use crate::domain::{IssueKey, StructureElement};
use crate::error::Result;
use async_trait::async_trait;

pub mod jira;
pub mod records;

use records::{RawIssue, SearchPage};

/// Field selector attached to issue requests.
///
/// The tracker returns only the requested fields, so tree builds ask for the
/// hierarchy set and the detail view asks for the wider one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelector(Vec<&'static str>);

impl FieldSelector {
    /// Fields needed to build a hierarchy.
    pub fn hierarchy() -> Self {
        Self(vec![
            "summary",
            "status",
            "priority",
            "issuetype",
            "parent",
            "issuelinks",
        ])
    }

    /// Fields needed for the single-issue detail view.
    pub fn details() -> Self {
        Self(vec![
            "summary",
            "status",
            "priority",
            "issuetype",
            "parent",
            "issuelinks",
            "description",
            "assignee",
            "labels",
            "created",
            "updated",
        ])
    }

    /// Render as the comma-separated `fields` request parameter.
    pub fn as_param(&self) -> String {
        self.0.join(",")
    }
}

/// Read access to issues on the remote tracker.
///
/// Implementations must be `Send + Sync` so independent lookups can be in
/// flight concurrently as separate suspended tasks.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Fetch a single issue by key.
    ///
    /// Returns `Ok(None)` when the issue does not exist or is not visible.
    ///
    /// # Errors
    ///
    /// Returns transport, authentication, or decoding errors. Callers in the
    /// hierarchy subsystem absorb these into placeholder nodes.
    async fn get_issue(&self, key: &IssueKey, fields: &FieldSelector)
        -> Result<Option<RawIssue>>;

    /// Run a search query, returning at most `max_results` issues.
    ///
    /// # Errors
    ///
    /// Returns transport, authentication, or decoding errors.
    async fn search_issues(
        &self,
        query: &str,
        fields: &FieldSelector,
        max_results: u32,
    ) -> Result<SearchPage>;
}

/// Read access to an external folder topology ("structure").
///
/// Any error from this collaborator is treated by the folder overlay as
/// "topology unavailable" and absorbed; it never fails a build.
#[async_trait]
pub trait StructureSource: Send + Sync {
    /// Fetch the flat element list of a structure.
    ///
    /// # Errors
    ///
    /// Returns transport, authentication, or decoding errors.
    async fn get_structure(
        &self,
        structure_id: u64,
        max_results: u32,
    ) -> Result<Vec<StructureElement>>;
}

// ========== Test Utilities ==========

/// Programmable in-memory implementation of [`IssueSource`] and
/// [`StructureSource`] for testing.
///
/// Issues are registered up front; single-key lookups are recorded so tests
/// can assert that no key is fetched twice. Keys listed as failing return an
/// HTTP error, and unknown keys return `Ok(None)`.
#[cfg(any(test, feature = "test-util"))]
#[derive(Default)]
pub struct MockTracker {
    issues: std::collections::HashMap<IssueKey, RawIssue>,
    search_results: Vec<RawIssue>,
    structure: Option<Vec<StructureElement>>,
    failing: std::collections::HashSet<IssueKey>,
    lookups: std::sync::Mutex<Vec<IssueKey>>,
}

#[cfg(any(test, feature = "test-util"))]
impl MockTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an issue from its raw JSON value.
    ///
    /// # Panics
    ///
    /// Panics if the value does not deserialize as an issue record.
    #[must_use]
    pub fn with_issue(mut self, value: serde_json::Value) -> Self {
        let raw: RawIssue = serde_json::from_value(value).expect("issue fixture should parse");
        self.issues.insert(IssueKey::new(&raw.key), raw);
        self
    }

    /// Set the issues returned by `search_issues`, registering each for
    /// single-key lookup as well.
    ///
    /// # Panics
    ///
    /// Panics if a value does not deserialize as an issue record.
    #[must_use]
    pub fn with_search(mut self, values: Vec<serde_json::Value>) -> Self {
        for value in values {
            let raw: RawIssue = serde_json::from_value(value).expect("issue fixture should parse");
            self.issues.insert(IssueKey::new(&raw.key), raw.clone());
            self.search_results.push(raw);
        }
        self
    }

    /// Set the structure elements returned by `get_structure`.
    #[must_use]
    pub fn with_structure(mut self, elements: Vec<StructureElement>) -> Self {
        self.structure = Some(elements);
        self
    }

    /// Mark a key as failing: lookups return an HTTP 403 error.
    #[must_use]
    pub fn failing(mut self, key: impl Into<IssueKey>) -> Self {
        self.failing.insert(key.into());
        self
    }

    /// Keys that were looked up via `get_issue`, in call order.
    pub fn lookups(&self) -> Vec<IssueKey> {
        self.lookups.lock().expect("lookup log poisoned").clone()
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl IssueSource for MockTracker {
    async fn get_issue(
        &self,
        key: &IssueKey,
        _fields: &FieldSelector,
    ) -> Result<Option<RawIssue>> {
        self.lookups
            .lock()
            .expect("lookup log poisoned")
            .push(key.clone());
        if self.failing.contains(key) {
            return Err(crate::error::Error::Http {
                status: 403,
                endpoint: format!("issue/{key}"),
            });
        }
        Ok(self.issues.get(key).cloned())
    }

    async fn search_issues(
        &self,
        _query: &str,
        _fields: &FieldSelector,
        max_results: u32,
    ) -> Result<SearchPage> {
        let issues: Vec<RawIssue> = self
            .search_results
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect();
        let total = self.search_results.len() as u64;
        Ok(SearchPage { issues, total })
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl StructureSource for MockTracker {
    async fn get_structure(
        &self,
        _structure_id: u64,
        _max_results: u32,
    ) -> Result<Vec<StructureElement>> {
        match &self.structure {
            Some(elements) => Ok(elements.clone()),
            None => Err(crate::error::Error::Http {
                status: 404,
                endpoint: "structure".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_selector_params() {
        assert_eq!(
            FieldSelector::hierarchy().as_param(),
            "summary,status,priority,issuetype,parent,issuelinks"
        );
        assert!(FieldSelector::details().as_param().contains("description"));
    }

    #[tokio::test]
    async fn test_mock_tracker_records_lookups() {
        let tracker = MockTracker::new().with_issue(serde_json::json!({
            "key": "PROJ-1",
            "fields": {"summary": "One"},
        }));

        let fields = FieldSelector::hierarchy();
        let found = tracker
            .get_issue(&IssueKey::new("PROJ-1"), &fields)
            .await
            .unwrap();
        assert!(found.is_some());

        let missing = tracker
            .get_issue(&IssueKey::new("PROJ-2"), &fields)
            .await
            .unwrap();
        assert!(missing.is_none());

        assert_eq!(
            tracker.lookups(),
            vec![IssueKey::new("PROJ-1"), IssueKey::new("PROJ-2")]
        );
    }

    #[tokio::test]
    async fn test_mock_tracker_failing_key() {
        let tracker = MockTracker::new().failing("PROJ-666");
        let result = tracker
            .get_issue(&IssueKey::new("PROJ-666"), &FieldSelector::hierarchy())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_tracker_structure_unconfigured_errors() {
        let tracker = MockTracker::new();
        assert!(tracker.get_structure(1, 100).await.is_err());
    }
}
