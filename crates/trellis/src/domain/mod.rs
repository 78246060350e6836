//! Domain types for the remote issue tracker.
//!
//! These are the normalized types the hierarchy subsystem works with, after
//! the wire payloads from the tracker have been decoded.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique key of an issue in the remote tracker (e.g. `PROJ-123`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueKey(pub String);

impl IssueKey {
    /// Create a new issue key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for IssueKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IssueKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Coarse workflow category of a status, as reported by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    /// Work has not started.
    New,

    /// Work is underway.
    InProgress,

    /// Work is finished.
    Done,
}

impl StatusCategory {
    /// Map a tracker status-category key (`new`, `indeterminate`, `done`)
    /// to the domain category. Unknown keys fall back to `New`.
    pub fn from_category_key(key: &str) -> Self {
        match key.to_lowercase().as_str() {
            "done" => Self::Done,
            "indeterminate" | "in_progress" => Self::InProgress,
            _ => Self::New,
        }
    }
}

/// Workflow status of an issue: the site-specific name plus its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStatus {
    /// Status name as configured on the tracker (e.g. "In Review").
    pub name: String,

    /// Coarse category the tracker assigns to the status.
    pub category: StatusCategory,
}

impl IssueStatus {
    /// An unknown status, used for placeholder nodes.
    pub fn unknown() -> Self {
        Self {
            name: "Unknown".to_string(),
            category: StatusCategory::New,
        }
    }
}

/// A normalized issue node in the hierarchy.
///
/// Identity is the key. Nodes are immutable once constructed for a build
/// pass; a placeholder node carries `unavailable = true` and whatever data
/// was recoverable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueNode {
    /// Unique issue key.
    pub key: IssueKey,

    /// One-line summary.
    pub summary: String,

    /// Workflow status.
    pub status: IssueStatus,

    /// Priority name, if the tracker reports one (e.g. "High").
    pub priority: Option<String>,

    /// Issue type name (e.g. "Story", "Bug", "Epic").
    pub issue_type: String,

    /// True when the full record could not be fetched and this node is a
    /// placeholder built from partial data.
    pub unavailable: bool,
}

impl IssueNode {
    /// Build a placeholder node for a key whose record could not be fetched.
    pub fn placeholder(key: IssueKey) -> Self {
        Self {
            key,
            summary: String::new(),
            status: IssueStatus::unknown(),
            priority: None,
            issue_type: String::new(),
            unavailable: true,
        }
    }

    /// Whether this node's issue type marks it as an epic (group node).
    pub fn is_epic(&self) -> bool {
        self.issue_type.eq_ignore_ascii_case("epic")
    }
}

/// Kind of a directed relationship edge between two issues.
///
/// The declaration order is the fixed child-priority order used when a
/// node's children from all kinds are merged for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    /// Epic-to-issue grouping reference.
    GroupLink,

    /// "Is parent of" / "is child of" typed link.
    Containment,

    /// "Covers" / "is covered by" typed link.
    Coverage,
}

impl EdgeKind {
    /// All kinds in fixed child-priority order.
    pub const PRIORITY_ORDER: [EdgeKind; 3] =
        [EdgeKind::GroupLink, EdgeKind::Containment, EdgeKind::Coverage];
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeKind::GroupLink => "group",
            EdgeKind::Containment => "contains",
            EdgeKind::Coverage => "covers",
        };
        write!(f, "{s}")
    }
}

/// A directed relationship edge. The parent is always the coarser item,
/// regardless of which side of the raw link carried that role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Key of the containing/covering item.
    pub parent: IssueKey,

    /// Key of the contained/covered item.
    pub child: IssueKey,

    /// Relationship kind.
    pub kind: EdgeKind,
}

impl Edge {
    /// Create a new edge.
    pub fn new(parent: impl Into<IssueKey>, child: impl Into<IssueKey>, kind: EdgeKind) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
            kind,
        }
    }
}

/// One element of an external folder topology (a "structure").
///
/// Elements form a strict tree: `parent_id` chains terminate at `None`.
/// Leaf elements may be associated with an issue key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureElement {
    /// Element id, unique within the structure.
    pub id: u64,

    /// Folder name (empty for issue-bearing leaf elements).
    pub name: String,

    /// Parent element id; `None` means this element is a root.
    pub parent_id: Option<u64>,

    /// Associated issue key, present on leaf elements only.
    pub issue_key: Option<IssueKey>,
}

/// Full detail view of a single issue, for the `show` / `get_issue` surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueDetails {
    /// Unique issue key.
    pub key: IssueKey,

    /// One-line summary.
    pub summary: String,

    /// Free-form description, if any.
    pub description: Option<String>,

    /// Workflow status.
    pub status: IssueStatus,

    /// Priority name, if any.
    pub priority: Option<String>,

    /// Issue type name.
    pub issue_type: String,

    /// Assignee display name, if assigned.
    pub assignee: Option<String>,

    /// Labels.
    pub labels: Vec<String>,

    /// Creation timestamp, if the tracker reported a parseable one.
    pub created: Option<chrono::DateTime<chrono::FixedOffset>>,

    /// Last-update timestamp, if the tracker reported a parseable one.
    pub updated: Option<chrono::DateTime<chrono::FixedOffset>>,

    /// Hierarchy-relevant relationships of this issue.
    pub relations: Vec<Relation>,
}

/// One hierarchy-relevant relationship of an issue, for the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Kind of the relationship.
    pub kind: EdgeKind,

    /// Key of the related issue.
    pub other: IssueKey,

    /// True when this issue is the parent (coarser) side.
    pub is_parent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_key_display_and_conversions() {
        let key = IssueKey::new("PROJ-1");
        assert_eq!(key.to_string(), "PROJ-1");
        assert_eq!(key.as_str(), "PROJ-1");
        assert_eq!(IssueKey::from("PROJ-1"), key);
        assert_eq!(IssueKey::from("PROJ-1".to_string()), key);
    }

    #[test]
    fn test_status_category_from_key() {
        assert_eq!(StatusCategory::from_category_key("new"), StatusCategory::New);
        assert_eq!(
            StatusCategory::from_category_key("indeterminate"),
            StatusCategory::InProgress
        );
        assert_eq!(StatusCategory::from_category_key("done"), StatusCategory::Done);
        assert_eq!(StatusCategory::from_category_key("DONE"), StatusCategory::Done);
        assert_eq!(
            StatusCategory::from_category_key("mystery"),
            StatusCategory::New
        );
    }

    #[test]
    fn test_placeholder_node() {
        let node = IssueNode::placeholder(IssueKey::new("GONE-1"));
        assert!(node.unavailable);
        assert!(node.summary.is_empty());
        assert_eq!(node.status.category, StatusCategory::New);
        assert!(!node.is_epic());
    }

    #[test]
    fn test_epic_detection_is_case_insensitive() {
        let mut node = IssueNode::placeholder(IssueKey::new("E-1"));
        node.issue_type = "EPIC".to_string();
        assert!(node.is_epic());
        node.issue_type = "Story".to_string();
        assert!(!node.is_epic());
    }

    #[test]
    fn test_edge_kind_priority_order() {
        assert_eq!(
            EdgeKind::PRIORITY_ORDER,
            [EdgeKind::GroupLink, EdgeKind::Containment, EdgeKind::Coverage]
        );
    }
}
