//! MCP parameter and response models.
//!
//! These types shape tool inputs and serialize tool responses. They wrap or
//! flatten trellis domain types for MCP transport.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use trellis::domain::{IssueDetails, IssueKey, StatusCategory};
use trellis::hierarchy::render::RenderedNode;
use trellis::hierarchy::{ForestHierarchy, NodeRegistry, RootedHierarchy};

/// Parameters for the `issue_tree` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TreeParams {
    /// Issue key to start from (e.g. "PROJ-123").
    pub issue_key: String,

    /// Maximum traversal depth (1-20, default 10).
    pub max_depth: Option<usize>,

    /// Also expand epic membership.
    pub include_epic: Option<bool>,
}

/// Parameters for the `issue_forest` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ForestParams {
    /// Search query (JQL) selecting the working set.
    pub query: String,

    /// Maximum number of issues to fetch (default 50).
    pub max_results: Option<u32>,
}

/// Parameters for the `get_issue` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetIssueParams {
    /// Issue key to fetch.
    pub issue_key: String,
}

/// Parameters for the `search_issues` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Search query (JQL).
    pub query: String,

    /// Maximum number of results (default 50).
    pub max_results: Option<u32>,
}

/// One node of a rendered hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpNode {
    /// Issue key.
    pub key: String,

    /// Depth below the entry point.
    pub depth: usize,

    /// One-line summary (empty for bare placeholders).
    pub summary: String,

    /// Status name.
    pub status: String,

    /// Status category (`new`, `in_progress`, `done`).
    pub status_category: String,

    /// Priority name, if any.
    pub priority: Option<String>,

    /// Issue type name.
    pub issue_type: String,

    /// True when the node is a placeholder for an unfetchable record.
    pub unavailable: bool,

    /// Number of further children suppressed by the display cap.
    pub omitted_children: usize,
}

impl McpNode {
    /// Build a node from a rendered visit and the build's registry.
    pub fn from_rendered(node: &RenderedNode, registry: &NodeRegistry) -> Self {
        match registry.get(&node.key) {
            Some(data) => Self {
                key: node.key.to_string(),
                depth: node.depth,
                summary: data.summary.clone(),
                status: data.status.name.clone(),
                status_category: category_to_string(data.status.category),
                priority: data.priority.clone(),
                issue_type: data.issue_type.clone(),
                unavailable: data.unavailable,
                omitted_children: node.omitted_children,
            },
            None => Self {
                key: node.key.to_string(),
                depth: node.depth,
                summary: String::new(),
                status: String::new(),
                status_category: category_to_string(StatusCategory::New),
                priority: None,
                issue_type: String::new(),
                unavailable: true,
                omitted_children: node.omitted_children,
            },
        }
    }
}

/// Response from the `issue_tree` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TreeResponse {
    /// The requested root key.
    pub root: String,

    /// Depth-first visit sequence from the root.
    pub nodes: Vec<McpNode>,

    /// Whether the depth bound cut anything off.
    pub depth_limited: bool,

    /// Human-readable non-fatal conditions.
    pub warnings: Vec<String>,
}

impl TreeResponse {
    /// Build a response from a rooted build result.
    pub fn from_hierarchy(root: &IssueKey, tree: &RootedHierarchy) -> Self {
        Self {
            root: root.to_string(),
            nodes: tree
                .nodes
                .iter()
                .map(|n| McpNode::from_rendered(n, &tree.registry))
                .collect(),
            depth_limited: tree.depth_limited,
            warnings: tree.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// One forest section: a group header or a plain root tree.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ForestSection {
    /// Key of the entry point.
    pub root: String,

    /// Whether the entry is a group (epic) section.
    pub is_group: bool,

    /// Depth-first visit sequence, entry point included.
    pub nodes: Vec<McpNode>,
}

/// One folder bucket of a forest.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ForestFolder {
    /// Root-to-leaf folder names; empty for the ungrouped bucket.
    pub path: Vec<String>,

    /// Sections in this folder.
    pub sections: Vec<ForestSection>,
}

/// Response from the `issue_forest` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ForestResponse {
    /// Folder buckets, ungrouped last.
    pub folders: Vec<ForestFolder>,

    /// Number of distinct folders matched (zero when the overlay was
    /// skipped).
    pub folder_count: usize,

    /// Human-readable non-fatal conditions.
    pub warnings: Vec<String>,
}

impl ForestResponse {
    /// Build a response from a forest build result.
    pub fn from_hierarchy(forest: &ForestHierarchy) -> Self {
        Self {
            folders: forest
                .buckets
                .iter()
                .map(|bucket| ForestFolder {
                    path: bucket.path.clone(),
                    sections: bucket
                        .entries
                        .iter()
                        .map(|entry| ForestSection {
                            root: entry.root.to_string(),
                            is_group: entry.is_group,
                            nodes: entry
                                .nodes
                                .iter()
                                .map(|n| McpNode::from_rendered(n, &forest.registry))
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
            folder_count: forest.folder_count,
            warnings: forest.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// One relationship in an issue response.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpRelation {
    /// Relationship kind (`group`, `contains`, `covers`).
    pub kind: String,

    /// Key of the related issue.
    pub other: String,

    /// True when this issue is the parent (coarser) side.
    pub is_parent: bool,
}

/// Response from the `get_issue` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IssueResponse {
    /// Issue key.
    pub key: String,

    /// One-line summary.
    pub summary: String,

    /// Free-form description, if any.
    pub description: Option<String>,

    /// Status name.
    pub status: String,

    /// Status category (`new`, `in_progress`, `done`).
    pub status_category: String,

    /// Priority name, if any.
    pub priority: Option<String>,

    /// Issue type name.
    pub issue_type: String,

    /// Assignee display name, if assigned.
    pub assignee: Option<String>,

    /// Labels.
    pub labels: Vec<String>,

    /// Creation timestamp (RFC 3339), if known.
    pub created: Option<String>,

    /// Last-update timestamp (RFC 3339), if known.
    pub updated: Option<String>,

    /// Hierarchy-relevant relationships.
    pub relations: Vec<McpRelation>,
}

impl From<IssueDetails> for IssueResponse {
    fn from(details: IssueDetails) -> Self {
        Self {
            key: details.key.to_string(),
            summary: details.summary,
            description: details.description,
            status: details.status.name,
            status_category: category_to_string(details.status.category),
            priority: details.priority,
            issue_type: details.issue_type,
            assignee: details.assignee,
            labels: details.labels,
            created: details.created.map(|t| t.to_rfc3339()),
            updated: details.updated.map(|t| t.to_rfc3339()),
            relations: details
                .relations
                .into_iter()
                .map(|r| McpRelation {
                    kind: r.kind.to_string(),
                    other: r.other.to_string(),
                    is_parent: r.is_parent,
                })
                .collect(),
        }
    }
}

/// A flat search hit.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchHit {
    /// Issue key.
    pub key: String,

    /// One-line summary.
    pub summary: String,

    /// Status name.
    pub status: String,

    /// Priority name, if any.
    pub priority: Option<String>,

    /// Issue type name.
    pub issue_type: String,
}

/// Response from the `search_issues` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchResponse {
    /// Total matches reported by the tracker.
    pub total: u64,

    /// Hits on this page.
    pub issues: Vec<SearchHit>,
}

/// Response from the `last_viewed` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LastViewedResponse {
    /// The last issue key shown to this caller, if any.
    pub issue_key: Option<String>,
}

/// Convert a status category to its MCP string representation.
#[must_use]
pub fn category_to_string(category: StatusCategory) -> String {
    match category {
        StatusCategory::New => "new".to_string(),
        StatusCategory::InProgress => "in_progress".to_string(),
        StatusCategory::Done => "done".to_string(),
    }
}
