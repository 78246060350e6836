//! Raw wire types returned by the tracker's REST API.
//!
//! These deserialize the tracker payloads as-is; normalization into domain
//! types happens here (nodes, details) and in the relationship extractor
//! (edges). Every field the hierarchy does not need is simply not declared.

use crate::domain::{
    IssueDetails, IssueKey, IssueNode, IssueStatus, StatusCategory, StructureElement,
};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde_json::Value;

/// One page of a search response.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    /// Issues on this page.
    #[serde(default)]
    pub issues: Vec<RawIssue>,

    /// Total number of matches reported by the tracker.
    #[serde(default)]
    pub total: u64,
}

/// A raw issue record.
#[derive(Debug, Clone, Deserialize)]
pub struct RawIssue {
    /// Issue key.
    pub key: String,

    /// Requested fields.
    #[serde(default)]
    pub fields: RawFields,
}

/// The fields block of a raw issue record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFields {
    /// One-line summary.
    pub summary: Option<String>,

    /// Workflow status.
    pub status: Option<RawStatus>,

    /// Priority.
    pub priority: Option<RawNamed>,

    /// Issue type.
    #[serde(rename = "issuetype")]
    pub issue_type: Option<RawNamed>,

    /// Assignee.
    pub assignee: Option<RawUser>,

    /// Labels.
    #[serde(default)]
    pub labels: Vec<String>,

    /// Description; a plain string on older API versions, a rich-text
    /// document object on newer ones.
    pub description: Option<Value>,

    /// Creation timestamp string.
    pub created: Option<String>,

    /// Last-update timestamp string.
    pub updated: Option<String>,

    /// Grouping reference to the parent epic. The shape varies across
    /// tracker versions: a bare key string, an object with a `key` field,
    /// or another scalar only recoverable via string coercion.
    pub parent: Option<Value>,

    /// Typed links to other issues.
    #[serde(rename = "issuelinks", default)]
    pub links: Vec<RawLink>,
}

/// A `{"name": ...}` wrapper used for priorities and issue types.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNamed {
    /// Display name.
    pub name: String,
}

/// Raw workflow status.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStatus {
    /// Status name.
    pub name: String,

    /// Status category, when the tracker reports one.
    #[serde(rename = "statusCategory")]
    pub category: Option<RawStatusCategory>,
}

impl RawStatus {
    /// Normalize into the domain status.
    ///
    /// When the tracker omits the category, fall back to a name heuristic so
    /// older servers still categorize sensibly.
    pub fn to_status(&self) -> IssueStatus {
        let category = match &self.category {
            Some(c) => StatusCategory::from_category_key(&c.key),
            None => category_from_name(&self.name),
        };
        IssueStatus {
            name: self.name.clone(),
            category,
        }
    }
}

/// Raw status category.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStatusCategory {
    /// Category key (`new`, `indeterminate`, `done`).
    pub key: String,
}

/// Raw user reference.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    /// Display name (cloud-style payloads).
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,

    /// Login name (server-style payloads).
    pub name: Option<String>,
}

impl RawUser {
    /// Best available human-readable name.
    pub fn label(&self) -> Option<String> {
        self.display_name.clone().or_else(|| self.name.clone())
    }
}

/// A raw typed link between two issues.
///
/// Exactly one of `inward_issue` / `outward_issue` is populated, depending
/// on which side of the link the containing record sits on.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLink {
    /// Link type descriptor.
    #[serde(rename = "type")]
    pub link_type: RawLinkType,

    /// The linked issue, when this record is on the outward side.
    #[serde(rename = "inwardIssue")]
    pub inward_issue: Option<RawLinkedIssue>,

    /// The linked issue, when this record is on the inward side.
    #[serde(rename = "outwardIssue")]
    pub outward_issue: Option<RawLinkedIssue>,
}

/// Raw link type descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLinkType {
    /// Type name (e.g. "Hierarchy").
    #[serde(default)]
    pub name: String,

    /// Inward phrase (e.g. "is child of").
    #[serde(default)]
    pub inward: String,

    /// Outward phrase (e.g. "is parent of").
    #[serde(default)]
    pub outward: String,
}

/// The linked-issue payload embedded in a raw link.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLinkedIssue {
    /// Linked issue key.
    pub key: String,

    /// Partially-populated fields, when the tracker embeds them.
    #[serde(default)]
    pub fields: Option<RawLinkedFields>,
}

impl RawLinkedIssue {
    /// Build a stub node from the embedded payload, if it carries enough to
    /// be worth registering.
    pub fn to_stub(&self) -> Option<IssueNode> {
        let fields = self.fields.as_ref()?;
        fields.summary.as_ref()?;
        Some(IssueNode {
            key: IssueKey::new(&self.key),
            summary: fields.summary.clone().unwrap_or_default(),
            status: fields
                .status
                .as_ref()
                .map_or_else(IssueStatus::unknown, RawStatus::to_status),
            priority: fields.priority.as_ref().map(|p| p.name.clone()),
            issue_type: fields
                .issue_type
                .as_ref()
                .map(|t| t.name.clone())
                .unwrap_or_default(),
            unavailable: false,
        })
    }
}

/// Partial fields embedded in a linked-issue payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLinkedFields {
    /// One-line summary.
    pub summary: Option<String>,

    /// Workflow status.
    pub status: Option<RawStatus>,

    /// Priority.
    pub priority: Option<RawNamed>,

    /// Issue type.
    #[serde(rename = "issuetype")]
    pub issue_type: Option<RawNamed>,
}

impl RawIssue {
    /// Normalize into a hierarchy node.
    pub fn to_node(&self) -> IssueNode {
        IssueNode {
            key: IssueKey::new(&self.key),
            summary: self.fields.summary.clone().unwrap_or_default(),
            status: self
                .fields
                .status
                .as_ref()
                .map_or_else(IssueStatus::unknown, RawStatus::to_status),
            priority: self.fields.priority.as_ref().map(|p| p.name.clone()),
            issue_type: self
                .fields
                .issue_type
                .as_ref()
                .map(|t| t.name.clone())
                .unwrap_or_default(),
            unavailable: false,
        }
    }

    /// Normalize into the detail view, including classified relationships.
    pub fn to_details(&self) -> IssueDetails {
        let node = self.to_node();
        IssueDetails {
            key: node.key,
            summary: node.summary,
            description: self.fields.description.as_ref().and_then(description_text),
            status: node.status,
            priority: node.priority,
            issue_type: node.issue_type,
            assignee: self.fields.assignee.as_ref().and_then(RawUser::label),
            labels: self.fields.labels.clone(),
            created: self.fields.created.as_deref().and_then(parse_timestamp),
            updated: self.fields.updated.as_deref().and_then(parse_timestamp),
            relations: crate::hierarchy::extract::relations_for(self),
        }
    }
}

/// One page of a structure (folder topology) response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStructurePage {
    /// Elements on this page.
    #[serde(default)]
    pub elements: Vec<RawStructureElement>,
}

/// A raw structure element.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStructureElement {
    /// Element id.
    pub id: u64,

    /// Folder name; absent on issue-bearing leaf elements.
    #[serde(default)]
    pub name: Option<String>,

    /// Parent element id; absent on roots.
    #[serde(rename = "parentId")]
    pub parent_id: Option<u64>,

    /// Associated issue key, on leaf elements.
    #[serde(rename = "issueKey")]
    pub issue_key: Option<String>,
}

impl RawStructureElement {
    /// Normalize into the domain element.
    pub fn into_element(self) -> StructureElement {
        StructureElement {
            id: self.id,
            name: self.name.unwrap_or_default(),
            parent_id: self.parent_id,
            issue_key: self.issue_key.map(IssueKey::new),
        }
    }
}

/// Parse a tracker timestamp, accepting RFC 3339 and the compact
/// `+0000`-offset variant some servers emit.
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.3f%z"))
        .ok()
}

/// Coerce a description value into plain text.
///
/// Older API versions return a string; newer ones return a rich-text
/// document whose text leaves are concatenated here.
pub fn description_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => {
            let mut out = String::new();
            collect_text(value, &mut out);
            if out.is_empty() { None } else { Some(out) }
        }
        _ => None,
    }
}

fn collect_text(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push(' ');
                }
                out.push_str(text);
            }
            if let Some(content) = map.get("content") {
                collect_text(content, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_text(item, out);
            }
        }
        _ => {}
    }
}

/// Categorize a status by name when the tracker omits the category.
fn category_from_name(name: &str) -> StatusCategory {
    let lower = name.to_lowercase();
    if lower.contains("done") || lower.contains("closed") || lower.contains("resolved") {
        StatusCategory::Done
    } else if lower.contains("progress") || lower.contains("review") {
        StatusCategory::InProgress
    } else {
        StatusCategory::New
    }
}
