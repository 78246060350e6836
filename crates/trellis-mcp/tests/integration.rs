//! Integration tests for trellis-mcp tools.
//!
//! These exercise the MCP tool layer against the mock tracker to verify
//! end-to-end behavior: hierarchy responses, detail views, last-viewed
//! tracking, and error mapping.

use serde_json::{Value, json};
use std::sync::Arc;
use trellis_mcp::context::Context;
use trellis_mcp::error::Error;
use trellis_mcp::tools::Tools;
use trellis::hierarchy::HierarchyOptions;
use trellis::remote::MockTracker;

mod helpers {
    use super::*;

    pub fn issue(key: &str, issue_type: &str, summary: &str) -> Value {
        json!({
            "key": key,
            "fields": {
                "summary": summary,
                "status": {"name": "Open", "statusCategory": {"key": "new"}},
                "issuetype": {"name": issue_type},
            },
        })
    }

    pub fn with_parent(mut issue: Value, parent: &str) -> Value {
        issue["fields"]["parent"] = json!({"key": parent});
        issue
    }

    pub fn contains(mut issue: Value, child: &str) -> Value {
        let mut links = issue["fields"]["issuelinks"]
            .as_array()
            .cloned()
            .unwrap_or_default();
        links.push(json!({
            "type": {"name": "Hierarchy", "inward": "is child of", "outward": "is parent of"},
            "outwardIssue": {"key": child},
        }));
        issue["fields"]["issuelinks"] = json!(links);
        issue
    }

    pub fn tools_over(tracker: MockTracker) -> Tools {
        let context = Context::new(Arc::new(tracker), None, HierarchyOptions::default());
        Tools::new(Arc::new(context))
    }
}

use helpers::*;

#[tokio::test]
async fn test_issue_tree_response() {
    let tracker = MockTracker::new()
        .with_issue(contains(issue("R1", "Story", "Root"), "C1"))
        .with_issue(issue("C1", "Task", "Child"));
    let tools = tools_over(tracker);

    let response = tools.issue_tree("R1", Some(5), Some(false)).await.unwrap();
    assert_eq!(response.root, "R1");
    let keys: Vec<&str> = response.nodes.iter().map(|n| n.key.as_str()).collect();
    assert_eq!(keys, vec!["R1", "C1"]);
    assert_eq!(response.nodes[0].depth, 0);
    assert_eq!(response.nodes[1].depth, 1);
    assert!(!response.depth_limited);
    assert!(response.warnings.is_empty());
}

#[tokio::test]
async fn test_issue_tree_depth_limited_warning() {
    let tracker = MockTracker::new()
        .with_issue(contains(issue("R1", "Story", "Root"), "C1"))
        .with_issue(contains(issue("C1", "Task", "Child"), "G1"))
        .with_issue(issue("G1", "Task", "Grandchild"));
    let tools = tools_over(tracker);

    let response = tools.issue_tree("R1", Some(1), None).await.unwrap();
    assert!(response.depth_limited);
    assert!(
        response
            .warnings
            .iter()
            .any(|w| w.contains("depth limit")),
        "warnings: {:?}",
        response.warnings
    );
}

#[tokio::test]
async fn test_issue_tree_not_found() {
    let tools = tools_over(MockTracker::new());
    let result = tools.issue_tree("NOPE-1", None, None).await;
    assert!(matches!(result, Err(Error::IssueNotFound(key)) if key == "NOPE-1"));
}

#[tokio::test]
async fn test_issue_forest_sections() {
    let tracker = MockTracker::new().with_search(vec![
        issue("E1", "Epic", "The epic"),
        with_parent(issue("T1", "Task", "Member"), "E1"),
        issue("S1", "Task", "Standalone"),
    ]);
    let tools = tools_over(tracker);

    let response = tools.issue_forest("project = PROJ", None).await.unwrap();
    assert_eq!(response.folder_count, 0);
    assert_eq!(response.folders.len(), 1);
    let sections = &response.folders[0].sections;
    assert_eq!(sections.len(), 2);
    assert!(sections[0].is_group);
    assert_eq!(sections[0].root, "E1");
    assert!(!sections[1].is_group);
    assert_eq!(sections[1].root, "S1");
}

#[tokio::test]
async fn test_issue_forest_reports_unavailable_nodes() {
    let tracker = MockTracker::new()
        .failing("GONE-1")
        .with_search(vec![contains(issue("T1", "Task", "Root"), "GONE-1")]);
    let tools = tools_over(tracker);

    let response = tools.issue_forest("project = PROJ", None).await.unwrap();
    let nodes = &response.folders[0].sections[0].nodes;
    let gone = nodes.iter().find(|n| n.key == "GONE-1").unwrap();
    assert!(gone.unavailable);
    assert!(
        response.warnings.iter().any(|w| w.contains("GONE-1")),
        "warnings: {:?}",
        response.warnings
    );
}

#[tokio::test]
async fn test_get_issue_details_and_last_viewed() {
    let tracker = MockTracker::new().with_issue(with_parent(
        issue("PROJ-1", "Story", "The story"),
        "E1",
    ));
    let tools = tools_over(tracker);

    assert!(tools.last_viewed().unwrap().issue_key.is_none());

    let response = tools.get_issue("PROJ-1").await.unwrap();
    assert_eq!(response.key, "PROJ-1");
    assert_eq!(response.summary, "The story");
    assert_eq!(response.status_category, "new");
    assert_eq!(response.relations.len(), 1);
    assert_eq!(response.relations[0].other, "E1");
    assert!(!response.relations[0].is_parent);

    let viewed = tools.last_viewed().unwrap();
    assert_eq!(viewed.issue_key.as_deref(), Some("PROJ-1"));
}

#[tokio::test]
async fn test_get_issue_not_found_does_not_touch_last_viewed() {
    let tools = tools_over(MockTracker::new());
    let result = tools.get_issue("NOPE-1").await;
    assert!(matches!(result, Err(Error::IssueNotFound(_))));
    assert!(tools.last_viewed().unwrap().issue_key.is_none());
}

#[tokio::test]
async fn test_issue_tree_records_last_viewed() {
    let tracker = MockTracker::new().with_issue(issue("R1", "Story", "Root"));
    let tools = tools_over(tracker);

    tools.issue_tree("R1", None, None).await.unwrap();
    assert_eq!(tools.last_viewed().unwrap().issue_key.as_deref(), Some("R1"));
}

#[tokio::test]
async fn test_search_issues_response() {
    let tracker = MockTracker::new().with_search(vec![
        issue("A-1", "Task", "First"),
        issue("A-2", "Bug", "Second"),
    ]);
    let tools = tools_over(tracker);

    let response = tools.search_issues("project = A", Some(10)).await.unwrap();
    assert_eq!(response.total, 2);
    assert_eq!(response.issues.len(), 2);
    assert_eq!(response.issues[0].key, "A-1");
    assert_eq!(response.issues[1].issue_type, "Bug");
}
