//! Relationship extraction from raw issue records.
//!
//! This is the first stage of a hierarchy build: each raw record is
//! normalized into typed, direction-resolved edges plus any stub nodes the
//! record embeds for its link targets. Extraction is pure and synchronous;
//! no fetching happens here.

use crate::domain::{Edge, EdgeKind, IssueKey, IssueNode, Relation};
use crate::remote::records::{RawIssue, RawLinkType};
use serde_json::Value;

/// Link-type names classified as Containment, matched by identifier equality
/// before any phrase fallback.
const CONTAINMENT_TYPE_NAMES: [&str; 2] = ["hierarchy", "parent-child"];

/// Link-type names classified as Coverage.
const COVERAGE_TYPE_NAMES: [&str; 2] = ["coverage", "tests"];

/// Everything extracted from one raw record.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Direction-resolved edges; the parent is always the coarser item.
    pub edges: Vec<Edge>,

    /// Stub nodes built from embedded linked-issue payloads, useful when
    /// their keys are otherwise absent from the working set.
    pub stubs: Vec<IssueNode>,
}

/// Extract all hierarchy edges and stub nodes from one raw record.
pub fn extract(raw: &RawIssue) -> Extraction {
    let mut out = Extraction::default();
    let me = IssueKey::new(&raw.key);

    // Grouping reference: one GroupLink edge when a key is recoverable,
    // silently nothing otherwise.
    if let Some(value) = &raw.fields.parent {
        if let Some(group) = group_key(value) {
            out.edges.push(Edge::new(group, me.clone(), EdgeKind::GroupLink));
        }
    }

    for link in &raw.fields.links {
        let Some(kind) = classify(&link.link_type) else {
            continue;
        };
        let (linked, phrase) = if let Some(issue) = &link.outward_issue {
            (issue, link.link_type.outward.as_str())
        } else if let Some(issue) = &link.inward_issue {
            (issue, link.link_type.inward.as_str())
        } else {
            continue;
        };

        let other = IssueKey::new(&linked.key);
        let edge = if phrase_is_parent_side(kind, phrase) {
            Edge::new(me.clone(), other, kind)
        } else {
            Edge::new(other, me.clone(), kind)
        };
        out.edges.push(edge);

        if let Some(stub) = linked.to_stub() {
            out.stubs.push(stub);
        }
    }

    out
}

/// Classified relationships of one record, for the detail view.
pub fn relations_for(raw: &RawIssue) -> Vec<Relation> {
    let me = IssueKey::new(&raw.key);
    extract(raw)
        .edges
        .into_iter()
        .map(|edge| {
            let is_parent = edge.parent == me;
            Relation {
                kind: edge.kind,
                other: if is_parent { edge.child } else { edge.parent },
                is_parent,
            }
        })
        .collect()
}

/// Decode the union-shaped grouping reference into a key, if one is
/// recoverable.
///
/// Accepted shapes: a bare key string, an object carrying a `key` field, or
/// a scalar recoverable via string coercion. Anything else yields `None`.
fn group_key(value: &Value) -> Option<IssueKey> {
    match value {
        Value::String(s) if !s.is_empty() => Some(IssueKey::new(s)),
        Value::Object(map) => map
            .get("key")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(IssueKey::new),
        Value::Number(n) => Some(IssueKey::new(n.to_string())),
        _ => None,
    }
}

/// Classify a link type into a hierarchy edge kind.
///
/// Identifier equality on the type name wins; a substring check on the
/// inward/outward phrases is the fallback. Non-matching types carry no
/// hierarchy meaning and are ignored.
fn classify(link_type: &RawLinkType) -> Option<EdgeKind> {
    let name = link_type.name.to_lowercase();
    if CONTAINMENT_TYPE_NAMES.contains(&name.as_str()) {
        return Some(EdgeKind::Containment);
    }
    if COVERAGE_TYPE_NAMES.contains(&name.as_str()) {
        return Some(EdgeKind::Coverage);
    }

    let phrases = format!(
        "{} {}",
        link_type.inward.to_lowercase(),
        link_type.outward.to_lowercase()
    );
    if phrases.contains("parent of") || phrases.contains("child of") {
        return Some(EdgeKind::Containment);
    }
    if phrases.contains("covers") || phrases.contains("covered by") {
        return Some(EdgeKind::Coverage);
    }
    None
}

/// Whether the given phrase puts the record's own issue on the coarser
/// (parent) side of the edge.
fn phrase_is_parent_side(kind: EdgeKind, phrase: &str) -> bool {
    let phrase = phrase.to_lowercase();
    match kind {
        EdgeKind::Containment => phrase.contains("parent"),
        EdgeKind::Coverage => !phrase.contains("covered") && phrase.contains("covers"),
        // GroupLink edges never come from typed links.
        EdgeKind::GroupLink => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn raw(fields: Value) -> RawIssue {
        serde_json::from_value(json!({"key": "PROJ-1", "fields": fields})).unwrap()
    }

    fn hierarchy_link(side: &str, other: &str) -> Value {
        let mut link = json!({
            "type": {"name": "Hierarchy", "inward": "is child of", "outward": "is parent of"},
        });
        link[side] = json!({"key": other});
        link
    }

    #[rstest]
    #[case::bare_string(json!("EPIC-1"), Some("EPIC-1"))]
    #[case::object(json!({"key": "EPIC-2", "fields": {}}), Some("EPIC-2"))]
    #[case::numeric(json!(10042), Some("10042"))]
    #[case::empty_string(json!(""), None)]
    #[case::object_without_key(json!({"id": "3"}), None)]
    #[case::null(json!(null), None)]
    #[case::array(json!(["EPIC-1"]), None)]
    fn test_group_key_shapes(#[case] value: Value, #[case] expected: Option<&str>) {
        assert_eq!(
            group_key(&value),
            expected.map(IssueKey::new),
            "shape: {value}"
        );
    }

    #[test]
    fn test_grouping_reference_emits_group_link() {
        let issue = raw(json!({"parent": {"key": "EPIC-1"}}));
        let extraction = extract(&issue);
        assert_eq!(
            extraction.edges,
            vec![Edge::new("EPIC-1", "PROJ-1", EdgeKind::GroupLink)]
        );
    }

    #[test]
    fn test_undecodable_grouping_reference_is_silently_omitted() {
        let issue = raw(json!({"parent": true}));
        assert!(extract(&issue).edges.is_empty());
    }

    #[rstest]
    #[case::by_name("Hierarchy", "", "", Some(EdgeKind::Containment))]
    #[case::by_name_case("PARENT-CHILD", "", "", Some(EdgeKind::Containment))]
    #[case::coverage_by_name("Coverage", "", "", Some(EdgeKind::Coverage))]
    #[case::tests_by_name("Tests", "", "", Some(EdgeKind::Coverage))]
    #[case::by_phrase("Custom", "is child of", "is parent of", Some(EdgeKind::Containment))]
    #[case::coverage_by_phrase("Custom", "is covered by", "covers", Some(EdgeKind::Coverage))]
    #[case::blocks_ignored("Blocks", "is blocked by", "blocks", None)]
    #[case::relates_ignored("Relates", "relates to", "relates to", None)]
    fn test_classify(
        #[case] name: &str,
        #[case] inward: &str,
        #[case] outward: &str,
        #[case] expected: Option<EdgeKind>,
    ) {
        let link_type = RawLinkType {
            name: name.to_string(),
            inward: inward.to_string(),
            outward: outward.to_string(),
        };
        assert_eq!(classify(&link_type), expected);
    }

    #[test]
    fn test_containment_direction_outward_parent() {
        // PROJ-1 "is parent of" PROJ-2
        let issue = raw(json!({"issuelinks": [hierarchy_link("outwardIssue", "PROJ-2")]}));
        assert_eq!(
            extract(&issue).edges,
            vec![Edge::new("PROJ-1", "PROJ-2", EdgeKind::Containment)]
        );
    }

    #[test]
    fn test_containment_direction_inward_child() {
        // PROJ-1 "is child of" PROJ-0
        let issue = raw(json!({"issuelinks": [hierarchy_link("inwardIssue", "PROJ-0")]}));
        assert_eq!(
            extract(&issue).edges,
            vec![Edge::new("PROJ-0", "PROJ-1", EdgeKind::Containment)]
        );
    }

    #[test]
    fn test_coverage_direction_both_sides() {
        let covering = raw(json!({"issuelinks": [{
            "type": {"name": "Coverage", "inward": "is covered by", "outward": "covers"},
            "outwardIssue": {"key": "STORY-2"},
        }]}));
        assert_eq!(
            extract(&covering).edges,
            vec![Edge::new("PROJ-1", "STORY-2", EdgeKind::Coverage)]
        );

        let covered = raw(json!({"issuelinks": [{
            "type": {"name": "Coverage", "inward": "is covered by", "outward": "covers"},
            "inwardIssue": {"key": "REQ-9"},
        }]}));
        assert_eq!(
            extract(&covered).edges,
            vec![Edge::new("REQ-9", "PROJ-1", EdgeKind::Coverage)]
        );
    }

    #[test]
    fn test_link_without_either_side_is_skipped() {
        let issue = raw(json!({"issuelinks": [{
            "type": {"name": "Hierarchy", "inward": "is child of", "outward": "is parent of"},
        }]}));
        assert!(extract(&issue).edges.is_empty());
    }

    #[test]
    fn test_stub_collected_from_embedded_payload() {
        let issue = raw(json!({"issuelinks": [{
            "type": {"name": "Hierarchy", "inward": "is child of", "outward": "is parent of"},
            "outwardIssue": {
                "key": "PROJ-2",
                "fields": {"summary": "Embedded child", "status": {"name": "Open"}},
            },
        }]}));
        let extraction = extract(&issue);
        assert_eq!(extraction.stubs.len(), 1);
        assert_eq!(extraction.stubs[0].key, IssueKey::new("PROJ-2"));
        assert_eq!(extraction.stubs[0].summary, "Embedded child");
    }

    #[test]
    fn test_extraction_combines_grouping_and_links() {
        let issue = raw(json!({
            "parent": "EPIC-1",
            "issuelinks": [
                hierarchy_link("outwardIssue", "PROJ-2"),
                {
                    "type": {"name": "Blocks", "inward": "is blocked by", "outward": "blocks"},
                    "outwardIssue": {"key": "PROJ-3"},
                },
            ],
        }));
        let extraction = extract(&issue);
        assert_eq!(
            extraction.edges,
            vec![
                Edge::new("EPIC-1", "PROJ-1", EdgeKind::GroupLink),
                Edge::new("PROJ-1", "PROJ-2", EdgeKind::Containment),
            ]
        );
    }

    #[test]
    fn test_relations_for_detail_view() {
        let issue = raw(json!({
            "parent": "EPIC-1",
            "issuelinks": [hierarchy_link("outwardIssue", "PROJ-2")],
        }));
        let relations = relations_for(&issue);
        assert_eq!(relations.len(), 2);
        assert_eq!(relations[0].kind, EdgeKind::GroupLink);
        assert_eq!(relations[0].other, IssueKey::new("EPIC-1"));
        assert!(!relations[0].is_parent);
        assert_eq!(relations[1].kind, EdgeKind::Containment);
        assert_eq!(relations[1].other, IssueKey::new("PROJ-2"));
        assert!(relations[1].is_parent);
    }
}
