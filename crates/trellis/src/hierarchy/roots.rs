//! Traversal entry-point selection.
//!
//! Forest mode picks entry points from a query result: group nodes become
//! section headers, and keys that are nobody's child become plain roots.
//! Entry order follows first appearance in the query result, which is part
//! of the output contract.

use crate::domain::{IssueKey, IssueNode};
use crate::hierarchy::NodeRegistry;
use crate::hierarchy::graph::RelationGraph;
use std::collections::HashSet;

/// One forest entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestRoot {
    /// A group node, rendered as a section header above its children.
    Group(IssueKey),

    /// A plain root issue, rendered as a tree of its own.
    Issue(IssueKey),
}

impl ForestRoot {
    /// The entry's key.
    pub fn key(&self) -> &IssueKey {
        match self {
            ForestRoot::Group(key) | ForestRoot::Issue(key) => key,
        }
    }
}

/// Whether a key acts as a group node.
///
/// Either its record's issue type says so, or it occurs as a GroupLink
/// parent; the latter covers group nodes known only as placeholders.
pub fn is_group_node(key: &IssueKey, graph: &RelationGraph, registry: &NodeRegistry) -> bool {
    registry.get(key).is_some_and(IssueNode::is_epic) || graph.is_group_parent(key)
}

/// Select forest entry points from a query result.
///
/// Group nodes are never plain roots; a group referenced by a query member
/// but absent from the query result itself still becomes a section header at
/// the position of its first referencing member. When the result contains no
/// group nodes at all, ungrouped issues are the only entries.
pub fn select_forest_roots(
    query_order: &[IssueKey],
    graph: &RelationGraph,
    registry: &NodeRegistry,
) -> Vec<ForestRoot> {
    let mut chosen = HashSet::new();
    let mut out = Vec::new();

    for key in query_order {
        if is_group_node(key, graph, registry) {
            if chosen.insert(key.clone()) {
                out.push(ForestRoot::Group(key.clone()));
            }
            continue;
        }

        // A member surfaces its group head at the member's position.
        for parent in graph.group_parents(key) {
            if chosen.insert(parent.clone()) {
                out.push(ForestRoot::Group(parent));
            }
        }

        if !graph.is_child_somewhere(key) && chosen.insert(key.clone()) {
            out.push(ForestRoot::Issue(key.clone()));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Edge, EdgeKind};

    fn key(s: &str) -> IssueKey {
        IssueKey::new(s)
    }

    fn graph_of(edges: &[(&str, &str, EdgeKind)]) -> RelationGraph {
        let mut graph = RelationGraph::new();
        for (parent, child, kind) in edges {
            graph.add_edge(&Edge::new(*parent, *child, *kind));
        }
        graph
    }

    fn registry_with_epic(epic: &str, others: &[&str]) -> NodeRegistry {
        let mut registry = NodeRegistry::new();
        let mut node = IssueNode::placeholder(key(epic));
        node.unavailable = false;
        node.issue_type = "Epic".to_string();
        registry.insert(node);
        for other in others {
            let mut node = IssueNode::placeholder(key(other));
            node.unavailable = false;
            node.issue_type = "Task".to_string();
            registry.insert(node);
        }
        registry
    }

    #[test]
    fn test_group_in_query_becomes_section_header() {
        let graph = graph_of(&[
            ("E1", "T1", EdgeKind::GroupLink),
            ("E1", "T2", EdgeKind::GroupLink),
        ]);
        let registry = registry_with_epic("E1", &["T1", "T2"]);
        let order = [key("E1"), key("T1"), key("T2")];

        let roots = select_forest_roots(&order, &graph, &registry);
        assert_eq!(roots, vec![ForestRoot::Group(key("E1"))]);
    }

    #[test]
    fn test_external_group_surfaces_at_first_member() {
        // E1 is not in the query result; T1 references it.
        let graph = graph_of(&[("E1", "T1", EdgeKind::GroupLink)]);
        let registry = registry_with_epic("E1", &["T1", "S1"]);
        let order = [key("S1"), key("T1")];

        let roots = select_forest_roots(&order, &graph, &registry);
        assert_eq!(
            roots,
            vec![ForestRoot::Issue(key("S1")), ForestRoot::Group(key("E1"))]
        );
    }

    #[test]
    fn test_children_are_not_roots() {
        let graph = graph_of(&[("T1", "T2", EdgeKind::Containment)]);
        let registry = registry_with_epic("E0", &["T1", "T2"]);
        let order = [key("T1"), key("T2")];

        let roots = select_forest_roots(&order, &graph, &registry);
        assert_eq!(roots, vec![ForestRoot::Issue(key("T1"))]);
    }

    #[test]
    fn test_no_groups_means_plain_roots_only() {
        let graph = graph_of(&[]);
        let registry = registry_with_epic("E0", &["A", "B"]);
        let order = [key("A"), key("B")];

        let roots = select_forest_roots(&order, &graph, &registry);
        assert_eq!(
            roots,
            vec![ForestRoot::Issue(key("A")), ForestRoot::Issue(key("B"))]
        );
    }

    #[test]
    fn test_placeholder_group_detected_by_group_link() {
        // E9 has no registered record but parents a GroupLink edge.
        let graph = graph_of(&[("E9", "T1", EdgeKind::GroupLink)]);
        let registry = NodeRegistry::new();
        assert!(is_group_node(&key("E9"), &graph, &registry));
        assert!(!is_group_node(&key("T1"), &graph, &registry));
    }

    #[test]
    fn test_query_order_is_preserved_and_deduplicated() {
        let graph = graph_of(&[
            ("E1", "T1", EdgeKind::GroupLink),
            ("E2", "T2", EdgeKind::GroupLink),
        ]);
        let registry = registry_with_epic("E1", &["E2", "T1", "T2", "A"]);
        let order = [key("T2"), key("A"), key("T1"), key("T2")];

        let roots = select_forest_roots(&order, &graph, &registry);
        assert_eq!(
            roots,
            vec![
                ForestRoot::Group(key("E2")),
                ForestRoot::Issue(key("A")),
                ForestRoot::Group(key("E1")),
            ]
        );
    }
}
