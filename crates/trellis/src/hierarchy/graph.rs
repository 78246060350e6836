//! Relationship graph assembly using petgraph.
//!
//! Edges from all relationship kinds are merged into one directed graph with
//! a key-to-node index map. The child ordering contract lives here:
//! `children` returns a node's children deduplicated across kinds, in fixed
//! priority order GroupLink, Containment, Coverage, each kind in discovery
//! order. Render order depends on this, so it must stay reproducible.
//!
//! The graph is append-only within one build pass.

use crate::domain::{Edge, EdgeKind, IssueKey};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

/// Merged adjacency over all relationship kinds for one build pass.
#[derive(Debug, Default)]
pub struct RelationGraph {
    graph: DiGraph<IssueKey, EdgeKind>,
    node_map: HashMap<IssueKey, NodeIndex>,
}

impl RelationGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a key, returning its node index.
    fn index_of(&mut self, key: &IssueKey) -> NodeIndex {
        match self.node_map.get(key) {
            Some(&idx) => idx,
            None => {
                let idx = self.graph.add_node(key.clone());
                self.node_map.insert(key.clone(), idx);
                idx
            }
        }
    }

    /// Add an edge, ignoring exact duplicates (same endpoints, same kind).
    pub fn add_edge(&mut self, edge: &Edge) {
        let parent = self.index_of(&edge.parent);
        let child = self.index_of(&edge.child);
        let duplicate = self
            .graph
            .edges_connecting(parent, child)
            .any(|e| *e.weight() == edge.kind);
        if !duplicate {
            self.graph.add_edge(parent, child, edge.kind);
        }
    }

    /// Outgoing edges of a key in discovery order.
    ///
    /// petgraph iterates a node's outgoing edges most-recent-first, so the
    /// collected list is reversed to restore insertion order.
    fn outgoing(&self, key: &IssueKey) -> Vec<(EdgeKind, IssueKey)> {
        let Some(&idx) = self.node_map.get(key) else {
            return Vec::new();
        };
        let mut edges: Vec<(EdgeKind, IssueKey)> = self
            .graph
            .edges(idx)
            .map(|e| (*e.weight(), self.graph[e.target()].clone()))
            .collect();
        edges.reverse();
        edges
    }

    /// All children of a key, deduplicated, concatenated in fixed priority
    /// order GroupLink, Containment, Coverage; each kind in discovery order.
    pub fn children(&self, key: &IssueKey) -> Vec<IssueKey> {
        let edges = self.outgoing(key);
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for kind in EdgeKind::PRIORITY_ORDER {
            for (edge_kind, child) in &edges {
                if *edge_kind == kind && seen.insert(child.clone()) {
                    out.push(child.clone());
                }
            }
        }
        out
    }

    /// Children of a key restricted to one kind, in discovery order.
    pub fn children_of_kind(&self, key: &IssueKey, kind: EdgeKind) -> Vec<IssueKey> {
        self.outgoing(key)
            .into_iter()
            .filter(|(edge_kind, _)| *edge_kind == kind)
            .map(|(_, child)| child)
            .collect()
    }

    /// Whether the key appears as a child in any relationship kind.
    pub fn is_child_somewhere(&self, key: &IssueKey) -> bool {
        self.node_map.get(key).is_some_and(|&idx| {
            self.graph
                .edges_directed(idx, Direction::Incoming)
                .next()
                .is_some()
        })
    }

    /// GroupLink parents of a key, in discovery order.
    pub fn group_parents(&self, key: &IssueKey) -> Vec<IssueKey> {
        let Some(&idx) = self.node_map.get(key) else {
            return Vec::new();
        };
        let mut parents: Vec<IssueKey> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .filter(|e| *e.weight() == EdgeKind::GroupLink)
            .map(|e| self.graph[e.source()].clone())
            .collect();
        parents.reverse();
        parents
    }

    /// Whether the key has outgoing GroupLink edges (i.e. acts as a group
    /// node even if its record is a placeholder).
    pub fn is_group_parent(&self, key: &IssueKey) -> bool {
        self.node_map.get(key).is_some_and(|&idx| {
            self.graph.edges(idx).any(|e| *e.weight() == EdgeKind::GroupLink)
        })
    }

    /// Every key that appears as an edge endpoint, in discovery order.
    pub fn keys(&self) -> Vec<IssueKey> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].clone())
            .collect()
    }
}
