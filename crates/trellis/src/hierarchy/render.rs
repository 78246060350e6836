//! Cycle-safe depth-first tree rendering.
//!
//! The walk produces a flat, depth-annotated visit sequence. Cycle safety
//! comes from one global visited-set spanning the whole call: once a key has
//! been rendered, no later path renders it again, which flattens a DAG into
//! a tree by first discovery. Children are enumerated through the
//! assembler's fixed-priority ordering, and nodes with more children than
//! the display cap carry an explicit count of the remainder.

use crate::domain::{EdgeKind, IssueKey};
use crate::hierarchy::graph::RelationGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One emitted node of a rendered tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedNode {
    /// Issue key.
    pub key: IssueKey,

    /// Depth below the walk root (the root itself is depth 0).
    pub depth: usize,

    /// Whether this node is the last rendered sibling of its parent.
    pub is_last_sibling: bool,

    /// Number of further children suppressed by the display cap.
    pub omitted_children: usize,
}

/// Options for one tree walk.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Per-node child display cap.
    pub child_cap: usize,

    /// Depth bound; `None` means unbounded (forest mode).
    pub max_depth: Option<usize>,

    /// Whether GroupLink children are followed.
    pub follow_group: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            child_cap: crate::config::DEFAULT_CHILD_CAP,
            max_depth: None,
            follow_group: true,
        }
    }
}

/// A depth-first walk over the relation graph.
///
/// The visited-set is owned by the walk and spans every root walked through
/// it, so one walk instance corresponds to one build pass.
pub struct TreeWalk<'g> {
    graph: &'g RelationGraph,
    options: WalkOptions,
    visited: HashSet<IssueKey>,
    depth_limited: bool,
}

impl<'g> TreeWalk<'g> {
    /// Create a walk over the given graph.
    pub fn new(graph: &'g RelationGraph, options: WalkOptions) -> Self {
        Self {
            graph,
            options,
            visited: HashSet::new(),
            depth_limited: false,
        }
    }

    /// Whether a key has already been rendered by this walk.
    pub fn is_visited(&self, key: &IssueKey) -> bool {
        self.visited.contains(key)
    }

    /// Whether any node's expansion was cut off by the depth bound.
    pub fn depth_limited(&self) -> bool {
        self.depth_limited
    }

    /// Walk one root, returning its rendered subtree.
    ///
    /// Returns an empty sequence when the root was already rendered through
    /// an earlier path.
    pub fn walk_root(&mut self, root: &IssueKey) -> Vec<RenderedNode> {
        let mut out = Vec::new();
        if self.visited.contains(root) {
            return out;
        }
        self.visit(root, 0, &mut out);
        if let Some(first) = out.first_mut() {
            first.is_last_sibling = true;
        }
        out
    }

    fn visit(&mut self, key: &IssueKey, depth: usize, out: &mut Vec<RenderedNode>) {
        self.visited.insert(key.clone());
        let index = out.len();
        out.push(RenderedNode {
            key: key.clone(),
            depth,
            is_last_sibling: false,
            omitted_children: 0,
        });

        let children = self.children_for_walk(key);
        if children.is_empty() {
            return;
        }
        if let Some(max) = self.options.max_depth {
            if depth >= max {
                if children.iter().any(|c| !self.visited.contains(c)) {
                    self.depth_limited = true;
                }
                return;
            }
        }

        let mut emitted = 0usize;
        let mut omitted = 0usize;
        let mut last_child_index = None;
        for child in children {
            if self.visited.contains(&child) {
                continue;
            }
            if emitted >= self.options.child_cap {
                omitted += 1;
                continue;
            }
            emitted += 1;
            last_child_index = Some(out.len());
            self.visit(&child, depth + 1, out);
        }

        if let Some(last) = last_child_index {
            out[last].is_last_sibling = true;
        }
        out[index].omitted_children = omitted;
    }

    /// A node's children in the fixed priority order, with GroupLink
    /// children dropped when the walk does not follow them.
    fn children_for_walk(&self, key: &IssueKey) -> Vec<IssueKey> {
        if self.options.follow_group {
            return self.graph.children(key);
        }
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for kind in [EdgeKind::Containment, EdgeKind::Coverage] {
            for child in self.graph.children_of_kind(key, kind) {
                if seen.insert(child.clone()) {
                    out.push(child);
                }
            }
        }
        out
    }
}
