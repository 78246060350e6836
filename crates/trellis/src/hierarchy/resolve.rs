//! Resolution of referenced-but-absent nodes.
//!
//! After extraction, edge endpoints that are not in the node registry are
//! looked up against the issue source. Lookups for distinct keys are
//! independent and issued concurrently; the build suspends until all settle.
//! A failed lookup registers a placeholder node flagged unavailable instead
//! of aborting the build, and a key resolved through any path is never
//! looked up twice.

use crate::domain::{IssueKey, IssueNode};
use crate::hierarchy::NodeRegistry;
use crate::hierarchy::graph::RelationGraph;
use crate::remote::{FieldSelector, IssueSource};
use futures::future::join_all;
use tracing::{debug, warn};

/// Outcome of a resolution pass.
#[derive(Debug, Default)]
pub struct ResolveReport {
    /// Keys registered as unavailable placeholders.
    pub unavailable: Vec<IssueKey>,
}

/// Fetch every edge endpoint missing from the registry, concurrently.
///
/// Successful lookups register full nodes; not-found and failed lookups
/// register placeholders and are reported as unavailable.
pub async fn resolve_missing(
    source: &dyn IssueSource,
    graph: &RelationGraph,
    registry: &mut NodeRegistry,
) -> ResolveReport {
    let missing: Vec<IssueKey> = graph
        .keys()
        .into_iter()
        .filter(|key| !registry.contains(key))
        .collect();
    if missing.is_empty() {
        return ResolveReport::default();
    }
    debug!(count = missing.len(), "Resolving referenced issues absent from the working set");

    let fields = FieldSelector::hierarchy();
    let lookups = missing.iter().map(|key| {
        let fields = &fields;
        async move { (key.clone(), source.get_issue(key, fields).await) }
    });
    let results = join_all(lookups).await;

    let mut report = ResolveReport::default();
    for (key, result) in results {
        match result {
            Ok(Some(raw)) => {
                registry.insert(raw.to_node());
            }
            Ok(None) => {
                warn!(key = %key, "Referenced issue not found, registering placeholder");
                registry.insert(IssueNode::placeholder(key.clone()));
                report.unavailable.push(key);
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Lookup failed, registering placeholder");
                registry.insert(IssueNode::placeholder(key.clone()));
                report.unavailable.push(key);
            }
        }
    }
    report
}

/// Register a bare placeholder for any endpoint still missing, without
/// fetching.
///
/// Used after a depth-bounded fetch pass, where edges can reference keys the
/// bound stopped the worklist from visiting: the registry invariant (every
/// endpoint registered before rendering) still holds, but nothing beyond the
/// bound is fetched.
pub fn register_missing_endpoints(graph: &RelationGraph, registry: &mut NodeRegistry) {
    for key in graph.keys() {
        if !registry.contains(&key) {
            registry.insert(IssueNode::placeholder(key));
        }
    }
}
