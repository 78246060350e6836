//! Issue-relationship hierarchy builder.
//!
//! This is the core subsystem: given issue records whose cross-references
//! arrive through several independently shaped mechanisms (a grouping
//! reference plus two kinds of bidirectional typed links) and an optional
//! external folder topology, it assembles one coherent, cycle-safe tree for
//! display.
//!
//! # Pipeline
//!
//! Records flow through the extractor into the assembler; dangling
//! references go through the resolver; the folder overlay loads
//! independently and is consulted only for group headers; the root selector
//! picks entry points; the renderer walks each entry with one global
//! visited-set.
//!
//! All state is private to a single build call. Nothing is shared or
//! persisted across calls.
//!
//! # Failure semantics
//!
//! Partial data, an unavailable topology, and a reached depth bound are
//! absorbed into the result as [`BuildWarning`]s and placeholder flags. The
//! only distinguishable failure is a rooted build whose start key cannot be
//! resolved at all.

pub mod extract;
pub mod graph;
pub mod overlay;
pub mod render;
pub mod resolve;
pub mod roots;

use crate::config::{DEFAULT_CHILD_CAP, DEFAULT_MAX_RESULTS, clamp_tree_depth};
use crate::domain::{Edge, EdgeKind, IssueKey, IssueNode};
use crate::error::{Error, Result};
use crate::remote::records::RawIssue;
use crate::remote::{FieldSelector, IssueSource, StructureSource};
use futures::future::join_all;
use graph::RelationGraph;
use overlay::FolderOverlay;
use render::{RenderedNode, TreeWalk, WalkOptions};
use roots::ForestRoot;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::warn;

/// Append-only node registry for one build pass.
///
/// A key registers at most once; the first registration wins, so full
/// records beat stubs and stubs beat placeholders as long as they are
/// inserted in that order.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: HashMap<IssueKey, IssueNode>,
}

impl NodeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node unless its key is already present.
    ///
    /// Returns `true` when the node was inserted.
    pub fn insert(&mut self, node: IssueNode) -> bool {
        match self.nodes.entry(node.key.clone()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(node);
                true
            }
        }
    }

    /// Whether a key is registered.
    pub fn contains(&self, key: &IssueKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Look up a registered node.
    pub fn get(&self, key: &IssueKey) -> Option<&IssueNode> {
        self.nodes.get(key)
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Non-fatal conditions surfaced in a build result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum BuildWarning {
    /// One or more referenced issues could not be fetched and appear as
    /// placeholders.
    PartialData(Vec<IssueKey>),

    /// The folder topology was configured but unavailable; the hierarchy
    /// degrades to group-only display.
    TopologyUnavailable,

    /// A rooted traversal was truncated at its depth bound.
    DepthLimitReached,
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::PartialData(keys) => {
                let joined: Vec<&str> = keys.iter().map(IssueKey::as_str).collect();
                write!(f, "unavailable issues: {}", joined.join(", "))
            }
            BuildWarning::TopologyUnavailable => {
                write!(f, "folder topology unavailable, showing groups only")
            }
            BuildWarning::DepthLimitReached => {
                write!(f, "depth limit reached, deeper levels not expanded")
            }
        }
    }
}

/// One rendered forest entry: a group section or a plain root tree.
///
/// `nodes[0]` is always the entry's own node at depth 0; for group entries
/// the display layer renders it as a section header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestEntry {
    /// Key of the entry point.
    pub root: IssueKey,

    /// Whether the entry is a group section header.
    pub is_group: bool,

    /// Depth-first visit sequence, entry point included.
    pub nodes: Vec<RenderedNode>,
}

/// Entries grouped under one folder path; the ungrouped bucket has an empty
/// path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderBucket {
    /// Root-to-leaf folder names; empty for the ungrouped bucket.
    pub path: Vec<String>,

    /// Entries in this bucket, in entry order.
    pub entries: Vec<ForestEntry>,
}

/// Result of a query-driven (forest) build.
#[derive(Debug)]
pub struct ForestHierarchy {
    /// Folder buckets in first-appearance order, ungrouped bucket last.
    pub buckets: Vec<FolderBucket>,

    /// Number of distinct folders matched (zero when the overlay was
    /// skipped).
    pub folder_count: usize,

    /// Absorbed non-fatal conditions.
    pub warnings: Vec<BuildWarning>,

    /// Node data for every rendered key.
    pub registry: NodeRegistry,
}

/// Result of a single-root build.
#[derive(Debug)]
pub struct RootedHierarchy {
    /// Depth-first visit sequence from the root.
    pub nodes: Vec<RenderedNode>,

    /// Whether the depth bound cut anything off.
    pub depth_limited: bool,

    /// Absorbed non-fatal conditions.
    pub warnings: Vec<BuildWarning>,

    /// Node data for every rendered key.
    pub registry: NodeRegistry,
}

/// Options for a hierarchy builder.
#[derive(Debug, Clone)]
pub struct HierarchyOptions {
    /// Per-node child display cap.
    pub child_cap: usize,

    /// Folder structure to overlay, when configured.
    pub structure_id: Option<u64>,

    /// Page size for the structure element fetch.
    pub structure_max: u32,

    /// Page size for group-member discovery in rooted mode.
    pub group_members_max: u32,
}

impl Default for HierarchyOptions {
    fn default() -> Self {
        Self {
            child_cap: DEFAULT_CHILD_CAP,
            structure_id: None,
            structure_max: 1000,
            group_members_max: DEFAULT_MAX_RESULTS,
        }
    }
}

/// A record or key pending expansion in the rooted-mode worklist.
enum Pending {
    Key(IssueKey),
    Record(Box<RawIssue>),
}

/// Builds display hierarchies against the configured sources.
pub struct HierarchyBuilder<'a> {
    issues: &'a dyn IssueSource,
    structure: Option<&'a dyn StructureSource>,
    options: HierarchyOptions,
}

impl<'a> HierarchyBuilder<'a> {
    /// Create a builder over an issue source.
    pub fn new(issues: &'a dyn IssueSource) -> Self {
        Self {
            issues,
            structure: None,
            options: HierarchyOptions::default(),
        }
    }

    /// Configure the optional folder-structure source.
    #[must_use]
    pub fn with_structure(mut self, structure: &'a dyn StructureSource) -> Self {
        self.structure = Some(structure);
        self
    }

    /// Override the builder options.
    #[must_use]
    pub fn with_options(mut self, options: HierarchyOptions) -> Self {
        self.options = options;
        self
    }

    /// Build a forest hierarchy from a search query.
    ///
    /// # Errors
    ///
    /// Fails only when the search itself fails; every per-node condition is
    /// absorbed into warnings and placeholder nodes.
    pub async fn build_forest(&self, query: &str, max_results: u32) -> Result<ForestHierarchy> {
        let fields = FieldSelector::hierarchy();
        let page = self.issues.search_issues(query, &fields, max_results).await?;

        let mut registry = NodeRegistry::new();
        let mut graph = RelationGraph::new();
        let mut query_order = Vec::new();
        for raw in &page.issues {
            if registry.insert(raw.to_node()) {
                query_order.push(IssueKey::new(&raw.key));
            }
        }
        for raw in &page.issues {
            let extraction = extract::extract(raw);
            for edge in &extraction.edges {
                graph.add_edge(edge);
            }
            for stub in extraction.stubs {
                registry.insert(stub);
            }
        }

        let mut warnings = Vec::new();
        let report = resolve::resolve_missing(self.issues, &graph, &mut registry).await;
        if !report.unavailable.is_empty() {
            warnings.push(BuildWarning::PartialData(report.unavailable));
        }

        let mut folder_overlay = match (self.structure, self.options.structure_id) {
            (Some(source), Some(id)) => {
                let loaded = FolderOverlay::load(source, id, self.options.structure_max).await;
                if loaded.is_none() {
                    warnings.push(BuildWarning::TopologyUnavailable);
                }
                loaded
            }
            _ => None,
        };

        let selected = roots::select_forest_roots(&query_order, &graph, &registry);
        let mut walk = TreeWalk::new(
            &graph,
            WalkOptions {
                child_cap: self.options.child_cap,
                max_depth: None,
                follow_group: true,
            },
        );
        let mut entries = Vec::new();
        for root in selected {
            let is_group = matches!(root, ForestRoot::Group(_));
            let key = root.key().clone();
            let nodes = walk.walk_root(&key);
            if !nodes.is_empty() {
                entries.push(ForestEntry {
                    root: key,
                    is_group,
                    nodes,
                });
            }
        }

        let mut buckets: Vec<FolderBucket> = Vec::new();
        let mut folder_count = 0;
        for entry in entries {
            let path = match (&mut folder_overlay, entry.is_group) {
                (Some(overlay), true) => {
                    let members = graph.children_of_kind(&entry.root, EdgeKind::GroupLink);
                    overlay
                        .folder_for_group(&entry.root, &members)
                        .unwrap_or_default()
                }
                _ => Vec::new(),
            };
            match buckets.iter_mut().find(|bucket| bucket.path == path) {
                Some(bucket) => bucket.entries.push(entry),
                None => {
                    if !path.is_empty() {
                        folder_count += 1;
                    }
                    buckets.push(FolderBucket {
                        path,
                        entries: vec![entry],
                    });
                }
            }
        }
        // Keep folder buckets in first-appearance order, ungrouped last.
        buckets.sort_by_key(|bucket| bucket.path.is_empty());

        Ok(ForestHierarchy {
            buckets,
            folder_count,
            warnings,
            registry,
        })
    }

    /// Build a hierarchy rooted at one key.
    ///
    /// Expansion is a depth-counted worklist of pending keys and records;
    /// one wave's independent lookups are issued concurrently and joined
    /// before the next wave starts. `max_depth` is clamped to the supported
    /// band.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IssueNotFound`] when the start key resolves to no
    /// record; other per-node failures become placeholders.
    pub async fn build_rooted(
        &self,
        root: &IssueKey,
        max_depth: usize,
        include_epic: bool,
    ) -> Result<RootedHierarchy> {
        let max_depth = clamp_tree_depth(max_depth);
        let fields = FieldSelector::hierarchy();

        let Some(root_raw) = self.issues.get_issue(root, &fields).await? else {
            return Err(Error::IssueNotFound(root.clone()));
        };

        let mut registry = NodeRegistry::new();
        let mut graph = RelationGraph::new();
        let mut fetched = HashSet::new();
        let mut unavailable = Vec::new();
        let mut fetch_truncated = false;

        fetched.insert(root.clone());
        let mut frontier = self
            .ingest(&root_raw, include_epic, &mut graph, &mut registry)
            .await;

        let mut depth = 1usize;
        while !frontier.is_empty() {
            if depth > max_depth {
                fetch_truncated = frontier.iter().any(|pending| match pending {
                    Pending::Key(key) => !registry.contains(key),
                    Pending::Record(_) => true,
                });
                break;
            }

            let mut wave_records = Vec::new();
            let mut wave_keys = Vec::new();
            for pending in frontier.drain(..) {
                match pending {
                    Pending::Record(raw) => {
                        let key = IssueKey::new(&raw.key);
                        if fetched.insert(key) {
                            wave_records.push(*raw);
                        }
                    }
                    Pending::Key(key) => {
                        // A key resolved through any earlier path is never
                        // looked up again.
                        if !registry.contains(&key) && fetched.insert(key.clone()) {
                            wave_keys.push(key);
                        }
                    }
                }
            }
            if wave_records.is_empty() && wave_keys.is_empty() {
                break;
            }

            let lookups = wave_keys.iter().map(|key| {
                let fields = &fields;
                async move { (key.clone(), self.issues.get_issue(key, fields).await) }
            });
            let results = join_all(lookups).await;

            let mut next = Vec::new();
            for raw in &wave_records {
                next.extend(
                    self.ingest(raw, include_epic, &mut graph, &mut registry)
                        .await,
                );
            }
            for (key, result) in results {
                match result {
                    Ok(Some(raw)) => {
                        next.extend(
                            self.ingest(&raw, include_epic, &mut graph, &mut registry)
                                .await,
                        );
                    }
                    Ok(None) => {
                        warn!(key = %key, "Referenced issue not found, registering placeholder");
                        registry.insert(IssueNode::placeholder(key.clone()));
                        unavailable.push(key);
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "Lookup failed, registering placeholder");
                        registry.insert(IssueNode::placeholder(key.clone()));
                        unavailable.push(key);
                    }
                }
            }
            frontier = next;
            depth += 1;
        }

        // Edges can reference keys the bound kept the worklist from
        // visiting; they still need registry entries before rendering.
        resolve::register_missing_endpoints(&graph, &mut registry);

        let mut walk = TreeWalk::new(
            &graph,
            WalkOptions {
                child_cap: self.options.child_cap,
                max_depth: Some(max_depth),
                follow_group: include_epic,
            },
        );
        let nodes = walk.walk_root(root);
        let depth_limited = walk.depth_limited() || fetch_truncated;

        let mut warnings = Vec::new();
        if !unavailable.is_empty() {
            warnings.push(BuildWarning::PartialData(unavailable));
        }
        if depth_limited {
            warnings.push(BuildWarning::DepthLimitReached);
        }

        Ok(RootedHierarchy {
            nodes,
            depth_limited,
            warnings,
            registry,
        })
    }

    /// Register one record, merge its edges, and return what it discovered
    /// for the next worklist wave.
    ///
    /// A group node's members are not listed on its own record; they point
    /// at it through their grouping field, so member discovery runs a scoped
    /// search when GroupLink expansion is enabled. A failing member search
    /// degrades to whatever the edges already show.
    async fn ingest(
        &self,
        raw: &RawIssue,
        include_epic: bool,
        graph: &mut RelationGraph,
        registry: &mut NodeRegistry,
    ) -> Vec<Pending> {
        let me = IssueKey::new(&raw.key);
        let node = raw.to_node();
        let is_epic = node.is_epic();
        registry.insert(node);

        let mut discovered = Vec::new();
        let extraction = extract::extract(raw);
        for edge in &extraction.edges {
            graph.add_edge(edge);
            if edge.parent == me && (include_epic || edge.kind != EdgeKind::GroupLink) {
                discovered.push(Pending::Key(edge.child.clone()));
            }
        }
        for stub in extraction.stubs {
            registry.insert(stub);
        }

        if include_epic && is_epic {
            let query = format!("parent = {me}");
            match self
                .issues
                .search_issues(&query, &FieldSelector::hierarchy(), self.options.group_members_max)
                .await
            {
                Ok(page) => {
                    for member in page.issues {
                        let member_key = IssueKey::new(&member.key);
                        graph.add_edge(&Edge::new(
                            me.clone(),
                            member_key,
                            EdgeKind::GroupLink,
                        ));
                        discovered.push(Pending::Record(Box::new(member)));
                    }
                }
                Err(e) => {
                    warn!(key = %me, error = %e, "Group member search failed");
                }
            }
        }

        discovered
    }
}
