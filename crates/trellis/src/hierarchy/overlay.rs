//! Optional folder overlay from an external structure.
//!
//! The overlay maps group nodes to folders of an independently maintained
//! tree, for display grouping only. It is consulted solely when a structure
//! source is configured; any failure loading the topology degrades the
//! build to group-only display with zero folders, never to an error.

use crate::domain::{IssueKey, StructureElement};
use crate::remote::StructureSource;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Resolved folder topology with memoized path computation.
#[derive(Debug)]
pub struct FolderOverlay {
    elements: HashMap<u64, StructureElement>,
    by_issue: HashMap<IssueKey, u64>,
    path_cache: HashMap<u64, Vec<String>>,
}

impl FolderOverlay {
    /// Build an overlay from a flat element list.
    pub fn from_elements(elements: Vec<StructureElement>) -> Self {
        let mut by_id = HashMap::new();
        let mut by_issue = HashMap::new();
        for element in elements {
            if let Some(key) = &element.issue_key {
                by_issue.insert(key.clone(), element.id);
            }
            by_id.insert(element.id, element);
        }
        Self {
            elements: by_id,
            by_issue,
            path_cache: HashMap::new(),
        }
    }

    /// Load the overlay from the structure source, absorbing every failure.
    ///
    /// Returns `None` when the topology is unavailable for any reason
    /// (missing structure, permission error, transport failure); callers
    /// then skip the overlay entirely.
    pub async fn load(
        source: &dyn StructureSource,
        structure_id: u64,
        max_results: u32,
    ) -> Option<Self> {
        match source.get_structure(structure_id, max_results).await {
            Ok(elements) => {
                debug!(structure_id, count = elements.len(), "Loaded folder topology");
                Some(Self::from_elements(elements))
            }
            Err(e) => {
                warn!(structure_id, error = %e, "Folder topology unavailable, skipping overlay");
                None
            }
        }
    }

    /// Root-to-leaf path of folder names for an element, memoized per id.
    ///
    /// Issue-bearing leaf elements have no name of their own, so their path
    /// is the path of their ancestors.
    pub fn folder_path(&mut self, element_id: u64) -> Vec<String> {
        if let Some(cached) = self.path_cache.get(&element_id) {
            return cached.clone();
        }

        // Walk up until a root, a cached ancestor, a missing element, or a
        // revisit (the topology is expected to be a strict tree, but a
        // malformed one must not hang the build).
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut base = Vec::new();
        let mut current = Some(element_id);
        while let Some(id) = current {
            if let Some(cached) = self.path_cache.get(&id) {
                base = cached.clone();
                break;
            }
            if !seen.insert(id) {
                warn!(element_id = id, "Folder chain contains a cycle, truncating");
                break;
            }
            let Some(element) = self.elements.get(&id) else {
                break;
            };
            chain.push((id, element.name.clone()));
            current = element.parent_id;
        }

        // Unwind from the root side, filling the cache for the whole chain.
        let mut path = base;
        for (id, name) in chain.into_iter().rev() {
            if !name.is_empty() {
                path.push(name);
            }
            self.path_cache.insert(id, path.clone());
        }
        path
    }

    /// Folder path of the element associated with an issue, if the issue is
    /// mapped and sits under at least one named folder.
    pub fn folder_of_issue(&mut self, key: &IssueKey) -> Option<Vec<String>> {
        let element_id = *self.by_issue.get(key)?;
        let path = self.folder_path(element_id);
        if path.is_empty() { None } else { Some(path) }
    }

    /// Folder assignment for a group node.
    ///
    /// A group belongs to a folder if the group itself maps to a leaf under
    /// it, or failing that, if any of its GroupLink members does. A group
    /// matching neither falls into the ungrouped bucket (`None`).
    pub fn folder_for_group(
        &mut self,
        group: &IssueKey,
        members: &[IssueKey],
    ) -> Option<Vec<String>> {
        if let Some(path) = self.folder_of_issue(group) {
            return Some(path);
        }
        members.iter().find_map(|member| self.folder_of_issue(member))
    }
}
