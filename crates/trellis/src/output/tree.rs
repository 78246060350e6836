//! Hierarchy rendering with ASCII/Unicode connectors.
//!
//! Consumes the flat, depth-annotated visit sequences produced by the
//! hierarchy renderer and draws them as trees:
//!
//! ```text
//! ◆ EPIC-1 Checkout rework
//! ├── PROJ-2 Add payment form ▶
//! │   └── PROJ-4 Form validation ○
//! └── PROJ-3 Wire up API ✓
//! ```

use std::io::{self, Write};

use crate::domain::IssueKey;
use crate::hierarchy::render::RenderedNode;
use crate::hierarchy::{ForestHierarchy, NodeRegistry, RootedHierarchy};
use serde_json::{Value, json};

use super::color::{
    bold, colored_status_icon, colorize_key, colorize_priority, dimmed, group_icon, root_icon,
    unavailable_marker, warning,
};
use super::{OutputConfig, OutputMode};

/// Print a forest hierarchy.
pub fn print_forest(forest: &ForestHierarchy, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_forest_text(&mut handle, forest, &config),
        OutputMode::Json => {
            let output =
                serde_json::to_string_pretty(&forest_to_json(forest)).map_err(io::Error::other)?;
            writeln!(handle, "{}", output)
        }
    }
}

/// Print a rooted hierarchy.
pub fn print_rooted(tree: &RootedHierarchy, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_rooted_text(&mut handle, tree, &config),
        OutputMode::Json => {
            let output =
                serde_json::to_string_pretty(&rooted_to_json(tree)).map_err(io::Error::other)?;
            writeln!(handle, "{}", output)
        }
    }
}

/// Render a forest as text: folder headers, group sections, root trees, and
/// a warnings footer.
pub(crate) fn print_forest_text<W: Write>(
    w: &mut W,
    forest: &ForestHierarchy,
    config: &OutputConfig,
) -> io::Result<()> {
    let mut first = true;
    for bucket in &forest.buckets {
        if bucket.entries.is_empty() {
            continue;
        }
        if !first {
            writeln!(w)?;
        }
        first = false;

        if bucket.path.is_empty() {
            // Label the leftover bucket only when folders are in play.
            if forest.folder_count > 0 {
                writeln!(w, "{}", bold("Ungrouped", config))?;
            }
        } else {
            writeln!(w, "{}", bold(&bucket.path.join(" / "), config))?;
        }

        for entry in &bucket.entries {
            let icon = if entry.is_group {
                group_icon(config)
            } else {
                root_icon(config)
            };
            print_visit_sequence(w, &entry.nodes, &forest.registry, &icon, config)?;
        }
    }

    print_warnings(w, &forest.warnings, config)
}

/// Render a rooted tree as text with a warnings footer.
pub(crate) fn print_rooted_text<W: Write>(
    w: &mut W,
    tree: &RootedHierarchy,
    config: &OutputConfig,
) -> io::Result<()> {
    print_visit_sequence(w, &tree.nodes, &tree.registry, &root_icon(config), config)?;
    print_warnings(w, &tree.warnings, config)
}

fn print_warnings<W: Write>(
    w: &mut W,
    warnings: &[crate::hierarchy::BuildWarning],
    config: &OutputConfig,
) -> io::Result<()> {
    if warnings.is_empty() {
        return Ok(());
    }
    writeln!(w)?;
    for item in warnings {
        writeln!(w, "{}", warning(&format!("! {item}"), config))?;
    }
    Ok(())
}

/// Render one flat visit sequence with connector art.
///
/// `last_flags` tracks, per ancestor level, whether that ancestor was the
/// last of its siblings, which decides between a continuation pipe and
/// blank space. Truncation markers are queued per capped node and flushed
/// once its subtree ends.
fn print_visit_sequence<W: Write>(
    w: &mut W,
    nodes: &[RenderedNode],
    registry: &NodeRegistry,
    header_icon: &str,
    config: &OutputConfig,
) -> io::Result<()> {
    let (branch, corner, pipe, space) = if config.use_ascii {
        ("|-- ", "`-- ", "|   ", "    ")
    } else {
        ("├── ", "└── ", "│   ", "    ")
    };

    let mut last_flags: Vec<bool> = Vec::new();
    // (children_depth, omitted count, prefix) for capped nodes.
    let mut pending_markers: Vec<(usize, usize, String)> = Vec::new();

    for node in nodes {
        flush_markers(w, &mut pending_markers, node.depth, config)?;

        if node.depth == 0 {
            last_flags.clear();
            writeln!(
                w,
                "{} {}",
                header_icon,
                node_label(&node.key, registry, config)
            )?;
        } else {
            last_flags.truncate(node.depth - 1);
            let mut prefix = String::new();
            for &was_last in &last_flags {
                let segment = if was_last { space } else { pipe };
                if config.use_colors {
                    prefix.push_str(&dimmed(segment, config));
                } else {
                    prefix.push_str(segment);
                }
            }
            let connector = if node.is_last_sibling { corner } else { branch };
            let connector_str = if config.use_colors {
                dimmed(connector, config)
            } else {
                connector.to_string()
            };
            writeln!(
                w,
                "{}{}{}",
                prefix,
                connector_str,
                node_label(&node.key, registry, config)
            )?;
            last_flags.push(node.is_last_sibling);
        }

        if node.omitted_children > 0 {
            let level = if node.depth == 0 { 0 } else { node.depth };
            let mut prefix = String::new();
            for &was_last in last_flags.iter().take(level) {
                prefix.push_str(if was_last { space } else { pipe });
            }
            pending_markers.push((node.depth + 1, node.omitted_children, prefix));
        }
    }
    flush_markers(w, &mut pending_markers, 0, config)
}

/// Emit queued truncation markers whose subtree has ended.
fn flush_markers<W: Write>(
    w: &mut W,
    pending: &mut Vec<(usize, usize, String)>,
    current_depth: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    while let Some((children_depth, count, prefix)) = pending.last() {
        if current_depth >= *children_depth {
            break;
        }
        let marker = if config.use_ascii {
            format!("... and {count} more")
        } else {
            format!("… and {count} more")
        };
        writeln!(w, "{}{}", prefix, dimmed(&marker, config))?;
        pending.pop();
    }
    Ok(())
}

/// One node's display label: key, summary, status icon, availability.
fn node_label(key: &IssueKey, registry: &NodeRegistry, config: &OutputConfig) -> String {
    let key_str = colorize_key(key.as_str(), config);
    let Some(node) = registry.get(key) else {
        return key_str;
    };

    let mut label = key_str;
    if let Some(priority) = &node.priority {
        label.push(' ');
        label.push_str(&format!("[{}]", colorize_priority(priority, config)));
    }
    if !node.summary.is_empty() {
        label.push(' ');
        label.push_str(&node.summary);
    }
    if !node.unavailable {
        label.push(' ');
        label.push_str(&colored_status_icon(node.status.category, config));
    }
    label.push_str(&unavailable_marker(node, config));
    label
}

/// Convert a rooted hierarchy to a JSON value for programmatic output.
pub fn rooted_to_json(tree: &RootedHierarchy) -> Value {
    json!({
        "nodes": tree
            .nodes
            .iter()
            .map(|n| node_to_json(n, &tree.registry))
            .collect::<Vec<_>>(),
        "depth_limited": tree.depth_limited,
        "warnings": tree.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
    })
}

/// Convert a forest hierarchy to a JSON value for programmatic output.
pub fn forest_to_json(forest: &ForestHierarchy) -> Value {
    json!({
        "folders": forest
            .buckets
            .iter()
            .map(|bucket| {
                json!({
                    "path": bucket.path,
                    "entries": bucket
                        .entries
                        .iter()
                        .map(|entry| {
                            json!({
                                "root": entry.root.as_str(),
                                "is_group": entry.is_group,
                                "nodes": entry
                                    .nodes
                                    .iter()
                                    .map(|n| node_to_json(n, &forest.registry))
                                    .collect::<Vec<_>>(),
                            })
                        })
                        .collect::<Vec<_>>(),
                })
            })
            .collect::<Vec<_>>(),
        "folder_count": forest.folder_count,
        "warnings": forest.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
    })
}

fn node_to_json(node: &RenderedNode, registry: &NodeRegistry) -> Value {
    let mut obj = json!({
        "key": node.key.as_str(),
        "depth": node.depth,
    });
    if let Some(data) = registry.get(&node.key) {
        obj["summary"] = json!(data.summary);
        obj["status"] = json!(data.status.name);
        if let Some(priority) = &data.priority {
            obj["priority"] = json!(priority);
        }
        if !data.issue_type.is_empty() {
            obj["type"] = json!(data.issue_type);
        }
        if data.unavailable {
            obj["unavailable"] = json!(true);
        }
    }
    if node.omitted_children > 0 {
        obj["omitted_children"] = json!(node.omitted_children);
    }
    obj
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Edge, EdgeKind, IssueNode, IssueStatus, StatusCategory};
    use crate::hierarchy::graph::RelationGraph;
    use crate::hierarchy::render::{TreeWalk, WalkOptions};
    use crate::hierarchy::{BuildWarning, ForestEntry, FolderBucket};

    fn registry_of(keys: &[&str]) -> NodeRegistry {
        let mut registry = NodeRegistry::new();
        for key in keys {
            registry.insert(IssueNode {
                key: IssueKey::new(*key),
                summary: format!("Summary of {key}"),
                status: IssueStatus {
                    name: "Open".to_string(),
                    category: StatusCategory::New,
                },
                priority: None,
                issue_type: "Task".to_string(),
                unavailable: false,
            });
        }
        registry
    }

    fn walk_nodes(edges: &[(&str, &str, EdgeKind)], root: &str) -> Vec<RenderedNode> {
        let mut graph = RelationGraph::new();
        for (parent, child, kind) in edges {
            graph.add_edge(&Edge::new(*parent, *child, *kind));
        }
        let mut walk = TreeWalk::new(&graph, WalkOptions::default());
        walk.walk_root(&IssueKey::new(root))
    }

    #[test]
    fn test_tree_connectors() {
        let config = OutputConfig::new(80, false, false);
        let nodes = walk_nodes(
            &[
                ("R", "A", EdgeKind::Containment),
                ("R", "B", EdgeKind::Containment),
                ("A", "A1", EdgeKind::Containment),
            ],
            "R",
        );
        let registry = registry_of(&["R", "A", "B", "A1"]);
        let mut buffer = Vec::new();

        print_visit_sequence(&mut buffer, &nodes, &registry, "*", &config)
            .expect("tree rendering should succeed");
        let output = String::from_utf8(buffer).expect("output should be valid UTF-8");

        assert!(output.contains("* R"), "root line, got:\n{output}");
        assert!(output.contains("├── A"), "branch connector, got:\n{output}");
        assert!(
            output.contains("│   └── A1"),
            "continuation pipe for nested child, got:\n{output}"
        );
        assert!(output.contains("└── B"), "corner connector, got:\n{output}");
    }

    #[test]
    fn test_tree_ascii_mode() {
        let config = OutputConfig::new(80, true, false);
        let nodes = walk_nodes(&[("R", "A", EdgeKind::Containment)], "R");
        let registry = registry_of(&["R", "A"]);
        let mut buffer = Vec::new();

        print_visit_sequence(&mut buffer, &nodes, &registry, "*", &config).expect("should render");
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("`-- A"), "ASCII corner, got:\n{output}");
    }

    #[test]
    fn test_truncation_marker_after_subtree() {
        let config = OutputConfig::new(80, true, false);
        let mut graph = RelationGraph::new();
        for i in 0..25 {
            graph.add_edge(&Edge::new("R", format!("C{i}").as_str(), EdgeKind::Containment));
        }
        let mut walk = TreeWalk::new(
            &graph,
            WalkOptions {
                child_cap: 20,
                ..WalkOptions::default()
            },
        );
        let nodes = walk.walk_root(&IssueKey::new("R"));
        let registry = NodeRegistry::new();
        let mut buffer = Vec::new();

        print_visit_sequence(&mut buffer, &nodes, &registry, "*", &config).expect("should render");
        let output = String::from_utf8(buffer).unwrap();
        assert!(
            output.trim_end().ends_with("... and 5 more"),
            "marker should close the sequence, got:\n{output}"
        );
    }

    #[test]
    fn test_unknown_key_renders_bare() {
        let config = OutputConfig::new(80, false, false);
        let registry = NodeRegistry::new();
        assert_eq!(node_label(&IssueKey::new("X-1"), &registry, &config), "X-1");
    }

    #[test]
    fn test_unavailable_node_label() {
        let config = OutputConfig::new(80, false, false);
        let mut registry = NodeRegistry::new();
        registry.insert(IssueNode::placeholder(IssueKey::new("GONE-1")));
        let label = node_label(&IssueKey::new("GONE-1"), &registry, &config);
        assert!(label.contains("GONE-1"));
        assert!(label.contains("(unavailable)"));
    }

    #[test]
    fn test_forest_text_with_folder_headers() {
        let config = OutputConfig::new(80, false, false);
        let nodes = walk_nodes(&[("E1", "T1", EdgeKind::GroupLink)], "E1");
        let forest = ForestHierarchy {
            buckets: vec![
                FolderBucket {
                    path: vec!["Release".to_string(), "Backend".to_string()],
                    entries: vec![ForestEntry {
                        root: IssueKey::new("E1"),
                        is_group: true,
                        nodes,
                    }],
                },
                FolderBucket {
                    path: vec![],
                    entries: vec![],
                },
            ],
            folder_count: 1,
            warnings: vec![],
            registry: registry_of(&["E1", "T1"]),
        };
        let mut buffer = Vec::new();

        print_forest_text(&mut buffer, &forest, &config).expect("should render");
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("Release / Backend"), "got:\n{output}");
        assert!(output.contains("◆ E1"), "group header, got:\n{output}");
        assert!(output.contains("└── T1"), "member below header, got:\n{output}");
    }

    #[test]
    fn test_warnings_footer() {
        let config = OutputConfig::new(80, false, false);
        let tree = RootedHierarchy {
            nodes: walk_nodes(&[], "R"),
            depth_limited: true,
            warnings: vec![BuildWarning::DepthLimitReached],
            registry: registry_of(&["R"]),
        };
        let mut buffer = Vec::new();

        print_rooted_text(&mut buffer, &tree, &config).expect("should render");
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("! depth limit reached"), "got:\n{output}");
    }

    #[test]
    fn test_rooted_to_json_structure() {
        let tree = RootedHierarchy {
            nodes: walk_nodes(&[("R", "A", EdgeKind::Containment)], "R"),
            depth_limited: false,
            warnings: vec![],
            registry: registry_of(&["R", "A"]),
        };
        let value = rooted_to_json(&tree);
        assert_eq!(value["depth_limited"], false);
        let nodes = value["nodes"].as_array().expect("nodes array");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0]["key"], "R");
        assert_eq!(nodes[0]["depth"], 0);
        assert_eq!(nodes[1]["key"], "A");
        assert_eq!(nodes[1]["summary"], "Summary of A");
    }

    #[test]
    fn test_forest_to_json_counts() {
        let forest = ForestHierarchy {
            buckets: vec![FolderBucket {
                path: vec![],
                entries: vec![ForestEntry {
                    root: IssueKey::new("R"),
                    is_group: false,
                    nodes: walk_nodes(&[], "R"),
                }],
            }],
            folder_count: 0,
            warnings: vec![BuildWarning::TopologyUnavailable],
            registry: registry_of(&["R"]),
        };
        let value = forest_to_json(&forest);
        assert_eq!(value["folder_count"], 0);
        assert_eq!(value["folders"].as_array().unwrap().len(), 1);
        assert!(value["warnings"][0]
            .as_str()
            .unwrap()
            .contains("topology unavailable"));
    }
}
