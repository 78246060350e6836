//! Output formatting for CLI commands.
//!
//! This module provides utilities for formatting command output in both
//! human-readable text format and JSON format for programmatic use.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors, icons)
//! - [`tree`]: Hierarchy rendering with ASCII/Unicode connectors

pub mod color;
pub mod tree;

use crate::domain::{EdgeKind, IssueDetails, Relation};
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, info, success, warning};
pub use tree::{forest_to_json, print_forest, print_rooted, rooted_to_json};

use color::{bold, colorize_key, colorize_priority, colorize_status, dimmed};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 80;

/// Configuration for output formatting.
///
/// Holds settings that control how output is formatted, including content
/// width limits, ASCII fallback mode, and color output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create an OutputConfig with explicit values.
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `TRELLIS_MAX_WIDTH`: Maximum content width (default: 80)
    /// - `TRELLIS_ASCII`: Set to "1" or "true" for ASCII-only icons
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables)
    /// - `TRELLIS_COLOR`: Set to "0" or "false" to disable colors
    pub fn from_env() -> Self {
        let max_width = match env::var("TRELLIS_MAX_WIDTH") {
            Ok(s) if !s.is_empty() => match s.parse() {
                Ok(width) => width,
                Err(_) => {
                    tracing::warn!(
                        env_var = "TRELLIS_MAX_WIDTH",
                        value = %s,
                        default = DEFAULT_MAX_CONTENT_WIDTH,
                        "Invalid value, using default"
                    );
                    DEFAULT_MAX_CONTENT_WIDTH
                }
            },
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_ascii = match env::var("TRELLIS_ASCII") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Ok(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Ok(v) => {
                tracing::warn!(
                    env_var = "TRELLIS_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            Err(_) => false,
        };

        // Respect NO_COLOR standard (https://no-color.org/)
        // Also support TRELLIS_COLOR for explicit control
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("TRELLIS_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

// ============================================================================
// Terminal Width Detection
// ============================================================================

/// Get the current terminal width, falling back to default if detection
/// fails.
fn get_terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH as usize)
}

/// Wrap text to the given width.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    textwrap::wrap(text, width.max(20))
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect()
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

impl OutputMode {
    /// Choose the mode from the CLI's `--json` flag.
    pub fn from_json_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Text }
    }
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let output = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    println!("{output}");
    Ok(())
}

// ============================================================================
// Issue Detail View
// ============================================================================

/// Print the single-issue detail view.
pub fn print_issue_details(details: &IssueDetails, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(details),
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let config = OutputConfig::from_env();
            print_issue_details_text(&mut handle, details, &config)
        }
    }
}

fn print_issue_details_text<W: Write>(
    w: &mut W,
    details: &IssueDetails,
    config: &OutputConfig,
) -> io::Result<()> {
    let width = get_terminal_width().min(config.max_width);

    writeln!(
        w,
        "{} {}",
        bold(&colorize_key(details.key.as_str(), config), config),
        details.summary
    )?;
    writeln!(w)?;
    writeln!(
        w,
        "{} {}",
        dimmed("Status:", config),
        colorize_status(&details.status, config)
    )?;
    if let Some(priority) = &details.priority {
        writeln!(
            w,
            "{} {}",
            dimmed("Priority:", config),
            colorize_priority(priority, config)
        )?;
    }
    if !details.issue_type.is_empty() {
        writeln!(w, "{} {}", dimmed("Type:", config), details.issue_type)?;
    }
    if let Some(assignee) = &details.assignee {
        writeln!(w, "{} {}", dimmed("Assignee:", config), assignee)?;
    }
    if !details.labels.is_empty() {
        writeln!(w, "{} {}", dimmed("Labels:", config), details.labels.join(", "))?;
    }
    if let Some(created) = &details.created {
        writeln!(
            w,
            "{} {}",
            dimmed("Created:", config),
            created.format("%Y-%m-%d %H:%M")
        )?;
    }
    if let Some(updated) = &details.updated {
        writeln!(
            w,
            "{} {}",
            dimmed("Updated:", config),
            updated.format("%Y-%m-%d %H:%M")
        )?;
    }

    if let Some(description) = &details.description {
        if !description.is_empty() {
            writeln!(w)?;
            writeln!(w, "{}:", bold("Description", config))?;
            for line in wrap_text(description, width.saturating_sub(2)) {
                writeln!(w, "  {line}")?;
            }
        }
    }

    if !details.relations.is_empty() {
        writeln!(w)?;
        writeln!(w, "{} ({}):", bold("Relations", config), details.relations.len())?;
        for relation in &details.relations {
            writeln!(
                w,
                "  {} {}",
                dimmed(relation_label(relation), config),
                colorize_key(relation.other.as_str(), config)
            )?;
        }
    }

    Ok(())
}

/// Human label for a relation, from this issue's point of view.
fn relation_label(relation: &Relation) -> &'static str {
    match (relation.kind, relation.is_parent) {
        (EdgeKind::GroupLink, true) => "groups",
        (EdgeKind::GroupLink, false) => "in group",
        (EdgeKind::Containment, true) => "contains",
        (EdgeKind::Containment, false) => "child of",
        (EdgeKind::Coverage, true) => "covers",
        (EdgeKind::Coverage, false) => "covered by",
    }
}
