//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:  green   (done status category)
//!   - Warning/Active: yellow (in-progress category, high priority)
//!   - Error:         red     (highest/blocker priority, unavailable nodes)
//!   - Info/Reference: cyan   (issue keys, root tree node)
//!   - Accent:        magenta (group headers, folder paths)
//!   - Muted:         dimmed  (field labels, connectors, markers)
//!   - Emphasis:      bold    (section headers)
//!   - Default:       white   (new status category)

use crate::domain::{IssueNode, IssueStatus, StatusCategory};
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Apply color to a status name based on its category.
pub(crate) fn colorize_status(status: &IssueStatus, config: &OutputConfig) -> String {
    if !config.use_colors {
        return status.name.clone();
    }
    match status.category {
        StatusCategory::New => status.name.white().to_string(),
        StatusCategory::InProgress => status.name.yellow().to_string(),
        StatusCategory::Done => status.name.green().to_string(),
    }
}

/// Apply color to a priority name.
pub(crate) fn colorize_priority(priority: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return priority.to_string();
    }
    match priority.to_lowercase().as_str() {
        "highest" | "blocker" | "critical" => priority.red().bold().to_string(),
        "high" => priority.yellow().to_string(),
        _ => priority.to_string(),
    }
}

/// Colorize an issue key (cyan).
pub(crate) fn colorize_key(key: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return key.to_string();
    }
    key.cyan().to_string()
}

/// Get a colored status icon, with ASCII fallback support.
pub(crate) fn colored_status_icon(category: StatusCategory, config: &OutputConfig) -> String {
    let icon = if config.use_ascii {
        match category {
            StatusCategory::New => "o",
            StatusCategory::InProgress => ">",
            StatusCategory::Done => "+",
        }
    } else {
        match category {
            StatusCategory::New => "○",
            StatusCategory::InProgress => "▶",
            StatusCategory::Done => "✓",
        }
    };

    if !config.use_colors {
        return icon.to_string();
    }

    match category {
        StatusCategory::New => icon.white().to_string(),
        StatusCategory::InProgress => icon.yellow().to_string(),
        StatusCategory::Done => icon.green().to_string(),
    }
}

/// Icon for a group (epic) section header.
pub(crate) fn group_icon(config: &OutputConfig) -> String {
    let icon = if config.use_ascii { "#" } else { "◆" };
    if !config.use_colors {
        return icon.to_string();
    }
    icon.magenta().bold().to_string()
}

/// Icon for a plain tree root.
pub(crate) fn root_icon(config: &OutputConfig) -> String {
    let icon = if config.use_ascii { "*" } else { "◆" };
    if !config.use_colors {
        return icon.to_string();
    }
    icon.cyan().bold().to_string()
}

/// Marker appended to placeholder nodes.
pub(crate) fn unavailable_marker(node: &IssueNode, config: &OutputConfig) -> String {
    if !node.unavailable {
        return String::new();
    }
    let text = " (unavailable)";
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}
