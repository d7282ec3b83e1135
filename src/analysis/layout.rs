use serde::{Deserialize, Serialize};

use crate::dom::{DomNode, DomTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutType {
    SingleColumn,
    TwoColumn,
    Grid,
    Mixed,
}

impl LayoutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutType::SingleColumn => "single-column",
            LayoutType::TwoColumn => "two-column",
            LayoutType::Grid => "grid",
            LayoutType::Mixed => "mixed",
        }
    }
}

/// Container counts behind a layout classification
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutSignals {
    pub containers: usize,
    pub grid: usize,
    pub flex: usize,
    pub two_child_flex: bool,
}

impl LayoutSignals {
    pub fn grid_ratio(&self) -> f64 {
        ratio(self.grid, self.containers)
    }

    pub fn flex_ratio(&self) -> f64 {
        ratio(self.flex, self.containers)
    }
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { count as f64 / total as f64 }
}

fn display_of(node: &DomNode) -> String {
    node.css("display").unwrap_or_default().trim().to_ascii_lowercase()
}

/// Resolved `display: grid`, or a class hinting at a grid system
pub fn is_grid_container(node: &DomNode) -> bool {
    display_of(node).contains("grid")
        || node.classes().any(|c| {
            let c = c.to_ascii_lowercase();
            c.contains("grid") || c.contains("cols-")
        })
}

pub fn is_flex_container(node: &DomNode) -> bool {
    display_of(node).contains("flex")
}

pub fn layout_signals(tree: &DomTree) -> LayoutSignals {
    let mut signals = LayoutSignals::default();
    for node in tree.iter().filter(|n| n.is_container) {
        signals.containers += 1;
        if is_grid_container(node) {
            signals.grid += 1;
        } else if is_flex_container(node) {
            signals.flex += 1;
            if node.children.len() == 2 {
                signals.two_child_flex = true;
            }
        }
    }
    signals
}

/// Classify in fixed priority order: grid, two-column, mixed, single-column.
/// Ratios use strict `>` so a ratio sitting on a threshold falls through.
pub fn classify_layout(signals: &LayoutSignals) -> LayoutType {
    let grid = signals.grid_ratio();
    let flex = signals.flex_ratio();

    if grid > 0.2 {
        LayoutType::Grid
    } else if flex > 0.3 && grid < 0.1 && signals.two_child_flex {
        LayoutType::TwoColumn
    } else if grid > 0.1 || flex > 0.2 {
        LayoutType::Mixed
    } else {
        LayoutType::SingleColumn
    }
}

pub fn detect_layout(tree: &DomTree) -> LayoutType {
    classify_layout(&layout_signals(tree))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(display: Option<&str>, children: usize) -> DomNode {
        let mut node = DomNode::new("div");
        if let Some(display) = display {
            node = node.with_css("display", display);
        }
        node.with_children((0..children).map(|_| DomNode::new("p")).collect())
    }

    #[test]
    fn test_grid_ratio_above_threshold() {
        let tree = DomTree::new(vec![
            container(Some("grid"), 3),
            container(Some("grid"), 3),
            container(None, 1),
            container(None, 1),
            container(None, 1),
        ]);
        let signals = layout_signals(&tree);
        assert_eq!(signals.containers, 5);
        assert_eq!(signals.grid, 2);
        assert_eq!(classify_layout(&signals), LayoutType::Grid);
    }

    #[test]
    fn test_no_grid_no_flex_is_single_column() {
        let tree = DomTree::new(vec![container(None, 2), container(None, 1)]);
        assert_eq!(detect_layout(&tree), LayoutType::SingleColumn);
    }

    #[test]
    fn test_empty_tree_is_single_column() {
        assert_eq!(detect_layout(&DomTree::default()), LayoutType::SingleColumn);
    }

    #[test]
    fn test_two_column() {
        let tree = DomTree::new(vec![container(Some("flex"), 2), container(None, 1)]);
        assert_eq!(detect_layout(&tree), LayoutType::TwoColumn);
    }

    #[test]
    fn test_flex_without_two_children_is_mixed() {
        let tree = DomTree::new(vec![container(Some("flex"), 3), container(None, 1)]);
        assert_eq!(detect_layout(&tree), LayoutType::Mixed);
    }

    #[test]
    fn test_thresholds_are_strict() {
        // grid exactly 0.2 is not grid; 0.2 > 0.1 makes it mixed
        let signals = LayoutSignals { containers: 10, grid: 2, flex: 0, two_child_flex: false };
        assert_eq!(classify_layout(&signals), LayoutType::Mixed);

        // grid exactly 0.1 and flex exactly 0.2 fall through to single-column
        let signals = LayoutSignals { containers: 10, grid: 1, flex: 2, two_child_flex: true };
        assert_eq!(classify_layout(&signals), LayoutType::SingleColumn);
    }

    #[test]
    fn test_class_hint_counts_as_grid() {
        let node = DomNode::new("div").with_class("md:grid-cols-3 gap-4");
        assert!(is_grid_container(&node));
        assert!(is_grid_container(&DomNode::new("div").with_class("cols-2")));
        assert!(!is_grid_container(&DomNode::new("div").with_class("row")));
    }

    #[test]
    fn test_layout_type_serializes_kebab_case() {
        assert_eq!(serde_json::to_value(LayoutType::TwoColumn).unwrap(), "two-column");
        assert_eq!(LayoutType::SingleColumn.as_str(), "single-column");
    }
}
