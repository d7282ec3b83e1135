use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::dom::{for_each_node_mut, DomNode, PreOrder};

/// Leading character of every dictionary reference
pub const REFERENCE_PREFIX: char = '$';

/// Property family a dictionary entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueCategory {
    Color,
    Display,
    Position,
    Spacing,
    Other,
}

impl ValueCategory {
    pub fn of(property: &str) -> Self {
        match property {
            "color" | "background" | "fill" | "stroke" => ValueCategory::Color,
            p if p.ends_with("-color") => ValueCategory::Color,
            "display" => ValueCategory::Display,
            "position" | "top" | "right" | "bottom" | "left" | "inset" | "z-index" | "float" => {
                ValueCategory::Position
            }
            "gap" | "row-gap" | "column-gap" => ValueCategory::Spacing,
            p if p.starts_with("padding") || p.starts_with("margin") => ValueCategory::Spacing,
            _ => ValueCategory::Other,
        }
    }

    pub fn prefix(&self) -> char {
        match self {
            ValueCategory::Color => 'c',
            ValueCategory::Display => 'd',
            ValueCategory::Position => 'p',
            ValueCategory::Spacing => 's',
            ValueCategory::Other => 'o',
        }
    }
}

/// Short IDs standing in for repeated (property, value) pairs
///
/// Serializes as a flat `{ "$c1": "red", ... }` map in ID order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CssValueDictionary {
    /// ID to literal value
    entries: IndexMap<String, String>,

    #[serde(skip)]
    ids: HashMap<(String, String), String>,
}

impl CssValueDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the pairs of a forest occurring at least `min_occurrences`
    /// times. IDs go to the most frequent pairs first; equal counts keep
    /// first pre-order occurrence.
    pub fn build(roots: &[DomNode], min_occurrences: u32) -> Self {
        let mut counts: IndexMap<(&str, &str), usize> = IndexMap::new();
        for node in PreOrder::over(roots) {
            for (property, value) in &node.resolved_css {
                *counts.entry((property.as_str(), value.as_str())).or_insert(0) += 1;
            }
        }

        let threshold = min_occurrences.max(1) as usize;
        let mut frequent: Vec<((&str, &str), usize)> =
            counts.into_iter().filter(|(_, count)| *count >= threshold).collect();
        frequent.sort_by(|a, b| b.1.cmp(&a.1));

        let mut dictionary = Self::new();
        let mut counters: HashMap<ValueCategory, usize> = HashMap::new();
        for ((property, value), _) in frequent {
            let category = ValueCategory::of(property);
            let counter = counters.entry(category).or_insert(0);
            *counter += 1;
            let id = format!("{}{}{}", REFERENCE_PREFIX, category.prefix(), counter);
            dictionary.register(id, property, value);
        }
        dictionary
    }

    fn register(&mut self, id: String, property: &str, value: &str) {
        self.ids.insert((property.to_string(), value.to_string()), id.clone());
        self.entries.insert(id, value.to_string());
    }

    /// ID for a pair, if it made it into the dictionary
    pub fn id_for(&self, property: &str, value: &str) -> Option<&str> {
        self.ids
            .get(&(property.to_string(), value.to_string()))
            .map(String::as_str)
    }

    /// Literal value behind an ID
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(id, value)| (id.as_str(), value.as_str()))
    }

    /// Replace literal values with their IDs across a forest
    pub fn compress(&self, roots: &mut [DomNode]) {
        if self.is_empty() {
            return;
        }
        for_each_node_mut(roots, |node| {
            for (property, value) in node.resolved_css.iter_mut() {
                if let Some(id) = self.id_for(property, value) {
                    *value = id.to_string();
                }
            }
        });
    }

    /// Replace IDs with their literal values across a forest
    pub fn expand(&self, roots: &mut [DomNode]) {
        for_each_node_mut(roots, |node| {
            for value in node.resolved_css.values_mut() {
                if value.starts_with(REFERENCE_PREFIX) {
                    if let Some(literal) = self.entries.get(value.as_str()) {
                        *value = literal.clone();
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_flex(order: u32) -> DomNode {
        DomNode::new("div")
            .at(order, 0)
            .with_css("color", "red")
            .with_css("display", "flex")
    }

    #[test]
    fn test_repeated_pair_gets_one_entry() {
        let mut roots = vec![red_flex(0), red_flex(1), red_flex(2)];
        let dictionary = CssValueDictionary::build(&roots, 2);

        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary.id_for("color", "red"), Some("$c1"));
        assert_eq!(dictionary.id_for("display", "flex"), Some("$d1"));

        dictionary.compress(&mut roots);
        for node in &roots {
            assert_eq!(node.css("color"), Some("$c1"));
            assert_eq!(dictionary.get(node.css("color").unwrap()), Some("red"));
            assert_eq!(dictionary.get(node.css("display").unwrap()), Some("flex"));
        }
    }

    #[test]
    fn test_ids_follow_frequency_then_first_occurrence() {
        let roots = vec![
            DomNode::new("div").with_css("color", "blue").with_css("margin", "0"),
            DomNode::new("div").with_css("color", "red").with_css("margin", "0"),
            DomNode::new("div").with_css("color", "red").with_css("margin", "0"),
            DomNode::new("div").with_css("color", "blue").with_css("padding", "4px"),
            DomNode::new("div").with_css("color", "green").with_css("padding", "4px"),
        ];
        let dictionary = CssValueDictionary::build(&roots, 2);

        // margin:0 x3, blue x2, red x2, padding x2; green stays literal
        assert_eq!(dictionary.id_for("margin", "0"), Some("$s1"));
        assert_eq!(dictionary.id_for("color", "blue"), Some("$c1"));
        assert_eq!(dictionary.id_for("color", "red"), Some("$c2"));
        assert_eq!(dictionary.id_for("padding", "4px"), Some("$s2"));
        assert_eq!(dictionary.id_for("color", "green"), None);

        let ids: Vec<&str> = dictionary.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["$s1", "$c1", "$c2", "$s2"]);
    }

    #[test]
    fn test_same_value_different_property() {
        let roots = vec![
            DomNode::new("div").with_css("color", "red").with_css("border-color", "red"),
            DomNode::new("div").with_css("color", "red").with_css("border-color", "red"),
        ];
        let dictionary = CssValueDictionary::build(&roots, 2);
        assert_eq!(dictionary.id_for("color", "red"), Some("$c1"));
        assert_eq!(dictionary.id_for("border-color", "red"), Some("$c2"));
    }

    #[test]
    fn test_expand_restores_literals() {
        let original = vec![red_flex(0), red_flex(1)];
        let mut roots = original.clone();
        let dictionary = CssValueDictionary::build(&roots, 2);
        dictionary.compress(&mut roots);
        assert_ne!(roots, original);
        dictionary.expand(&mut roots);
        assert_eq!(roots, original);
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let dictionary = CssValueDictionary::build(&[red_flex(0), red_flex(1)], 2);
        let json = serde_json::to_value(&dictionary).unwrap();
        assert_eq!(json, serde_json::json!({ "$c1": "red", "$d1": "flex" }));
    }

    #[test]
    fn test_category_of_property() {
        assert_eq!(ValueCategory::of("background-color"), ValueCategory::Color);
        assert_eq!(ValueCategory::of("z-index"), ValueCategory::Position);
        assert_eq!(ValueCategory::of("margin-top"), ValueCategory::Spacing);
        assert_eq!(ValueCategory::of("font-size"), ValueCategory::Other);
    }
}
