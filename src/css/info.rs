use serde::{Deserialize, Serialize};

use crate::css::CssClassDictionary;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CssClassSummary {
    pub name: String,

    pub property_count: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
}

/// Stylesheet overview carried in the IR
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CssInfo {
    pub total_rules: usize,

    /// Distinct class names with at least one rule
    pub class_count: usize,

    pub media_queries: Vec<String>,

    /// One entry per class rule in declaration order
    pub classes: Vec<CssClassSummary>,

    pub uses_grid: bool,

    pub uses_flex: bool,
}

impl CssInfo {
    pub fn from_dictionary(css: &CssClassDictionary) -> Self {
        let mut names: Vec<String> = Vec::new();
        let mut info = Self {
            total_rules: css.len(),
            media_queries: css.media_queries(),
            ..Default::default()
        };

        for rule in css.rules() {
            let lower = rule.class_name.to_ascii_lowercase();
            if !names.contains(&lower) {
                names.push(lower);
            }
            if let Some(display) = rule.properties.get("display") {
                let display = display.to_ascii_lowercase();
                info.uses_grid |= display.contains("grid");
                info.uses_flex |= display.contains("flex");
            }
            info.classes.push(CssClassSummary {
                name: rule.class_name.clone(),
                property_count: rule.properties.len(),
                media: rule.media.clone(),
            });
        }

        info.class_count = names.len();
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_info_from_dictionary() {
        let css = CssClassDictionary::parse(
            ".grid { display: grid; gap: 1rem } .card { padding: 8px } @media (max-width: 600px) { .grid { display: block } }",
        );
        let info = CssInfo::from_dictionary(&css);

        assert_eq!(info.total_rules, 3);
        assert_eq!(info.class_count, 2);
        assert_eq!(info.media_queries, vec!["(max-width: 600px)".to_string()]);
        assert!(info.uses_grid);
        assert!(!info.uses_flex);
        assert_eq!(info.classes[0].property_count, 2);
        assert_eq!(info.classes[2].media.as_deref(), Some("(max-width: 600px)"));

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["totalRules"], 3);
        assert_eq!(json["classes"][0]["propertyCount"], 2);
    }
}
