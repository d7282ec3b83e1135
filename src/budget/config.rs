use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LensError;

/// Limit value meaning "no limit"
pub const UNLIMITED: i64 = -1;

/// Named budget presets, smallest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TierName {
    Free,
    Basic,
    Pro,
    Enterprise,
}

impl TierName {
    pub const ALL: [TierName; 4] = [TierName::Free, TierName::Basic, TierName::Pro, TierName::Enterprise];

    pub fn as_str(&self) -> &'static str {
        match self {
            TierName::Free => "free",
            TierName::Basic => "basic",
            TierName::Pro => "pro",
            TierName::Enterprise => "enterprise",
        }
    }

    /// The preset limits of this tier
    pub fn config(&self) -> TokenBudgetConfig {
        match self {
            TierName::Free => TokenBudgetConfig {
                max_tokens: 8_000,
                max_nodes: 30,
                max_css_classes: 40,
                max_colors: 10,
                max_images: 10,
                max_nav_items: 10,
                max_text_length: 120,
                compress_css_values: true,
                min_occurrences: 2,
            },
            TierName::Basic => TokenBudgetConfig {
                max_tokens: 16_000,
                max_nodes: 60,
                max_css_classes: 80,
                max_colors: 20,
                max_images: 25,
                max_nav_items: 20,
                max_text_length: 250,
                compress_css_values: true,
                min_occurrences: 2,
            },
            TierName::Pro => TokenBudgetConfig {
                max_tokens: 48_000,
                max_nodes: 150,
                max_css_classes: 200,
                max_colors: 40,
                max_images: 60,
                max_nav_items: 40,
                max_text_length: 600,
                compress_css_values: true,
                min_occurrences: 2,
            },
            TierName::Enterprise => TokenBudgetConfig {
                max_tokens: 200_000,
                max_nodes: UNLIMITED,
                max_css_classes: UNLIMITED,
                max_colors: UNLIMITED,
                max_images: UNLIMITED,
                max_nav_items: UNLIMITED,
                max_text_length: UNLIMITED,
                compress_css_values: false,
                min_occurrences: 2,
            },
        }
    }
}

impl fmt::Display for TierName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierName {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(TierName::Free),
            "basic" => Ok(TierName::Basic),
            "pro" => Ok(TierName::Pro),
            "enterprise" => Ok(TierName::Enterprise),
            other => Err(LensError::InvalidInput(format!(
                "Unknown tier '{}', expected free, basic, pro or enterprise",
                other
            ))),
        }
    }
}

/// Limits applied by the reducer. Any negative limit is unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenBudgetConfig {
    pub max_tokens: i64,

    /// Maximum number of root nodes kept
    pub max_nodes: i64,

    pub max_css_classes: i64,

    pub max_colors: i64,

    pub max_images: i64,

    pub max_nav_items: i64,

    /// Maximum characters of direct text per node
    pub max_text_length: i64,

    pub compress_css_values: bool,

    /// Occurrences a (property, value) pair needs to enter the value dictionary
    pub min_occurrences: u32,
}

impl Default for TokenBudgetConfig {
    fn default() -> Self {
        TierName::Free.config()
    }
}

impl TokenBudgetConfig {
    /// Layer overrides over this config
    pub fn with_overrides(mut self, overrides: &TokenBudgetOverrides) -> Self {
        let TokenBudgetOverrides {
            max_tokens,
            max_nodes,
            max_css_classes,
            max_colors,
            max_images,
            max_nav_items,
            max_text_length,
            compress_css_values,
            min_occurrences,
        } = *overrides;

        self.max_tokens = max_tokens.unwrap_or(self.max_tokens);
        self.max_nodes = max_nodes.unwrap_or(self.max_nodes);
        self.max_css_classes = max_css_classes.unwrap_or(self.max_css_classes);
        self.max_colors = max_colors.unwrap_or(self.max_colors);
        self.max_images = max_images.unwrap_or(self.max_images);
        self.max_nav_items = max_nav_items.unwrap_or(self.max_nav_items);
        self.max_text_length = max_text_length.unwrap_or(self.max_text_length);
        self.compress_css_values = compress_css_values.unwrap_or(self.compress_css_values);
        self.min_occurrences = min_occurrences.unwrap_or(self.min_occurrences);
        self
    }

    pub fn token_limit(&self) -> Option<usize> {
        limit(self.max_tokens)
    }

    pub fn node_limit(&self) -> Option<usize> {
        limit(self.max_nodes)
    }

    pub fn css_class_limit(&self) -> Option<usize> {
        limit(self.max_css_classes)
    }

    pub fn color_limit(&self) -> Option<usize> {
        limit(self.max_colors)
    }

    pub fn image_limit(&self) -> Option<usize> {
        limit(self.max_images)
    }

    pub fn nav_item_limit(&self) -> Option<usize> {
        limit(self.max_nav_items)
    }

    pub fn text_limit(&self) -> Option<usize> {
        limit(self.max_text_length)
    }
}

fn limit(value: i64) -> Option<usize> {
    usize::try_from(value).ok()
}

/// Partial budget; unset fields fall back to the `free` tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenBudgetOverrides {
    #[serde(alias = "max_tokens")]
    pub max_tokens: Option<i64>,

    #[serde(alias = "max_nodes")]
    pub max_nodes: Option<i64>,

    #[serde(alias = "max_css_classes")]
    pub max_css_classes: Option<i64>,

    #[serde(alias = "max_colors")]
    pub max_colors: Option<i64>,

    #[serde(alias = "max_images")]
    pub max_images: Option<i64>,

    #[serde(alias = "max_nav_items")]
    pub max_nav_items: Option<i64>,

    #[serde(alias = "max_text_length")]
    pub max_text_length: Option<i64>,

    #[serde(alias = "compress_css_values")]
    pub compress_css_values: Option<bool>,

    #[serde(alias = "min_occurrences")]
    pub min_occurrences: Option<u32>,
}

/// Pick the budget for a request: overrides are layered over `free` and take
/// precedence over a named tier; neither means no reduction.
pub fn resolve_budget(tier: Option<TierName>, overrides: Option<&TokenBudgetOverrides>) -> Option<TokenBudgetConfig> {
    match (tier, overrides) {
        (_, Some(overrides)) => {
            if let Some(tier) = tier {
                log::debug!("Custom budget supersedes tier '{}'", tier);
            }
            Some(TierName::Free.config().with_overrides(overrides))
        }
        (Some(tier), None) => Some(tier.config()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_least(a: i64, b: i64) -> bool {
        b < 0 || (a >= 0 && a <= b)
    }

    #[test]
    fn test_tiers_are_monotonic() {
        for pair in TierName::ALL.windows(2) {
            let (lower, upper) = (pair[0].config(), pair[1].config());
            assert!(at_least(lower.max_tokens, upper.max_tokens));
            assert!(at_least(lower.max_nodes, upper.max_nodes));
            assert!(at_least(lower.max_css_classes, upper.max_css_classes));
            assert!(at_least(lower.max_colors, upper.max_colors));
            assert!(at_least(lower.max_images, upper.max_images));
            assert!(at_least(lower.max_nav_items, upper.max_nav_items));
            assert!(at_least(lower.max_text_length, upper.max_text_length));
        }
    }

    #[test]
    fn test_enterprise_is_uncompressed_and_unlimited() {
        let config = TierName::Enterprise.config();
        assert!(!config.compress_css_values);
        assert_eq!(config.node_limit(), None);
        assert_eq!(config.token_limit(), Some(200_000));
    }

    #[test]
    fn test_tier_from_str() {
        assert_eq!("Pro".parse::<TierName>().unwrap(), TierName::Pro);
        assert_eq!(" free ".parse::<TierName>().unwrap(), TierName::Free);
        assert!("platinum".parse::<TierName>().is_err());
        assert_eq!(TierName::Basic.to_string(), "basic");
    }

    #[test]
    fn test_overrides_layer_over_free() {
        let overrides: TokenBudgetOverrides =
            serde_json::from_value(serde_json::json!({ "maxNodes": 5, "max_text_length": -1 })).unwrap();

        let config = resolve_budget(Some(TierName::Pro), Some(&overrides)).unwrap();
        assert_eq!(config.max_nodes, 5);
        assert_eq!(config.text_limit(), None);
        assert_eq!(config.max_tokens, 8_000);
        assert_eq!(config.max_colors, 10);
    }

    #[test]
    fn test_resolve_budget() {
        assert_eq!(resolve_budget(None, None), None);
        assert_eq!(resolve_budget(Some(TierName::Basic), None), Some(TierName::Basic.config()));
        assert_eq!(
            resolve_budget(None, Some(&TokenBudgetOverrides::default())),
            Some(TierName::Free.config())
        );
    }

    #[test]
    fn test_config_serializes_camel_case() {
        let json = serde_json::to_value(TierName::Free.config()).unwrap();
        assert_eq!(json["maxTokens"], 8000);
        assert_eq!(json["compressCssValues"], true);
    }
}
