use crate::css::stylesheet::{parse_declarations, CssClassDictionary};
use indexmap::IndexMap;

/// Effective property map of one element
pub type ResolvedCss = IndexMap<String, String>;

/// Parse an inline `style` attribute into a property map
pub fn parse_inline_style(style: &str) -> ResolvedCss {
    parse_declarations(style)
}

/// Merge class rules and the inline style of one element.
///
/// Classes are visited in attribute order and every matching dictionary rule
/// (case-insensitive) is copied in declaration order, so later matches win on
/// collisions. The inline style is applied last and always wins.
pub fn resolve_css<'a, I>(
    classes: I,
    dictionary: &CssClassDictionary,
    inline_style: Option<&str>,
) -> ResolvedCss
where
    I: IntoIterator<Item = &'a str>,
{
    let mut resolved = ResolvedCss::new();

    for class_name in classes {
        for rule in dictionary.rules_for(class_name) {
            for (property, value) in &rule.properties {
                resolved.insert(property.clone(), value.clone());
            }
        }
    }

    if let Some(style) = inline_style {
        for (property, value) in parse_inline_style(style) {
            resolved.insert(property, value);
        }
    }

    resolved
}
