use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::css::stylesheet::{declaration_blocks, parse_declarations, strip_comments};

static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)#[0-9a-f]{3,8}\b|rgba?\([^)]*\)|hsla?\([^)]*\)").expect("COLOR_RE: hardcoded regex is valid")
});

/// `url(...)` with a quoted or bare argument
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"[^"]*"|'[^']*'|[^)]*)\s*\)"#).expect("URL_RE: hardcoded regex is valid")
});

/// A color literal and how often it occurs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColorUsage {
    pub value: String,
    pub count: usize,
}

/// Lower-cased color literal with whitespace around separators removed; `None`
/// for anything that does not parse as a color
pub fn normalize_color(literal: &str) -> Option<String> {
    let lower = literal.trim().to_ascii_lowercase();
    csscolorparser::parse(&lower).ok()?;
    if lower.starts_with('#') {
        return Some(lower);
    }
    let spaced = lower.split_whitespace().collect::<Vec<_>>().join(" ");
    Some(
        spaced
            .replace(", ", ",")
            .replace(" ,", ",")
            .replace("( ", "(")
            .replace(" )", ")")
            .replace(" / ", "/"),
    )
}

/// Alpha channel of a color value, keywords like `transparent` included
pub fn color_alpha(value: &str) -> Option<f64> {
    csscolorparser::parse(value.trim()).ok().map(|color| color.a)
}

/// A declaration value with every `url(...)` blanked out
pub fn strip_urls(value: &str) -> Cow<'_, str> {
    URL_RE.replace_all(value, " ")
}

/// First color literal in a declaration value, ignoring `url(...)` contents
pub fn first_color(value: &str) -> Option<String> {
    COLOR_RE
        .find_iter(&strip_urls(value))
        .find_map(|m| normalize_color(m.as_str()))
}

/// Counts color literals across CSS sources and inline `style` attributes
#[derive(Debug, Default)]
pub struct ColorCounter {
    counts: IndexMap<String, usize>,
}

impl ColorCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count colors in a stylesheet or inline declaration list. Only
    /// declaration values are scanned so `#id` selectors never count.
    pub fn scan(&mut self, css: &str) {
        let css = strip_comments(css);
        for block in declaration_blocks(&css) {
            for value in parse_declarations(block).values() {
                for found in COLOR_RE.find_iter(&strip_urls(value)) {
                    if let Some(color) = normalize_color(found.as_str()) {
                        *self.counts.entry(color).or_insert(0) += 1;
                    }
                }
            }
        }
    }

    /// Colors by count descending, first appearance breaking ties
    pub fn finish(self) -> Vec<ColorUsage> {
        let mut colors: Vec<ColorUsage> = self
            .counts
            .into_iter()
            .map(|(value, count)| ColorUsage { value, count })
            .collect();
        colors.sort_by(|a, b| b.count.cmp(&a.count));
        colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_counted_and_sorted() {
        let mut counter = ColorCounter::new();
        counter.scan("#header { color: #FFF } .a { background: rgb(0, 0, 0); border-color: #fff } .b { color: hsl(10 50% 50%) }");
        counter.scan("color: RGB(0,0,0); background-color: #123456");
        let colors = counter.finish();

        let values: Vec<&str> = colors.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["#fff", "rgb(0,0,0)", "hsl(10 50% 50%)", "#123456"]);
        assert_eq!(colors[0].count, 2);
        assert_eq!(colors[1].count, 2);
    }

    #[test]
    fn test_id_selectors_are_not_colors() {
        let mut counter = ColorCounter::new();
        counter.scan("#fade { opacity: 1 } #abc:hover { margin: 0 }");
        assert!(counter.finish().is_empty());
    }

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("#ABCDEF").as_deref(), Some("#abcdef"));
        assert_eq!(normalize_color("#12345"), None);
        assert_eq!(normalize_color("rgba(0, 0, 0, .5)").as_deref(), Some("rgba(0,0,0,.5)"));
        assert_eq!(normalize_color("rgb( 0 0 0 / 50% )").as_deref(), Some("rgb(0 0 0/50%)"));
    }

    #[test]
    fn test_data_uri_backgrounds_keep_their_color() {
        let mut counter = ColorCounter::new();
        counter.scan(".hero { background: url(data:image/svg+xml;base64,PHN2Zz4=) #102030; padding: 40px }");
        counter.scan("background-image: url('data:image/svg+xml;utf8,<svg fill=\"#abcdef\"/>'); color: #102030");
        let colors = counter.finish();

        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].value, "#102030");
        assert_eq!(colors[0].count, 2);
    }

    #[test]
    fn test_unparseable_functions_are_skipped() {
        assert_eq!(normalize_color("rgb(banana)"), None);
        assert_eq!(first_color("url(#grad) rgb(1, 2, 3)").as_deref(), Some("rgb(1,2,3)"));
    }

    #[test]
    fn test_color_alpha() {
        assert_eq!(color_alpha("transparent"), Some(0.0));
        assert_eq!(color_alpha("rgba(0, 0, 0, 0)"), Some(0.0));
        assert_eq!(color_alpha("hsl(10 50% 50% / 0)"), Some(0.0));
        assert_eq!(color_alpha("#102030"), Some(1.0));
        assert_eq!(color_alpha("no-repeat"), None);
    }
}
