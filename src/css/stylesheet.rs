use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("COMMENT_RE: hardcoded regex is valid"));

/// Optional tag name followed by one or more classes, nothing else
static CLASS_SELECTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9-]*)?(?:\.[a-zA-Z_-][a-zA-Z0-9_-]*)+$")
        .expect("CLASS_SELECTOR_RE: hardcoded regex is valid")
});

static IMPORTANT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*!\s*important\s*$").expect("IMPORTANT_RE: hardcoded regex is valid")
});

/// A class rule declared in a stylesheet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CssClassRule {
    /// Class name without the leading dot
    pub class_name: String,

    /// Declared properties in declaration order
    pub properties: IndexMap<String, String>,

    /// Media query this rule is scoped to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
}

impl CssClassRule {
    pub fn new(class_name: impl Into<String>, properties: IndexMap<String, String>) -> Self {
        Self {
            class_name: class_name.into(),
            properties,
            media: None,
        }
    }

    /// Builder method: scope the rule to a media query
    pub fn with_media(mut self, media: impl Into<String>) -> Self {
        self.media = Some(media.into());
        self
    }
}

/// Class rules of a page in declaration order, including media-scoped variants
#[derive(Debug, Clone, Default)]
pub struct CssClassDictionary {
    rules: Vec<CssClassRule>,

    /// Lower-cased class name to rule positions, ascending
    by_class: HashMap<String, Vec<usize>>,
}

impl CssClassDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stylesheet into a fresh dictionary
    pub fn parse(css: &str) -> Self {
        let mut dictionary = Self::new();
        dictionary.extend_from_css(css);
        dictionary
    }

    /// Append every class rule declared in `css`
    pub fn extend_from_css(&mut self, css: &str) {
        let stripped = strip_comments(css);
        parse_block(&stripped, None, self);
    }

    /// Append a single rule
    pub fn push(&mut self, rule: CssClassRule) {
        let position = self.rules.len();
        self.by_class
            .entry(rule.class_name.to_ascii_lowercase())
            .or_default()
            .push(position);
        self.rules.push(rule);
    }

    /// Rules for a class name (case-insensitive) in declaration order
    pub fn rules_for<'a>(&'a self, class_name: &str) -> impl Iterator<Item = &'a CssClassRule> + 'a {
        self.by_class
            .get(&class_name.to_ascii_lowercase())
            .into_iter()
            .flatten()
            .map(|&i| &self.rules[i])
    }

    pub fn rules(&self) -> &[CssClassRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Distinct media queries in first-seen order
    pub fn media_queries(&self) -> Vec<String> {
        let mut queries: Vec<String> = Vec::new();
        for media in self.rules.iter().filter_map(|r| r.media.as_ref()) {
            if !queries.contains(media) {
                queries.push(media.clone());
            }
        }
        queries
    }
}

fn parse_block(text: &str, media: Option<&str>, out: &mut CssClassDictionary) {
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        // At-statements like `@import url(x);` end with a semicolon, not a block
        let prelude = rest[..open]
            .rsplit(';')
            .next()
            .unwrap_or_default()
            .trim();

        let close = matching_brace(rest, open).unwrap_or(rest.len());
        let body = &rest[open + 1..close];

        if let Some(at_rule) = prelude.strip_prefix('@') {
            if let Some(query) = at_rule.strip_prefix("media") {
                parse_block(body, Some(query.trim()), out);
            }
        } else {
            let declarations = parse_declarations(body);
            if !declarations.is_empty() {
                for selector in prelude.split(',') {
                    if let Some(class_name) = class_of_selector(selector) {
                        let mut rule = CssClassRule::new(class_name, declarations.clone());
                        if let Some(query) = media {
                            rule = rule.with_media(query);
                        }
                        out.push(rule);
                    }
                }
            }
        }

        if close >= rest.len() {
            break;
        }
        rest = &rest[close + 1..];
    }
}

/// Tracks whether a byte scan is inside a quoted string
#[derive(Default)]
struct StringTracker {
    quote: Option<u8>,
    escaped: bool,
}

impl StringTracker {
    /// Feed the next byte; true when it belongs to a string, quotes included
    fn consume(&mut self, b: u8) -> bool {
        match self.quote {
            Some(_) if self.escaped => self.escaped = false,
            Some(_) if b == b'\\' => self.escaped = true,
            Some(q) if b == q => self.quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => self.quote = Some(b),
            None => return false,
        }
        true
    }
}

fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut strings = StringTracker::default();
    for (i, b) in text.bytes().enumerate().skip(open) {
        if strings.consume(b) {
            continue;
        }
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Last class of a plain `tag.class.class` compound, `None` for anything else
fn class_of_selector(selector: &str) -> Option<&str> {
    let selector = selector.trim();
    if !CLASS_SELECTOR_RE.is_match(selector) {
        return None;
    }
    selector.rsplit('.').next().filter(|c| !c.is_empty())
}

/// Byte offsets of `delimiter` outside quotes and parentheses
fn top_level_positions(text: &str, delimiter: u8) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut depth = 0usize;
    let mut strings = StringTracker::default();
    for (i, b) in text.bytes().enumerate() {
        if strings.consume(b) {
            continue;
        }
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            _ if b == delimiter && depth == 0 => positions.push(i),
            _ => {}
        }
    }
    positions
}

/// Declarations of a block, split on semicolons that are not inside a
/// string or a function such as `url(data:...;base64,...)`
pub fn split_declarations(block: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for end in top_level_positions(block, b';') {
        parts.push(&block[start..end]);
        start = end + 1;
    }
    parts.push(&block[start..]);
    parts
}

/// Innermost `{ ... }` bodies of a stylesheet; text without braces, such as
/// an inline `style` attribute, is a single body
pub fn declaration_blocks(css: &str) -> Vec<&str> {
    let css = css.trim();
    if !css.contains('{') {
        return vec![css];
    }
    let mut blocks = Vec::new();
    let mut open: Option<usize> = None;
    let mut strings = StringTracker::default();
    for (i, b) in css.bytes().enumerate() {
        if strings.consume(b) {
            continue;
        }
        match b {
            b'{' => open = Some(i + 1),
            b'}' => {
                if let Some(start) = open.take() {
                    blocks.push(&css[start..i]);
                }
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        blocks.push(&css[start..]);
    }
    blocks
}

/// Remove `/* ... */` comments
pub fn strip_comments(css: &str) -> std::borrow::Cow<'_, str> {
    COMMENT_RE.replace_all(css, "")
}

/// Split a declaration block into lower-cased properties and trimmed values.
/// Declarations missing a property or value are skipped.
pub fn parse_declarations(block: &str) -> IndexMap<String, String> {
    let mut properties = IndexMap::new();
    for declaration in split_declarations(block) {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = IMPORTANT_RE.replace(value.trim(), "").trim().to_string();
        if property.is_empty() || value.is_empty() || property.contains(char::is_whitespace) {
            continue;
        }
        properties.insert(property, value);
    }
    properties
}
