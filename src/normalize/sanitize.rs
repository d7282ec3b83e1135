//! String-level cleaning of page markup.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::utils::collapse_whitespace;

/// Elements dropped together with their content
pub const STRIPPED_TAGS: &[&str] = &["script", "style", "noscript", "svg", "iframe", "template"];

static STRIPPED_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    STRIPPED_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{0}\b[^>]*?/>|<{0}\b[^>]*>.*?</{0}\s*>", tag))
                .expect("STRIPPED_RES: hardcoded regex is valid")
        })
        .collect()
});

/// Unterminated `<script>` etc. running to end of input
static UNTERMINATED_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    STRIPPED_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{0}\b[^>]*>.*$", tag))
                .expect("UNTERMINATED_RES: hardcoded regex is valid")
        })
        .collect()
});

/// Opening tag; quoted attribute values may contain `>`
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<[a-zA-Z](?:"[^"]*"|'[^']*'|[^"'>])*>"#).expect("TAG_RE: hardcoded regex is valid")
});

/// One attribute with its leading whitespace; quoted values are consumed whole
/// so text inside them is never read as another attribute
static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s+([^\s"'>/=]+)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s"'>]+))?"#)
        .expect("ATTRIBUTE_RE: hardcoded regex is valid")
});

fn is_event_handler(name: &str) -> bool {
    name.len() > 2 && name[..2].eq_ignore_ascii_case("on") && name[2..].bytes().all(|b| b.is_ascii_alphabetic())
}

fn is_javascript_url(value: &str) -> bool {
    let unquoted = value.trim_matches(|c| c == '"' || c == '\'');
    unquoted
        .trim_start()
        .get(..11)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
}

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("COMMENT_RE: hardcoded regex is valid"));

static HORIZONTAL_WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\x0C\r]+").expect("HORIZONTAL_WS_RE: hardcoded regex is valid"));

static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?: ?\n)+").expect("BLANK_LINES_RE: hardcoded regex is valid"));

static BODY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<body\b[^>]*>(.*?)(?:</body\s*>|$)").expect("BODY_RE: hardcoded regex is valid")
});

static ANY_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("ANY_TAG_RE: hardcoded regex is valid"));

static STRUCTURAL_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:main|article|section|header|footer|nav|h[1-3]|p|img|form|table|ul)[\s>/]")
        .expect("STRUCTURAL_TAG_RE: hardcoded regex is valid")
});

/// Remove script-like and embedded-document elements with their content
pub fn remove_stripped_tags(html: &str) -> String {
    let mut result = html.to_string();
    for re in STRIPPED_RES.iter().chain(UNTERMINATED_RES.iter()) {
        result = re.replace_all(&result, "").into_owned();
    }
    result
}

/// Drop `on*` event handler attributes and neutralize `javascript:` links
pub fn strip_event_handlers(html: &str) -> String {
    TAG_RE
        .replace_all(html, |tag: &Captures| {
            ATTRIBUTE_RE
                .replace_all(&tag[0], |attribute: &Captures| {
                    let name = &attribute[1];
                    let value = attribute.get(2).map_or("", |v| v.as_str());
                    if is_event_handler(name) {
                        String::new()
                    } else if name.eq_ignore_ascii_case("href") && is_javascript_url(value) {
                        " href=\"#\"".to_string()
                    } else {
                        attribute[0].to_string()
                    }
                })
                .into_owned()
        })
        .into_owned()
}

pub fn strip_comments(html: &str) -> String {
    COMMENT_RE.replace_all(html, "").into_owned()
}

/// Collapse horizontal whitespace runs; line breaks survive, blank lines fold into one
pub fn collapse_horizontal_whitespace(html: &str) -> String {
    let collapsed = HORIZONTAL_WS_RE.replace_all(html, " ");
    BLANK_LINES_RE.replace_all(&collapsed, "\n").into_owned()
}

/// Markup between `<body>` and `</body>`, or the whole input when there is no body tag
pub fn body_markup(html: &str) -> &str {
    BODY_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(html)
}

/// Visible text length of cleaned body markup
pub fn body_text_len(body: &str) -> usize {
    collapse_whitespace(&ANY_TAG_RE.replace_all(body, " ")).chars().count()
}

pub fn has_structural_tags(body: &str) -> bool {
    STRUCTURAL_TAG_RE.is_match(body)
}
