use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

use crate::utils::resolve_url;

static IFRAME_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("iframe").expect("IFRAME_SELECTOR: hardcoded selector is valid"));

const VIDEO_PATTERNS: &[&str] = &[
    "youtube.com",
    "youtube-nocookie.com",
    "youtu.be",
    "vimeo.com",
    "wistia",
    "loom.com",
    "dailymotion",
];

const MAP_PATTERNS: &[&str] = &["google.com/maps", "maps.google", "openstreetmap", "mapbox"];

const WIDGET_PATTERNS: &[&str] = &[
    "calendly",
    "typeform",
    "hubspot",
    "twitter.com",
    "x.com",
    "instagram",
    "facebook.com",
    "spotify",
    "soundcloud",
    "codepen",
];

/// What an embedded frame most likely shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedKind {
    Video,
    Map,
    Widget,
    Unknown,
}

/// An `<iframe>` found before frames are stripped
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Embed {
    pub src: String,
    pub kind: EmbedKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

/// Classify an embed URL; video patterns are checked first, then maps, then widgets
pub fn classify_embed(src: &str) -> EmbedKind {
    let lower = src.to_ascii_lowercase();
    let host_and_path = lower
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(&lower);

    if VIDEO_PATTERNS.iter().any(|p| host_and_path.contains(p)) {
        EmbedKind::Video
    } else if MAP_PATTERNS.iter().any(|p| host_and_path.contains(p)) {
        EmbedKind::Map
    } else if WIDGET_PATTERNS.iter().any(|p| matches_host(host_and_path, p)) {
        EmbedKind::Widget
    } else {
        EmbedKind::Unknown
    }
}

/// `x.com` must not match `box.com`, so dotted patterns are checked against host labels
fn matches_host(host_and_path: &str, pattern: &str) -> bool {
    if !pattern.contains('.') {
        return host_and_path.contains(pattern);
    }
    let host = host_and_path.split(['/', '?', '#']).next().unwrap_or_default();
    host == pattern || host.ends_with(&format!(".{}", pattern))
}

/// Every iframe with a resolvable `src`, classified
pub fn extract_embeds(document: &Html, base: &Url) -> Vec<Embed> {
    document
        .select(&IFRAME_SELECTOR)
        .filter_map(|frame| {
            let el = frame.value();
            let src = el
                .attr("src")
                .or_else(|| el.attr("data-src"))
                .and_then(|s| resolve_url(base, s))?;
            Some(Embed {
                kind: classify_embed(&src),
                title: el.attr("title").map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
                width: el.attr("width").map(str::to_string),
                height: el.attr("height").map(str::to_string),
                src,
            })
        })
        .collect()
}
