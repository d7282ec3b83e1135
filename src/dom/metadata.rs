use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

use crate::utils::{collapse_whitespace, resolve_url};

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("TITLE_SELECTOR: hardcoded selector is valid"));
static META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta").expect("META_SELECTOR: hardcoded selector is valid"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("link[rel][href]").expect("LINK_SELECTOR: hardcoded selector is valid"));
static HTML_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("html").expect("HTML_SELECTOR: hardcoded selector is valid"));

/// Document-level metadata from `<head>`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_site_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
}

pub fn extract_metadata(document: &Html, base: &Url) -> PageMetadata {
    let mut metadata = PageMetadata {
        title: document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|t| collapse_whitespace(&t.text().collect::<String>()))
            .filter(|t| !t.is_empty()),
        ..Default::default()
    };

    for meta in document.select(&META_SELECTOR) {
        let el = meta.value();
        let Some(content) = el.attr("content").map(str::trim).filter(|c| !c.is_empty()) else {
            continue;
        };
        let key = el
            .attr("name")
            .or_else(|| el.attr("property"))
            .unwrap_or_default()
            .to_ascii_lowercase();

        // First occurrence wins
        let slot = match key.as_str() {
            "description" => &mut metadata.description,
            "viewport" => &mut metadata.viewport,
            "theme-color" => &mut metadata.theme_color,
            "generator" => &mut metadata.generator,
            "og:title" => &mut metadata.og_title,
            "og:description" => &mut metadata.og_description,
            "og:type" => &mut metadata.og_type,
            "og:site_name" => &mut metadata.og_site_name,
            "og:image" => {
                if metadata.og_image.is_none() {
                    metadata.og_image = resolve_url(base, content);
                }
                continue;
            }
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(content.to_string());
        }
    }

    for link in document.select(&LINK_SELECTOR) {
        let el = link.value();
        let (Some(rel), Some(href)) = (el.attr("rel"), el.attr("href")) else {
            continue;
        };
        let rels: Vec<String> = rel.split_whitespace().map(str::to_ascii_lowercase).collect();
        if rels.iter().any(|r| r == "canonical") && metadata.canonical.is_none() {
            metadata.canonical = resolve_url(base, href);
        }
        if rels.iter().any(|r| r == "icon") && metadata.favicon.is_none() {
            metadata.favicon = resolve_url(base, href);
        }
    }

    metadata
}

/// Primary language subtag from `<html lang>` or a content-language meta tag
pub fn detect_language(document: &Html) -> Option<String> {
    let declared = document
        .select(&HTML_SELECTOR)
        .next()
        .and_then(|html| html.value().attr("lang").map(str::to_string))
        .or_else(|| {
            document
                .select(&META_SELECTOR)
                .find(|m| {
                    m.value()
                        .attr("http-equiv")
                        .is_some_and(|h| h.eq_ignore_ascii_case("content-language"))
                })
                .and_then(|m| m.value().attr("content").map(str::to_string))
        })?;

    let primary = declared.trim().split([',', '-', '_']).next()?.trim().to_ascii_lowercase();
    (!primary.is_empty()).then_some(primary)
}
