//! Single-pass collectors run over the original (pre-strip) document.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use url::Url;

use crate::utils::{collapse_whitespace, resolve_url, truncate_chars};

macro_rules! selector {
    ($name:ident, $css:expr) => {
        static $name: LazyLock<Selector> = LazyLock::new(|| {
            Selector::parse($css).expect(concat!(stringify!($name), ": hardcoded selector is valid"))
        });
    };
}

selector!(NAV_SELECTOR, "nav");
selector!(HEADER_SELECTOR, "header");
selector!(LIST_SELECTOR, "ul, ol");
selector!(ANCHOR_SELECTOR, "a");
selector!(FORM_SELECTOR, "form");
selector!(FIELD_SELECTOR, "input, select, textarea");
selector!(LABEL_SELECTOR, "label[for]");
selector!(FOOTER_SELECTOR, "footer");
selector!(CONTENTINFO_SELECTOR, r#"[role="contentinfo"]"#);
selector!(CTA_SELECTOR, "button, input, a");

const FOOTER_TEXT_LIMIT: usize = 500;

const SOCIAL_PLATFORMS: &[(&str, &str)] = &[
    ("facebook.com", "facebook"),
    ("twitter.com", "twitter"),
    ("x.com", "x"),
    ("instagram.com", "instagram"),
    ("linkedin.com", "linkedin"),
    ("youtube.com", "youtube"),
    ("github.com", "github"),
    ("tiktok.com", "tiktok"),
    ("pinterest.com", "pinterest"),
    ("discord.gg", "discord"),
    ("discord.com", "discord"),
    ("dribbble.com", "dribbble"),
    ("behance.net", "behance"),
    ("mastodon.social", "mastodon"),
];

/// A text + href pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavItem {
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Link>,
}

/// Primary navigation of the page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Navigation {
    pub items: Vec<NavItem>,

    /// A list nested inside a navigation list item (dropdown menus)
    pub nested: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub tag: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    pub method: String,

    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FooterInfo {
    /// Element children of the footer's innermost single-child wrapper
    pub columns: usize,

    pub links: Vec<Link>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocialLink {
    pub platform: String,
    pub href: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prominence {
    Primary,
    Secondary,
}

/// A call-to-action element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cta {
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub classes: String,

    pub prominence: Prominence,
}

fn element_text(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn link_of(anchor: ElementRef, base: &Url) -> Link {
    Link {
        text: element_text(anchor),
        href: anchor.value().attr("href").and_then(|h| resolve_url(base, h)),
    }
}

/// Navigation from the first `<nav>`, falling back to `<header>`
pub fn extract_navigation(document: &Html, base: &Url) -> Navigation {
    let Some(container) = document
        .select(&NAV_SELECTOR)
        .next()
        .or_else(|| document.select(&HEADER_SELECTOR).next())
    else {
        return Navigation::default();
    };

    let Some(list) = container.select(&LIST_SELECTOR).next() else {
        let items = container
            .select(&ANCHOR_SELECTOR)
            .map(|a| link_of(a, base))
            .filter(|l| !l.text.is_empty())
            .map(|l| NavItem { text: l.text, href: l.href, children: Vec::new() })
            .collect();
        return Navigation { items, nested: false };
    };

    let mut navigation = Navigation::default();
    for item in list.children().filter_map(ElementRef::wrap).filter(|e| e.value().name() == "li") {
        let sublist = item.select(&LIST_SELECTOR).next();
        let children: Vec<Link> = sublist
            .map(|sub| {
                sub.select(&ANCHOR_SELECTOR)
                    .map(|a| link_of(a, base))
                    .filter(|l| !l.text.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        if sublist.is_some() {
            navigation.nested = true;
        }

        let Some(anchor) = item.select(&ANCHOR_SELECTOR).next() else {
            continue;
        };
        let link = link_of(anchor, base);
        if link.text.is_empty() {
            continue;
        }
        navigation.items.push(NavItem {
            text: link.text,
            href: link.href,
            children,
        });
    }
    navigation
}

/// Forms with their user-facing fields (hidden and button inputs skipped)
pub fn extract_forms(document: &Html, base: &Url) -> Vec<FormInfo> {
    let labels: HashMap<String, String> = document
        .select(&LABEL_SELECTOR)
        .filter_map(|label| {
            let target = label.value().attr("for")?;
            Some((target.to_string(), element_text(label)))
        })
        .collect();

    document
        .select(&FORM_SELECTOR)
        .map(|form| {
            let fields = form
                .select(&FIELD_SELECTOR)
                .filter_map(|field| {
                    let el = field.value();
                    let input_type = el.attr("type").map(|t| t.to_ascii_lowercase());
                    if el.name() == "input"
                        && matches!(
                            input_type.as_deref(),
                            Some("hidden" | "submit" | "button" | "reset" | "image")
                        )
                    {
                        return None;
                    }
                    let label = el
                        .attr("id")
                        .and_then(|id| labels.get(id).cloned())
                        .or_else(|| el.attr("aria-label").map(str::to_string))
                        .filter(|l| !l.is_empty());
                    Some(FormField {
                        tag: el.name().to_string(),
                        input_type,
                        name: el.attr("name").map(str::to_string),
                        label,
                        placeholder: el.attr("placeholder").map(str::to_string),
                        required: el.attr("required").is_some(),
                    })
                })
                .collect();

            FormInfo {
                action: form.value().attr("action").and_then(|a| resolve_url(base, a)),
                method: form
                    .value()
                    .attr("method")
                    .map(|m| m.to_ascii_uppercase())
                    .unwrap_or_else(|| "GET".to_string()),
                fields,
            }
        })
        .collect()
}

/// Footer summary from the first `<footer>` or `role="contentinfo"` element
pub fn extract_footer(document: &Html, base: &Url) -> Option<FooterInfo> {
    let footer = document
        .select(&FOOTER_SELECTOR)
        .next()
        .or_else(|| document.select(&CONTENTINFO_SELECTOR).next())?;

    let mut wrapper = footer;
    loop {
        let mut children = wrapper.children().filter_map(ElementRef::wrap);
        match (children.next(), children.next()) {
            (Some(only), None) => wrapper = only,
            _ => break,
        }
    }
    let columns = wrapper.children().filter_map(ElementRef::wrap).count();

    let links = footer
        .select(&ANCHOR_SELECTOR)
        .map(|a| link_of(a, base))
        .filter(|l| !l.text.is_empty())
        .collect();

    Some(FooterInfo {
        columns,
        links,
        text: truncate_chars(&element_text(footer), FOOTER_TEXT_LIMIT).to_string(),
    })
}

/// Platform name for a social profile URL
pub fn social_platform(href: &str) -> Option<&'static str> {
    let url = Url::parse(href).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    SOCIAL_PLATFORMS
        .iter()
        .find(|(domain, _)| host == *domain || host.ends_with(&format!(".{}", domain)))
        .map(|&(_, platform)| platform)
}

/// Links to social profiles, deduplicated by URL
pub fn extract_social_links(document: &Html, base: &Url) -> Vec<SocialLink> {
    let mut seen = HashSet::new();
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href").and_then(|h| resolve_url(base, h)))
        .filter_map(|href| {
            let platform = social_platform(&href)?;
            seen.insert(href.clone()).then(|| SocialLink {
                platform: platform.to_string(),
                href,
            })
        })
        .collect()
}

fn looks_like_button(classes: &str) -> bool {
    let lower = classes.to_ascii_lowercase();
    lower.contains("btn") || lower.contains("button") || lower.contains("cta")
}

/// Buttons, submit inputs and button-styled links, deduplicated by (text, href)
pub fn extract_ctas(document: &Html, base: &Url) -> Vec<Cta> {
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
    let mut ctas = Vec::new();

    for element in document.select(&CTA_SELECTOR) {
        let el = element.value();
        let classes = el.attr("class").map(collapse_whitespace).unwrap_or_default();

        let text = match el.name() {
            "input" => {
                let input_type = el.attr("type").unwrap_or_default().to_ascii_lowercase();
                if input_type != "submit" && input_type != "button" {
                    continue;
                }
                el.attr("value").map(collapse_whitespace).unwrap_or_else(|| "Submit".to_string())
            }
            "a" => {
                if el.attr("role") != Some("button") && !looks_like_button(&classes) {
                    continue;
                }
                element_text(element)
            }
            _ => element_text(element),
        };
        let text = if text.is_empty() {
            el.attr("aria-label").map(collapse_whitespace).unwrap_or_default()
        } else {
            text
        };
        if text.is_empty() {
            continue;
        }

        let href = el.attr("href").and_then(|h| resolve_url(base, h));
        if !seen.insert((text.clone(), href.clone())) {
            continue;
        }

        let lower = classes.to_ascii_lowercase();
        let prominence = if lower.contains("primary") || lower.contains("cta") || lower.contains("hero") {
            Prominence::Primary
        } else {
            Prominence::Secondary
        };

        ctas.push(Cta { text, href, classes, prominence });
    }

    ctas
}
