use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

const FONT_PROVIDERS: &[(&str, &str)] = &[
    ("fonts.googleapis.com", "google"),
    ("fonts.bunny.net", "bunny"),
    ("use.typekit.net", "adobe"),
    ("fast.fonts.net", "fonts.com"),
    ("use.fontawesome.com", "fontawesome"),
];

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("link[href]").expect("LINK_SELECTOR: hardcoded selector is valid"));

static FONT_FACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)@font-face\s*\{[^}]*?font-family\s*:\s*['"]?([^;'"}]+)"#)
        .expect("FONT_FACE_RE: hardcoded regex is valid")
});

/// A web font the page loads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FontDeclaration {
    pub family: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weights: Vec<String>,

    /// Provider name, or `self-hosted` for `@font-face` rules
    pub provider: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Fonts declared through font-provider `<link>` tags
pub fn extract_font_links(document: &Html, base: &Url) -> Vec<FontDeclaration> {
    let mut fonts: Vec<FontDeclaration> = Vec::new();

    for link in document.select(&LINK_SELECTOR) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Ok(url) = base.join(href.trim()) else {
            continue;
        };
        let host = url.host_str().unwrap_or_default();
        let Some(&(_, provider)) = FONT_PROVIDERS.iter().find(|(h, _)| host.ends_with(h)) else {
            continue;
        };

        let families = parse_family_params(&url);
        if families.is_empty() {
            fonts.push(FontDeclaration {
                family: provider.to_string(),
                weights: Vec::new(),
                provider: provider.to_string(),
                url: Some(url.to_string()),
            });
            continue;
        }

        for (family, weights) in families {
            if fonts.iter().any(|f| f.family == family && f.provider == provider) {
                continue;
            }
            fonts.push(FontDeclaration {
                family,
                weights,
                provider: provider.to_string(),
                url: Some(url.to_string()),
            });
        }
    }

    fonts
}

/// Families declared with `@font-face` in the page's CSS
pub fn extract_font_faces(css: &str) -> Vec<FontDeclaration> {
    let mut fonts: Vec<FontDeclaration> = Vec::new();
    for caps in FONT_FACE_RE.captures_iter(css) {
        let family = caps[1].trim().to_string();
        if family.is_empty() || fonts.iter().any(|f| f.family == family) {
            continue;
        }
        fonts.push(FontDeclaration {
            family,
            weights: Vec::new(),
            provider: "self-hosted".to_string(),
            url: None,
        });
    }
    fonts
}

/// `family=Inter:wght@400;700` (css2) and `family=Roboto:400,700|Lato` (css v1)
fn parse_family_params(url: &Url) -> Vec<(String, Vec<String>)> {
    let mut families = Vec::new();
    for (key, value) in url.query_pairs() {
        if key != "family" {
            continue;
        }
        for entry in value.split('|') {
            let (name, spec) = entry.split_once(':').unwrap_or((entry, ""));
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let spec = spec.rsplit('@').next().unwrap_or_default();
            let weights = if spec.contains(';') || !spec.contains(',') {
                spec.split(';')
                    .filter_map(|w| w.rsplit(',').next())
                    .filter(|w| !w.is_empty())
                    .map(str::to_string)
                    .collect()
            } else {
                spec.split(',').map(str::to_string).collect()
            };
            families.push((name.to_string(), weights));
        }
    }
    families
}
