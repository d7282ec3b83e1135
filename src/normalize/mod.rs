//! Page normalization
//!
//! Turns raw, possibly hostile markup into cleaned markup plus the metadata that
//! has to be pulled out before cleaning destroys it:
//! - fonts from font-provider `<link>` tags and `@font-face` rules
//! - classified `<iframe>` embeds
//! - the CSS class dictionary from `<style>` blocks and fetched stylesheets

pub mod embeds;
pub mod fonts;
pub mod sanitize;
pub mod stylesheets;

pub use embeds::{classify_embed, Embed, EmbedKind};
pub use fonts::FontDeclaration;
pub use stylesheets::{fetch_stylesheets, stylesheet_links};

use crate::config::AnalyzerOptions;
use crate::css::CssClassDictionary;
use crate::error::{LensError, Result};
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

static STYLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("style").expect("STYLE_SELECTOR: hardcoded selector is valid"));

/// Output of [`Normalizer::normalize`]
#[derive(Debug, Clone)]
pub struct NormalizedPage {
    /// Markup with scripts, styles, frames, handlers and comments removed
    pub cleaned_html: String,

    pub fonts: Vec<FontDeclaration>,

    pub embeds: Vec<Embed>,

    /// Class rules from inline `<style>` blocks followed by external stylesheets
    pub css: CssClassDictionary,

    /// Raw CSS sources in the order they were merged into `css`
    pub css_sources: Vec<String>,
}

/// Cleans page markup according to [`AnalyzerOptions`]
#[derive(Debug, Clone)]
pub struct Normalizer {
    min_body_text_chars: usize,
    max_html_bytes: usize,
}

impl Normalizer {
    pub fn new(options: &AnalyzerOptions) -> Self {
        Self {
            min_body_text_chars: options.min_body_text_chars,
            max_html_bytes: options.max_html_bytes,
        }
    }

    /// Reject oversized input before any parsing happens
    pub fn check_size(&self, html: &str) -> Result<()> {
        if html.len() > self.max_html_bytes {
            return Err(LensError::PayloadTooLarge(format!(
                "HTML is {} bytes, limit is {} bytes",
                html.len(),
                self.max_html_bytes
            )));
        }
        Ok(())
    }

    /// Normalize a page. `external_css` holds already-fetched linked stylesheets
    /// (empty entries for failed fetches) and is merged after inline `<style>` blocks.
    pub fn normalize(&self, html: &str, base: &Url, external_css: &[String]) -> Result<NormalizedPage> {
        self.check_size(html)?;
        let document = Html::parse_document(html);

        let mut css_sources: Vec<String> = document
            .select(&STYLE_SELECTOR)
            .map(|style| style.text().collect::<String>())
            .filter(|css| !css.trim().is_empty())
            .collect();
        css_sources.extend(external_css.iter().filter(|css| !css.trim().is_empty()).cloned());

        let mut fonts = fonts::extract_font_links(&document, base);
        for css in &css_sources {
            for face in fonts::extract_font_faces(css) {
                if !fonts.iter().any(|f| f.family == face.family) {
                    fonts.push(face);
                }
            }
        }

        let embeds = embeds::extract_embeds(&document, base);

        let mut css = CssClassDictionary::new();
        for source in &css_sources {
            css.extend_from_css(source);
        }

        let cleaned = sanitize::remove_stripped_tags(html);
        let cleaned = sanitize::strip_event_handlers(&cleaned);
        let cleaned = sanitize::strip_comments(&cleaned);
        let cleaned_html = sanitize::collapse_horizontal_whitespace(&cleaned);

        let body = sanitize::body_markup(&cleaned_html);
        let text_len = sanitize::body_text_len(body);
        if text_len < self.min_body_text_chars && !sanitize::has_structural_tags(body) {
            return Err(LensError::UnprocessableContent(format!(
                "Page body has {} characters of text and no structural markup; it likely requires script execution",
                text_len
            )));
        }

        log::debug!(
            "Normalized {} -> {} bytes ({} fonts, {} embeds, {} class rules)",
            html.len(),
            cleaned_html.len(),
            fonts.len(),
            embeds.len(),
            css.len()
        );

        Ok(NormalizedPage {
            cleaned_html,
            fonts,
            embeds,
            css,
            css_sources,
        })
    }
}
