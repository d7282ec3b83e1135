//! DOM extraction module
//!
//! This module turns cleaned markup into the structural tree handed to the analyzer
//! and reducer. It includes:
//! - DomNode: one element with resolved CSS, direct text and direct images
//! - DomTree: depth- and breadth-bounded tree in document order
//! - collections/metadata: single-pass collectors over the original document

pub mod collections;
pub mod images;
pub mod metadata;
pub mod node;
pub mod tree;

pub use collections::{
    Cta, FooterInfo, FormField, FormInfo, Link, NavItem, Navigation, Prominence, SocialLink,
};
pub use metadata::PageMetadata;
pub use node::{for_each_node_mut, DomNode, ImageRecord, ImageSource, PreOrder};
pub use tree::{DomTree, ExtractLimits};

use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

static STYLE_ATTR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[style]").expect("STYLE_ATTR_SELECTOR: hardcoded selector is valid"));

/// Auxiliary collections gathered from the original (pre-strip) document
#[derive(Debug, Clone, Default)]
pub struct PageCollections {
    pub navigation: Navigation,
    pub forms: Vec<FormInfo>,
    pub images: Vec<ImageRecord>,
    pub footer: Option<FooterInfo>,
    pub social_links: Vec<SocialLink>,
    pub ctas: Vec<Cta>,
    pub metadata: PageMetadata,
    pub language: Option<String>,

    /// Every `style` attribute value, in document order
    pub inline_styles: Vec<String>,
}

/// Run every collector over the original markup
pub fn collect_page(html: &str, base: &Url) -> PageCollections {
    let document = Html::parse_document(html);
    PageCollections {
        navigation: collections::extract_navigation(&document, base),
        forms: collections::extract_forms(&document, base),
        images: images::collect_images(&document, base),
        footer: collections::extract_footer(&document, base),
        social_links: collections::extract_social_links(&document, base),
        ctas: collections::extract_ctas(&document, base),
        metadata: metadata::extract_metadata(&document, base),
        language: metadata::detect_language(&document),
        inline_styles: document
            .select(&STYLE_ATTR_SELECTOR)
            .filter_map(|el| el.value().attr("style").map(str::to_string))
            .collect(),
    }
}
