use std::collections::HashMap;
use url::Url;

use crate::analysis::{PageSignals, StructuralAnalyzer};
use crate::config::AnalyzerOptions;
use crate::css::{ColorCounter, CssInfo};
use crate::dom::images::{background_images, merge_images};
use crate::dom::{collect_page, DomTree, ExtractLimits};
use crate::ir::PageIr;
use crate::normalize::NormalizedPage;

/// Builds the [`PageIr`] from a normalized page and the original markup
pub struct IrAssembler {
    limits: ExtractLimits,
    analyzer: StructuralAnalyzer,
}

impl IrAssembler {
    pub fn new(options: &AnalyzerOptions) -> Self {
        Self {
            limits: ExtractLimits::from(options),
            analyzer: StructuralAnalyzer::new(options.capabilities),
        }
    }

    /// Extract the tree from the cleaned markup, run the collectors over the
    /// original markup and analyze the result. No budget is applied here.
    pub fn assemble(&self, raw_html: &str, base: &Url, page: NormalizedPage) -> PageIr {
        let tree = DomTree::extract(&page.cleaned_html, &page.css, base, self.limits);
        let collections = collect_page(raw_html, base);

        // Tie document images to the node that owns them
        let owners: HashMap<&str, u32> = tree
            .iter()
            .flat_map(|node| node.direct_images.iter().map(move |img| (img.src.as_str(), node.document_order)))
            .collect();
        let mut images = collections.images;
        for image in &mut images {
            image.document_order = owners.get(image.src.as_str()).copied();
        }
        merge_images(&mut images, background_images(&page.css, base));

        let mut colors = ColorCounter::new();
        for source in page.css_sources.iter().chain(&collections.inline_styles) {
            colors.scan(source);
        }

        let signals = PageSignals {
            form_count: collections.forms.len(),
            form_field_count: collections.forms.iter().map(|f| f.fields.len()).sum(),
            image_count: images.len(),
            cta_count: collections.ctas.len(),
            embed_count: page.embeds.len(),
            footer_columns: collections.footer.as_ref().map_or(0, |f| f.columns),
            nested_navigation: collections.navigation.nested,
        };
        let structural = self.analyzer.analyze(&tree, &signals);

        if tree.truncated {
            log::debug!("Extracted tree for {} was truncated by extraction caps", base);
        }

        PageIr {
            total_nodes: tree.count_nodes(),
            tree: tree.roots,
            navigation: collections.navigation,
            forms: collections.forms,
            images,
            colors: colors.finish(),
            fonts: page.fonts,
            ctas: collections.ctas,
            footer: collections.footer,
            social_links: collections.social_links,
            embeds: page.embeds,
            metadata: collections.metadata,
            language: collections.language,
            css_info: CssInfo::from_dictionary(&page.css),
            css_value_dictionary: None,
            structural,
        }
    }
}
