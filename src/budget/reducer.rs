use serde::Serialize;
use std::collections::HashSet;

use crate::budget::config::TokenBudgetConfig;
use crate::budget::dictionary::CssValueDictionary;
use crate::budget::tokens::estimate_tokens;
use crate::dom::{for_each_node_mut, PreOrder};
use crate::error::{LensError, Result};
use crate::ir::PageIr;
use crate::utils::truncate_chars;

/// What a reduction did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReductionReport {
    pub nodes_before: usize,
    pub nodes_after: usize,
    pub dictionary_entries: usize,
    pub estimated_tokens: usize,

    /// Role annotations were removed to meet the token ceiling
    pub roles_dropped: bool,
}

/// Applies a [`TokenBudgetConfig`] to a page IR
#[derive(Debug, Clone, Copy)]
pub struct BudgetReducer {
    config: TokenBudgetConfig,
}

impl BudgetReducer {
    pub fn new(config: TokenBudgetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TokenBudgetConfig {
        &self.config
    }

    /// Reduce in place: root breadth, per-node structural entries, per-node
    /// text, CSS value compression, auxiliary collections, then the token
    /// ceiling check, which drops role annotations before failing. Every step
    /// saturates, so reducing an already reduced IR changes nothing.
    pub fn reduce(&self, ir: &mut PageIr) -> Result<ReductionReport> {
        // Start from literal values so a second pass sees the same input as the first
        if let Some(dictionary) = ir.css_value_dictionary.take() {
            dictionary.expand(&mut ir.tree);
        }
        let nodes_before = ir.total_nodes;

        self.truncate_roots(ir);
        retain_surviving_nodes(ir);
        self.truncate_text(ir);
        let dictionary_entries = self.compress_values(ir);
        self.truncate_collections(ir);

        ir.total_nodes = PreOrder::over(&ir.tree).count();

        let mut estimated_tokens = estimate_tokens(&*ir)?;
        let mut roles_dropped = false;
        log::debug!(
            "Reduced IR to {} nodes, {} dictionary entries, ~{} tokens",
            ir.total_nodes,
            dictionary_entries,
            estimated_tokens
        );

        if let Some(limit) = self.config.token_limit() {
            // Roles are optional annotations; shed them before giving up
            if estimated_tokens > limit && ir.structural.roles.take().is_some() {
                roles_dropped = true;
                estimated_tokens = estimate_tokens(&*ir)?;
                log::debug!("Dropped role annotations, IR now ~{} tokens", estimated_tokens);
            }
            if estimated_tokens > limit {
                log::warn!("Reduced IR needs ~{} tokens, budget allows {}", estimated_tokens, limit);
                return Err(LensError::PayloadTooLarge(format!(
                    "Reduced page needs about {} tokens, budget allows {}",
                    estimated_tokens, limit
                )));
            }
        }

        Ok(ReductionReport {
            nodes_before,
            nodes_after: ir.total_nodes,
            dictionary_entries,
            estimated_tokens,
            roles_dropped,
        })
    }

    fn truncate_roots(&self, ir: &mut PageIr) {
        if let Some(max) = self.config.node_limit() {
            ir.tree.truncate(max);
        }
    }

    fn truncate_text(&self, ir: &mut PageIr) {
        let Some(max) = self.config.text_limit() else {
            return;
        };
        for_each_node_mut(&mut ir.tree, |node| {
            let kept = truncate_chars(&node.direct_text, max);
            if kept.len() < node.direct_text.len() {
                node.direct_text = kept.to_string();
            }
        });
    }

    fn compress_values(&self, ir: &mut PageIr) -> usize {
        if !self.config.compress_css_values {
            return 0;
        }
        let dictionary = CssValueDictionary::build(&ir.tree, self.config.min_occurrences);
        if dictionary.is_empty() {
            return 0;
        }
        dictionary.compress(&mut ir.tree);
        let entries = dictionary.len();
        ir.css_value_dictionary = Some(dictionary);
        entries
    }

    fn truncate_collections(&self, ir: &mut PageIr) {
        if let Some(max) = self.config.nav_item_limit() {
            ir.navigation.items.truncate(max);
        }
        if let Some(max) = self.config.image_limit() {
            // Images with alt text first; stable within each group
            let (mut images, without_alt): (Vec<_>, Vec<_>) =
                std::mem::take(&mut ir.images).into_iter().partition(|i| i.has_alt());
            images.extend(without_alt);
            images.truncate(max);
            ir.images = images;
        }
        if let Some(max) = self.config.color_limit() {
            ir.colors.truncate(max);
        }
        if let Some(max) = self.config.css_class_limit() {
            ir.css_info.classes.sort_by(|a, b| b.property_count.cmp(&a.property_count));
            ir.css_info.classes.truncate(max);
        }
    }
}

/// Drop roles and section candidates of nodes no longer in the tree.
/// `section_count` keeps describing the whole page, like the difficulty.
fn retain_surviving_nodes(ir: &mut PageIr) {
    let surviving: HashSet<u32> = PreOrder::over(&ir.tree).map(|n| n.document_order).collect();
    let structural = &mut ir.structural;
    structural
        .section_candidates
        .retain(|c| surviving.contains(&c.document_order));
    if let Some(roles) = structural.roles.as_mut() {
        roles.retain(|r| surviving.contains(&r.document_order));
    }
}

/// Reduce an IR with the given budget
pub fn apply_budget(ir: &mut PageIr, config: &TokenBudgetConfig) -> Result<ReductionReport> {
    BudgetReducer::new(*config).reduce(ir)
}
