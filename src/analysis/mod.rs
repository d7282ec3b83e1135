//! Structural analysis
//!
//! Deterministic heuristics over the extracted tree:
//! - layout type from grid/flex container ratios
//! - section candidacy from an additive visual-prominence score
//! - content density and difficulty with their contributing factors
//! - optional role inference (gated by [`AnalyzerCapabilities::role_inference`])
//!
//! Nothing here performs I/O or mutates the tree.

pub mod density;
pub mod difficulty;
pub mod layout;
pub mod roles;
pub mod section;

pub use density::ContentDensity;
pub use difficulty::Difficulty;
pub use layout::LayoutType;
pub use roles::{NodeRole, Role, RoleRule};
pub use section::{section_score, SectionCandidate, SECTION_THRESHOLD};

use serde::{Deserialize, Serialize};

use crate::config::AnalyzerCapabilities;
use crate::dom::DomTree;

/// Page-level counts the tree alone does not carry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSignals {
    pub form_count: usize,
    pub form_field_count: usize,
    pub image_count: usize,
    pub cta_count: usize,
    pub embed_count: usize,
    pub footer_columns: usize,
    pub nested_navigation: bool,
}

/// Read-only structural summary of a page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructuralAnalysis {
    pub layout_type: LayoutType,

    pub section_count: usize,

    pub content_density: ContentDensity,

    pub difficulty: Difficulty,

    pub difficulty_score: u32,

    /// Up to three contributing difficulty factors, in evaluation order
    pub reasons: Vec<String>,

    /// Short human-readable justification of the difficulty
    pub justification: String,

    pub section_candidates: Vec<SectionCandidate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<NodeRole>>,
}

fn justify(difficulty: Difficulty, reasons: &[String]) -> String {
    if reasons.is_empty() {
        format!("{:?} page with no notable complexity", difficulty)
    } else {
        reasons.join(", ")
    }
}

/// Runs the structural heuristics, with optional capabilities
pub struct StructuralAnalyzer {
    capabilities: AnalyzerCapabilities,
    rules: Vec<RoleRule>,
}

impl Default for StructuralAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerCapabilities::default())
    }
}

impl StructuralAnalyzer {
    pub fn new(capabilities: AnalyzerCapabilities) -> Self {
        Self {
            capabilities,
            rules: roles::default_rules(),
        }
    }

    /// Builder method: append a role rule after the built-in ones
    pub fn with_rule(mut self, rule: RoleRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn analyze(&self, tree: &DomTree, signals: &PageSignals) -> StructuralAnalysis {
        let nodes = tree.count_nodes();
        let text_chars: usize = tree.iter().map(|n| n.direct_text.chars().count()).sum();

        let layout_type = layout::detect_layout(tree);

        let scores = section::score_tree(tree);
        let section_candidates = section::candidates_from_scores(tree, &scores);
        let section_count = section_candidates.len();

        let density_inputs = density::DensityInputs::new(text_chars, nodes, section_count, signals);
        let content_density = density::classify_density(density::density_score(&density_inputs));

        let difficulty_inputs = difficulty::DifficultyInputs::new(nodes, tree.max_depth(), layout_type, signals);
        let assessment = difficulty::assess_difficulty(&difficulty_inputs);

        let roles = self
            .capabilities
            .role_inference
            .then(|| roles::infer_roles(tree, &self.rules, &scores));

        log::debug!(
            "Analyzed {} nodes: {} layout, {} sections, difficulty {}",
            nodes,
            layout_type.as_str(),
            section_count,
            assessment.score
        );

        StructuralAnalysis {
            layout_type,
            section_count,
            content_density,
            difficulty: assessment.level,
            difficulty_score: assessment.score,
            justification: justify(assessment.level, &assessment.reasons),
            reasons: assessment.reasons,
            section_candidates,
            roles,
        }
    }
}
