use serde::{Deserialize, Serialize};

use crate::analysis::layout::LayoutType;
use crate::analysis::PageSignals;

/// Number of contributing factors listed as reasons
const MAX_REASONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Everything the difficulty score looks at
#[derive(Debug, Clone, Copy)]
pub struct DifficultyInputs {
    pub nodes: usize,
    pub max_depth: usize,
    pub layout: LayoutType,
    pub form_fields: usize,
    pub nested_navigation: bool,
    pub embeds: usize,
    pub ctas: usize,
    pub footer_columns: usize,
}

impl DifficultyInputs {
    pub fn new(nodes: usize, max_depth: usize, layout: LayoutType, signals: &PageSignals) -> Self {
        Self {
            nodes,
            max_depth,
            layout,
            form_fields: signals.form_field_count,
            nested_navigation: signals.nested_navigation,
            embeds: signals.embed_count,
            ctas: signals.cta_count,
            footer_columns: signals.footer_columns,
        }
    }
}

/// Score, level and the first contributing factors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyAssessment {
    pub score: u32,
    pub level: Difficulty,
    pub reasons: Vec<String>,
}

/// Factors in evaluation order; each yields points and a reason when it contributes
fn factors(inputs: &DifficultyInputs) -> [(u32, String); 8] {
    [
        (
            match inputs.nodes {
                n if n > 300 => 3,
                n if n > 150 => 2,
                n if n > 60 => 1,
                _ => 0,
            },
            format!("{} nodes", inputs.nodes),
        ),
        (
            match inputs.max_depth {
                d if d > 10 => 2,
                d if d > 6 => 1,
                _ => 0,
            },
            format!("nesting depth {}", inputs.max_depth),
        ),
        (
            match inputs.layout {
                LayoutType::Grid | LayoutType::Mixed => 2,
                LayoutType::TwoColumn => 1,
                LayoutType::SingleColumn => 0,
            },
            format!("{} layout", inputs.layout.as_str()),
        ),
        (
            match inputs.form_fields {
                n if n > 10 => 2,
                n if n > 3 => 1,
                _ => 0,
            },
            format!("{} form fields", inputs.form_fields),
        ),
        (u32::from(inputs.nested_navigation), "nested navigation".to_string()),
        (
            match inputs.embeds {
                n if n > 2 => 2,
                n if n > 0 => 1,
                _ => 0,
            },
            format!("{} embeds", inputs.embeds),
        ),
        (u32::from(inputs.ctas > 8), format!("{} calls to action", inputs.ctas)),
        (
            match inputs.footer_columns {
                n if n > 4 => 2,
                n if n > 2 => 1,
                _ => 0,
            },
            format!("{} footer columns", inputs.footer_columns),
        ),
    ]
}

pub fn assess_difficulty(inputs: &DifficultyInputs) -> DifficultyAssessment {
    let mut score = 0;
    let mut reasons = Vec::new();

    for (points, reason) in factors(inputs) {
        if points == 0 {
            continue;
        }
        score += points;
        if reasons.len() < MAX_REASONS {
            reasons.push(reason);
        }
    }

    let level = match score {
        s if s >= 8 => Difficulty::Hard,
        s if s >= 4 => Difficulty::Medium,
        _ => Difficulty::Easy,
    };

    DifficultyAssessment { score, level, reasons }
}
