use serde::{Deserialize, Serialize};

use crate::analysis::PageSignals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentDensity {
    Low,
    Medium,
    High,
}

/// Inputs to the density score
#[derive(Debug, Clone, Copy, Default)]
pub struct DensityInputs {
    pub text_chars: usize,
    pub images: usize,
    pub forms: usize,
    pub nodes: usize,
    pub sections: usize,
    pub ctas: usize,
}

impl DensityInputs {
    pub fn new(text_chars: usize, nodes: usize, sections: usize, signals: &PageSignals) -> Self {
        Self {
            text_chars,
            images: signals.image_count,
            forms: signals.form_count,
            nodes,
            sections,
            ctas: signals.cta_count,
        }
    }
}

pub fn density_score(inputs: &DensityInputs) -> u32 {
    let mut score = 0;

    score += match inputs.text_chars {
        n if n > 3000 => 3,
        n if n > 1500 => 2,
        n if n > 500 => 1,
        _ => 0,
    };
    score += match inputs.images {
        n if n > 15 => 2,
        n if n > 5 => 1,
        _ => 0,
    };
    score += match inputs.forms {
        n if n > 2 => 2,
        n if n > 0 => 1,
        _ => 0,
    };
    score += if inputs.nodes > 100 || inputs.sections > 10 {
        2
    } else if inputs.nodes > 50 || inputs.sections > 5 {
        1
    } else {
        0
    };
    if inputs.ctas > 5 {
        score += 1;
    }

    score
}

pub fn classify_density(score: u32) -> ContentDensity {
    match score {
        s if s >= 7 => ContentDensity::High,
        s if s >= 4 => ContentDensity::Medium,
        _ => ContentDensity::Low,
    }
}
