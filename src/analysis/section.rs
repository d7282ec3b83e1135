use serde::{Deserialize, Serialize};

use crate::css::colors::{color_alpha, first_color, strip_urls};
use crate::css::ResolvedCss;
use crate::dom::{DomNode, DomTree};

/// Score at or above which a node is a section candidate
pub const SECTION_THRESHOLD: u32 = 40;

const MAX_SCORE: u32 = 100;

/// Values pixel lengths are compared against
const SPACING_THRESHOLD_PX: f64 = 20.0;
const REM_PX: f64 = 16.0;

const NO_BACKGROUND: &[&str] = &["transparent", "none", "initial", "inherit", "unset"];

/// Words in a `background` shorthand that are not colors
const BACKGROUND_KEYWORDS: &[&str] = &[
    "repeat", "no-repeat", "repeat-x", "repeat-y", "space", "round", "center", "top", "bottom",
    "left", "right", "cover", "contain", "fixed", "scroll", "local", "auto", "border-box",
    "padding-box", "content-box",
];

const SPACING_PROPERTIES: &[&str] = &[
    "padding", "padding-top", "padding-right", "padding-bottom", "padding-left", "margin",
    "margin-top", "margin-right", "margin-bottom", "margin-left",
];

/// A node scoring at or above [`SECTION_THRESHOLD`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SectionCandidate {
    pub document_order: u32,
    pub tag: String,
    pub score: u32,
}

fn visible(value: &str) -> Option<String> {
    let value = value.trim().to_ascii_lowercase();
    if value.is_empty() || NO_BACKGROUND.contains(&value.as_str()) || color_alpha(&value) == Some(0.0) {
        None
    } else {
        Some(value)
    }
}

/// The node's own non-transparent background, if it declares one
pub fn own_background(css: &ResolvedCss) -> Option<String> {
    if let Some(color) = css.get("background-color") {
        return visible(color);
    }
    let shorthand = css.get("background")?;
    let without_urls = strip_urls(shorthand);
    if let Some(color) = first_color(&without_urls) {
        return visible(&color);
    }
    without_urls
        .split_whitespace()
        .map(str::to_ascii_lowercase)
        .find(|word| {
            word.chars().all(|c| c.is_ascii_alphabetic() || c == '-')
                && !BACKGROUND_KEYWORDS.contains(&word.as_str())
        })
        .and_then(|word| visible(&word))
}

/// Pixel value of a CSS length; `rem`/`em` count as 16px
pub fn length_px(token: &str) -> Option<f64> {
    let token = token.trim().to_ascii_lowercase();
    let (number, scale) = if let Some(n) = token.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = token.strip_suffix("rem") {
        (n, REM_PX)
    } else if let Some(n) = token.strip_suffix("em") {
        (n, REM_PX)
    } else {
        (token.as_str(), 1.0)
    };
    let value: f64 = number.parse().ok()?;
    // Unitless non-zero numbers are not lengths
    if scale == 1.0 && !token.ends_with("px") && value != 0.0 {
        return None;
    }
    Some(value * scale)
}

/// Padding or margin of at least 20px on any side
pub fn has_generous_spacing(css: &ResolvedCss) -> bool {
    SPACING_PROPERTIES.iter().filter_map(|p| css.get(*p)).any(|value| {
        value
            .split_whitespace()
            .filter_map(length_px)
            .any(|px| px >= SPACING_THRESHOLD_PX)
    })
}

fn layout_bonus(node: &DomNode) -> u32 {
    let display = node.css("display").unwrap_or_default().trim().to_ascii_lowercase();
    if display.contains("grid") {
        25
    } else if display.contains("flex") {
        let direction = node.css("flex-direction").unwrap_or_default().to_ascii_lowercase();
        if direction.starts_with("column") { 20 } else { 15 }
    } else if node.is_container {
        5
    } else {
        0
    }
}

fn position_bonus(node: &DomNode) -> u32 {
    match node.css("position").map(|p| p.trim().to_ascii_lowercase()).as_deref() {
        Some("relative") => 15,
        Some("absolute" | "fixed") => 10,
        _ => 0,
    }
}

fn depth_bonus(depth: u32) -> u32 {
    match depth {
        0..=3 => 10,
        4..=5 => 5,
        _ => 0,
    }
}

/// Additive visual-prominence score, capped at 100. `parent_background` is
/// the parent's effective background (inherited when it declares none).
pub fn section_score(node: &DomNode, parent_background: Option<&str>) -> u32 {
    let mut score = 0;

    if let Some(background) = own_background(&node.resolved_css) {
        score += if parent_background != Some(background.as_str()) { 30 } else { 15 };
    }
    score += layout_bonus(node);
    score += position_bonus(node);
    if node
        .css("z-index")
        .and_then(|z| z.trim().parse::<i64>().ok())
        .is_some_and(|z| z > 0)
    {
        score += 10;
    }
    if has_generous_spacing(&node.resolved_css) {
        score += 10;
    }
    score += depth_bonus(node.depth);

    score.min(MAX_SCORE)
}

/// Score every node in pre-order, threading effective backgrounds down the tree
pub fn score_tree(tree: &DomTree) -> Vec<(u32, u32)> {
    let body_background = own_background(&tree.body_css);
    let mut scores = Vec::new();
    let mut stack: Vec<(&DomNode, Option<String>)> =
        tree.roots.iter().rev().map(|n| (n, body_background.clone())).collect();

    while let Some((node, parent_background)) = stack.pop() {
        scores.push((node.document_order, section_score(node, parent_background.as_deref())));
        let effective = own_background(&node.resolved_css).or(parent_background);
        stack.extend(node.children.iter().rev().map(|c| (c, effective.clone())));
    }
    scores
}

/// Nodes scoring at or above the threshold, in document order. `scores`
/// must come from [`score_tree`] over the same tree.
pub fn candidates_from_scores(tree: &DomTree, scores: &[(u32, u32)]) -> Vec<SectionCandidate> {
    tree.iter()
        .zip(scores)
        .filter(|(_, (_, score))| *score >= SECTION_THRESHOLD)
        .map(|(node, &(document_order, score))| SectionCandidate {
            document_order,
            tag: node.tag.clone(),
            score,
        })
        .collect()
}

pub fn section_candidates(tree: &DomTree) -> Vec<SectionCandidate> {
    candidates_from_scores(tree, &score_tree(tree))
}
