//! Visual role inference
//!
//! Roles come from an ordered list of independent rules. Each rule pairs a role
//! with a priority and a predicate; a node takes the role of the highest-priority
//! rule that matches it, earlier rules winning ties. New heuristics are added by
//! appending a rule, not by branching on tags.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::analysis::section::SECTION_THRESHOLD;
use crate::dom::{DomNode, DomTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Navigation,
    Header,
    Footer,
    Hero,
    Form,
    Card,
    Cta,
    Media,
    Section,
    Content,
}

/// What a rule predicate sees about one node
#[derive(Debug, Clone, Copy)]
pub struct RoleContext<'a> {
    pub node: &'a DomNode,
    pub section_score: u32,
}

impl RoleContext<'_> {
    fn role_attr(&self) -> Option<String> {
        self.node.get_attribute("role").map(|r| r.to_ascii_lowercase())
    }

    fn class_contains(&self, needle: &str) -> bool {
        self.node.classes().any(|c| c.to_ascii_lowercase().contains(needle))
    }
}

pub struct RoleRule {
    pub role: Role,
    pub priority: u8,
    pub predicate: fn(&RoleContext) -> bool,
}

impl std::fmt::Debug for RoleRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleRule")
            .field("role", &self.role)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Role assigned to one node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeRole {
    pub document_order: u32,
    pub role: Role,
}

const CONTENT_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "article", "main", "blockquote", "li", "dl", "table",
];

fn is_navigation(ctx: &RoleContext) -> bool {
    ctx.node.is_tag("nav") || ctx.role_attr().as_deref() == Some("navigation")
}

fn is_header(ctx: &RoleContext) -> bool {
    ctx.node.is_tag("header") || ctx.role_attr().as_deref() == Some("banner")
}

fn is_footer(ctx: &RoleContext) -> bool {
    ctx.node.is_tag("footer") || ctx.role_attr().as_deref() == Some("contentinfo")
}

fn is_hero(ctx: &RoleContext) -> bool {
    if ctx.class_contains("hero") || ctx.class_contains("jumbotron") {
        return true;
    }
    ctx.node.depth <= 1
        && ctx.section_score >= SECTION_THRESHOLD
        && ctx.node.pre_order().any(|n| n.is_tag("h1"))
}

fn is_form(ctx: &RoleContext) -> bool {
    ctx.node.is_tag("form") || ctx.role_attr().as_deref() == Some("search")
}

fn is_card(ctx: &RoleContext) -> bool {
    ctx.class_contains("card") || ctx.class_contains("tile") || (ctx.node.is_tag("article") && ctx.node.depth > 0)
}

fn is_cta(ctx: &RoleContext) -> bool {
    ctx.node.is_tag("button")
        || ctx.role_attr().as_deref() == Some("button")
        || (ctx.node.is_tag("a") && (ctx.class_contains("btn") || ctx.class_contains("button") || ctx.class_contains("cta")))
}

fn is_media(ctx: &RoleContext) -> bool {
    matches!(ctx.node.tag.as_str(), "figure" | "picture" | "video" | "audio")
        || (!ctx.node.direct_images.is_empty() && ctx.node.direct_text.is_empty() && !ctx.node.is_container)
}

fn is_section(ctx: &RoleContext) -> bool {
    ctx.node.is_tag("section") || ctx.section_score >= SECTION_THRESHOLD
}

fn is_content(ctx: &RoleContext) -> bool {
    CONTENT_TAGS.contains(&ctx.node.tag.as_str()) && !ctx.node.direct_text.is_empty()
}

/// The built-in rule set
pub fn default_rules() -> Vec<RoleRule> {
    vec![
        RoleRule { role: Role::Navigation, priority: 90, predicate: is_navigation },
        RoleRule { role: Role::Header, priority: 80, predicate: is_header },
        RoleRule { role: Role::Footer, priority: 80, predicate: is_footer },
        RoleRule { role: Role::Hero, priority: 75, predicate: is_hero },
        RoleRule { role: Role::Form, priority: 70, predicate: is_form },
        RoleRule { role: Role::Cta, priority: 60, predicate: is_cta },
        RoleRule { role: Role::Media, priority: 55, predicate: is_media },
        RoleRule { role: Role::Card, priority: 50, predicate: is_card },
        RoleRule { role: Role::Section, priority: 40, predicate: is_section },
        RoleRule { role: Role::Content, priority: 10, predicate: is_content },
    ]
}

/// Highest-priority matching rule; the earlier rule wins a priority tie
pub fn infer_role(rules: &[RoleRule], ctx: &RoleContext) -> Option<Role> {
    let mut best: Option<&RoleRule> = None;
    for rule in rules {
        if best.is_some_and(|b| b.priority >= rule.priority) {
            continue;
        }
        if (rule.predicate)(ctx) {
            best = Some(rule);
        }
    }
    best.map(|rule| rule.role)
}

/// Roles for every node some rule matches, in document order
pub fn infer_roles(tree: &DomTree, rules: &[RoleRule], section_scores: &[(u32, u32)]) -> Vec<NodeRole> {
    let scores: HashMap<u32, u32> = section_scores.iter().copied().collect();
    tree.iter()
        .filter_map(|node| {
            let ctx = RoleContext {
                node,
                section_score: scores.get(&node.document_order).copied().unwrap_or(0),
            };
            infer_role(rules, &ctx).map(|role| NodeRole {
                document_order: node.document_order,
                role,
            })
        })
        .collect()
}
