//! Page IR
//!
//! The bounded description of a page handed to the interpretation step. Field
//! names are part of the contract with downstream prompt builders and must not
//! change.

pub mod assemble;

pub use assemble::IrAssembler;

use serde::{Deserialize, Serialize};

use crate::analysis::StructuralAnalysis;
use crate::budget::CssValueDictionary;
use crate::css::{ColorUsage, CssInfo};
use crate::dom::{
    Cta, DomNode, FooterInfo, FormInfo, ImageRecord, Navigation, PageMetadata, PreOrder, SocialLink,
};
use crate::error::Result;
use crate::normalize::{Embed, FontDeclaration};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageIr {
    pub tree: Vec<DomNode>,

    /// Nodes in `tree`
    pub total_nodes: usize,

    pub navigation: Navigation,

    pub forms: Vec<FormInfo>,

    pub images: Vec<ImageRecord>,

    pub colors: Vec<ColorUsage>,

    pub fonts: Vec<FontDeclaration>,

    pub ctas: Vec<Cta>,

    pub footer: Option<FooterInfo>,

    pub social_links: Vec<SocialLink>,

    pub embeds: Vec<Embed>,

    pub metadata: PageMetadata,

    pub language: Option<String>,

    pub css_info: CssInfo,

    /// Present when CSS value compression was applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_value_dictionary: Option<CssValueDictionary>,

    pub structural: StructuralAnalysis,
}

impl PageIr {
    /// All tree nodes in pre-order
    pub fn nodes(&self) -> PreOrder<'_> {
        PreOrder::over(&self.tree)
    }

    pub fn find_node(&self, document_order: u32) -> Option<&DomNode> {
        self.nodes().find(|n| n.document_order == document_order)
    }

    /// Compact JSON, the form sent to the interpreter
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
