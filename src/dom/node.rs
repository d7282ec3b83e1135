use crate::css::ResolvedCss;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Where an image record was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    Img,
    Srcset,
    Background,
}

/// An image referenced by the page, with its URL resolved against the page URL
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub src: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,

    pub source: ImageSource,

    /// Order of the owning node when the image sits in the extracted tree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_order: Option<u32>,
}

impl ImageRecord {
    pub fn new(src: impl Into<String>, source: ImageSource) -> Self {
        Self {
            src: src.into(),
            alt: None,
            width: None,
            height: None,
            source,
            document_order: None,
        }
    }

    /// Builder method: set alt text (blank alt is treated as missing)
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        let alt = alt.into();
        self.alt = if alt.trim().is_empty() { None } else { Some(alt.trim().to_string()) };
        self
    }

    pub fn has_alt(&self) -> bool {
        self.alt.is_some()
    }
}

/// One element of the extracted page tree
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomNode {
    /// Lower-case tag name
    pub tag: String,

    /// Pre-order index, unique across the whole tree
    pub document_order: u32,

    /// Distance from the root level (roots are depth 0)
    pub depth: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    /// Layout-relevant attributes (href, src, role, aria-label, ...)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub resolved_css: ResolvedCss,

    /// Text of direct text children only, whitespace-collapsed
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub direct_text: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub direct_images: Vec<ImageRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DomNode>,

    pub is_container: bool,
}

impl DomNode {
    /// Create a new DomNode
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Default::default()
        }
    }

    /// Builder method: set document order and depth
    pub fn at(mut self, document_order: u32, depth: u32) -> Self {
        self.document_order = document_order;
        self.depth = depth;
        self
    }

    /// Builder method: set class attribute
    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Builder method: set a resolved CSS property
    pub fn with_css(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.resolved_css.insert(property.into(), value.into());
        self
    }

    /// Builder method: set direct text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.direct_text = text.into();
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<DomNode>) -> Self {
        self.children = children;
        self.is_container = !self.children.is_empty();
        self
    }

    /// Add a child node
    pub fn add_child(&mut self, child: DomNode) {
        self.children.push(child);
        self.is_container = true;
    }

    /// Add a single attribute
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn get_attribute(&self, key: &str) -> Option<&String> {
        self.attributes.get(key)
    }

    /// Resolved CSS value of a property
    pub fn css(&self, property: &str) -> Option<&str> {
        self.resolved_css.get(property).map(String::as_str)
    }

    /// Check if element has a specific class
    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes().any(|c| c.eq_ignore_ascii_case(class_name))
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.class_name.as_deref().unwrap_or_default().split_whitespace()
    }

    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// This node and all descendants in pre-order
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Number of nodes in this subtree
    pub fn count_nodes(&self) -> usize {
        self.pre_order().count()
    }
}

/// Pre-order traversal over a forest with an explicit stack
pub struct PreOrder<'a> {
    stack: Vec<&'a DomNode>,
}

impl<'a> PreOrder<'a> {
    pub fn over(roots: &'a [DomNode]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a DomNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Visit every node of a forest mutably, parents before children
pub fn for_each_node_mut(roots: &mut [DomNode], mut visit: impl FnMut(&mut DomNode)) {
    let mut stack: Vec<&mut DomNode> = roots.iter_mut().rev().collect();
    while let Some(node) = stack.pop() {
        visit(node);
        stack.extend(node.children.iter_mut().rev());
    }
}
