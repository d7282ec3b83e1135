use crate::config::AnalyzerOptions;
use crate::css::{resolve_css, CssClassDictionary, ResolvedCss};
use crate::dom::images::image_from_element;
use crate::dom::node::{DomNode, PreOrder};
use crate::utils::collapse_whitespace;
use indexmap::IndexMap;
use scraper::{ElementRef, Html, Node, Selector};
use serde::Serialize;
use std::sync::LazyLock;
use url::Url;

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("BODY_SELECTOR: hardcoded selector is valid"));

/// Attributes carried on nodes; everything else is dropped from the tree
const KEPT_ATTRIBUTES: &[&str] = &[
    "href", "src", "alt", "title", "role", "type", "name", "placeholder", "action", "method",
    "target", "aria-label", "for", "value",
];

/// Tags that never become tree nodes
const SKIPPED_TAGS: &[&str] = &["img", "br", "wbr", "script", "style", "noscript", "template"];

/// Breadth and depth caps for extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractLimits {
    pub max_root_nodes: usize,
    pub max_depth: usize,
}

impl From<&AnalyzerOptions> for ExtractLimits {
    fn from(options: &AnalyzerOptions) -> Self {
        Self {
            max_root_nodes: options.max_root_nodes,
            max_depth: options.max_depth,
        }
    }
}

/// The extracted page tree
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomTree {
    /// Top-level elements of `<body>` in document order
    pub roots: Vec<DomNode>,

    /// Resolved CSS of `<body>`, the parent of every root node
    pub body_css: ResolvedCss,

    /// True when the breadth or depth cap dropped elements
    pub truncated: bool,
}

/// Arena slot used while walking the document
struct Slot {
    node: DomNode,
    parent: Option<usize>,
}

/// Pending element on the work stack
struct Pending<'a> {
    element: ElementRef<'a>,
    depth: usize,
    parent: Option<usize>,
}

impl DomTree {
    /// Create a tree from already-built roots
    pub fn new(roots: Vec<DomNode>) -> Self {
        Self {
            roots,
            ..Default::default()
        }
    }

    /// Walk cleaned markup into a depth- and breadth-bounded tree.
    ///
    /// Traversal uses an explicit work stack and an arena, so adversarially deep
    /// documents cannot exhaust the call stack. Nodes at `max_depth` are kept as
    /// leaves. The order counter is local to this call.
    pub fn extract(cleaned_html: &str, css: &CssClassDictionary, base: &Url, limits: ExtractLimits) -> Self {
        let document = Html::parse_document(cleaned_html);
        let body = document
            .select(&BODY_SELECTOR)
            .next()
            .unwrap_or_else(|| document.root_element());

        let body_css = resolve_css(
            body.value().classes(),
            css,
            body.value().attr("style"),
        );

        let mut truncated = false;
        let roots: Vec<ElementRef> = tree_children(body).collect();
        if roots.len() > limits.max_root_nodes {
            log::debug!(
                "Root breadth {} exceeds cap {}, truncating",
                roots.len(),
                limits.max_root_nodes
            );
            truncated = true;
        }

        let mut stack: Vec<Pending> = roots
            .into_iter()
            .take(limits.max_root_nodes)
            .rev()
            .map(|element| Pending { element, depth: 0, parent: None })
            .collect();

        let mut arena: Vec<Slot> = Vec::new();
        let mut next_order: u32 = 0;

        while let Some(Pending { element, depth, parent }) = stack.pop() {
            let node = build_node(element, next_order, depth, css, base);
            next_order += 1;

            let index = arena.len();
            arena.push(Slot { node, parent });

            if depth >= limits.max_depth {
                if tree_children(element).next().is_some() {
                    truncated = true;
                }
                continue;
            }

            let children: Vec<ElementRef> = tree_children(element).collect();
            stack.extend(children.into_iter().rev().map(|element| Pending {
                element,
                depth: depth + 1,
                parent: Some(index),
            }));
        }

        Self {
            roots: fold_arena(arena),
            body_css,
            truncated,
        }
    }

    /// All nodes in pre-order
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder::over(&self.roots)
    }

    pub fn count_nodes(&self) -> usize {
        self.iter().count()
    }

    /// Deepest node depth plus one (0 for an empty tree)
    pub fn max_depth(&self) -> usize {
        self.iter().map(|n| n.depth as usize + 1).max().unwrap_or(0)
    }

    pub fn find_by_order(&self, document_order: u32) -> Option<&DomNode> {
        self.iter().find(|n| n.document_order == document_order)
    }

    /// Convert the tree to JSON
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(&self.roots)?)
    }
}

/// Element children that become tree nodes
fn tree_children<'a>(element: ElementRef<'a>) -> impl DoubleEndedIterator<Item = ElementRef<'a>> + 'a {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| !SKIPPED_TAGS.contains(&child.value().name()))
        .collect::<Vec<_>>()
        .into_iter()
}

fn build_node(element: ElementRef, document_order: u32, depth: usize, css: &CssClassDictionary, base: &Url) -> DomNode {
    let el = element.value();

    let class_name = el
        .attr("class")
        .map(collapse_whitespace)
        .filter(|c| !c.is_empty());

    let attributes: IndexMap<String, String> = KEPT_ATTRIBUTES
        .iter()
        .filter_map(|&name| el.attr(name).map(|v| (name.to_string(), v.trim().to_string())))
        .collect();

    let mut text = String::new();
    let mut direct_images = Vec::new();
    for child in element.children() {
        match child.value() {
            Node::Text(t) => {
                text.push(' ');
                text.push_str(t);
            }
            Node::Element(child_el) if child_el.name() == "img" => {
                if let Some(mut image) = ElementRef::wrap(child).and_then(|img| image_from_element(img, base)) {
                    image.document_order = Some(document_order);
                    direct_images.push(image);
                }
            }
            _ => {}
        }
    }

    DomNode {
        tag: el.name().to_ascii_lowercase(),
        document_order,
        depth: depth as u32,
        id: el.attr("id").map(str::to_string).filter(|id| !id.is_empty()),
        class_name,
        attributes,
        resolved_css: resolve_css(el.classes(), css, el.attr("style")),
        direct_text: collapse_whitespace(&text),
        direct_images,
        children: Vec::new(),
        is_container: false,
    }
}

/// Fold the pre-order arena into nested nodes without recursion.
///
/// Children always sit after their parent in the arena, so walking it backwards
/// completes every child list before its parent is moved.
fn fold_arena(mut arena: Vec<Slot>) -> Vec<DomNode> {
    let mut roots = Vec::new();
    while let Some(Slot { mut node, parent }) = arena.pop() {
        // Children were appended last-first
        node.children.reverse();
        node.is_container = !node.children.is_empty();
        match parent {
            Some(p) => arena[p].node.children.push(node),
            None => roots.push(node),
        }
    }
    roots.reverse();
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    fn limits() -> ExtractLimits {
        ExtractLimits { max_root_nodes: 50, max_depth: 10 }
    }

    #[test]
    fn test_extract_structure_and_order() {
        let html = r#"<html><body>
            <header class="top"><nav><a href="/a">A</a><a href="/b">B</a></nav></header>
            <main><h1>Title</h1><p>Hello <b>big</b> world</p></main>
        </body></html>"#;
        let tree = DomTree::extract(html, &CssClassDictionary::new(), &base(), limits());

        assert_eq!(tree.roots.len(), 2);
        assert_eq!(tree.roots[0].tag, "header");
        assert_eq!(tree.roots[0].class_name.as_deref(), Some("top"));

        let tags: Vec<&str> = tree.iter().map(|n| n.tag.as_str()).collect();
        assert_eq!(tags, vec!["header", "nav", "a", "a", "main", "h1", "p", "b"]);

        let orders: Vec<u32> = tree.iter().map(|n| n.document_order).collect();
        assert_eq!(orders, (0..8).collect::<Vec<u32>>());

        let p = tree.iter().find(|n| n.tag == "p").unwrap();
        assert_eq!(p.direct_text, "Hello world");
        assert_eq!(p.depth, 1);
        assert!(p.is_container);
        assert_eq!(tree.roots[0].children[0].children[0].get_attribute("href"), Some(&"/a".to_string()));
    }

    #[test]
    fn test_child_depth_is_parent_plus_one() {
        let html = "<body><div><section><article><p>x</p></article></section></div></body>";
        let tree = DomTree::extract(html, &CssClassDictionary::new(), &base(), limits());
        for node in tree.iter() {
            for child in &node.children {
                assert_eq!(child.depth, node.depth + 1);
            }
        }
        assert_eq!(tree.max_depth(), 4);
    }

    #[test]
    fn test_depth_cap_keeps_leaf() {
        let mut html = String::from("<body>");
        for _ in 0..500 {
            html.push_str("<div>");
        }
        html.push_str("deep");
        for _ in 0..500 {
            html.push_str("</div>");
        }
        html.push_str("</body>");

        let tree = DomTree::extract(&html, &CssClassDictionary::new(), &base(), ExtractLimits { max_root_nodes: 10, max_depth: 3 });
        assert_eq!(tree.count_nodes(), 4);
        assert!(tree.truncated);
        let leaf = tree.iter().last().unwrap();
        assert_eq!(leaf.depth, 3);
        assert!(!leaf.is_container);
    }

    #[test]
    fn test_root_breadth_cap() {
        let html = "<body><p>1</p><p>2</p><p>3</p><p>4</p></body>";
        let tree = DomTree::extract(html, &CssClassDictionary::new(), &base(), ExtractLimits { max_root_nodes: 2, max_depth: 5 });
        assert_eq!(tree.roots.len(), 2);
        assert_eq!(tree.roots[1].direct_text, "2");
        assert!(tree.truncated);
    }

    #[test]
    fn test_resolved_css_and_body_css() {
        let css = CssClassDictionary::parse(".page { background-color: white } .hero { display: flex; color: red }");
        let html = r#"<body class="page"><section class="hero" style="color: blue">Hi</section></body>"#;
        let tree = DomTree::extract(html, &css, &base(), limits());

        assert_eq!(tree.body_css.get("background-color"), Some(&"white".to_string()));
        let hero = &tree.roots[0];
        assert_eq!(hero.css("display"), Some("flex"));
        assert_eq!(hero.css("color"), Some("blue"));
    }

    #[test]
    fn test_direct_images_resolved() {
        let html = r#"<body><figure><img src="//cdn.example.com/a.png" alt="A"><img data-src="/lazy.png"><img src="data:image/png;base64,AA"><figcaption>Cap</figcaption></figure></body>"#;
        let tree = DomTree::extract(html, &CssClassDictionary::new(), &base(), limits());

        let figure = &tree.roots[0];
        assert_eq!(figure.children.len(), 1);
        assert_eq!(figure.direct_images.len(), 2);
        assert_eq!(figure.direct_images[0].src, "https://cdn.example.com/a.png");
        assert_eq!(figure.direct_images[0].alt.as_deref(), Some("A"));
        assert_eq!(figure.direct_images[0].document_order, Some(0));
        assert_eq!(figure.direct_images[1].src, "https://example.com/lazy.png");
    }

    #[test]
    fn test_to_json() {
        let tree = DomTree::extract("<body><div id=\"container\"><span>Hello</span></div></body>", &CssClassDictionary::new(), &base(), limits());
        let json = tree.to_json().unwrap();
        assert!(json.contains("\"id\": \"container\""));
        assert!(json.contains("Hello"));
        assert_eq!(tree.find_by_order(1).map(|n| n.tag.as_str()), Some("span"));
    }
}
