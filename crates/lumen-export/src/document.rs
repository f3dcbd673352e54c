//! Arena-backed SVG document.
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeRef`]
//! index, so renderers can hold handles across calls without borrowing the
//! document. The `<svg>` root is always node 0 and its first child is the
//! shared `<defs>` section.

use lumen_render::{AttrValue, ElementKind, NodeBuilder, NodeRef};

/// SVG namespace.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// XLink namespace, declared for imported documents that still use
/// `xlink:href`.
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// A node in the document arena.
#[derive(Debug, Clone)]
pub struct DocumentNode {
    /// Element kind, or [`ElementKind::TextNode`] for character data.
    pub kind: ElementKind,
    /// Attributes in insertion order.
    pub attrs: Vec<(String, AttrValue)>,
    /// Character data for text nodes.
    pub text: String,
    /// Containing node; `None` for the root and for detached nodes.
    pub parent: Option<NodeRef>,
    /// Children in document order.
    pub children: Vec<NodeRef>,
}

impl DocumentNode {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attrs: Vec::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// An SVG document under construction.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    nodes: Vec<DocumentNode>,
}

impl SvgDocument {
    const ROOT: NodeRef = NodeRef(0);
    const DEFS: NodeRef = NodeRef(1);

    /// A document of the given size with `viewBox="0 0 width height"` and an
    /// empty `<defs>`.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        let mut doc = Self { nodes: Vec::new() };
        let root = doc.create(ElementKind::Foreign("svg".to_string()));
        doc.set_attr(root, "xmlns", AttrValue::from(SVG_NS));
        doc.set_attr(root, "xmlns:xlink", AttrValue::from(XLINK_NS));
        doc.set_attr(root, "width", AttrValue::Num(width));
        doc.set_attr(root, "height", AttrValue::Num(height));
        doc.set_attr(
            root,
            "viewBox",
            AttrValue::Str(format!(
                "0 0 {} {}",
                AttrValue::Num(width),
                AttrValue::Num(height)
            )),
        );
        let defs = doc.create(ElementKind::Defs);
        doc.append(root, defs);
        doc
    }

    /// The `<svg>` element.
    #[must_use]
    pub const fn root(&self) -> NodeRef {
        Self::ROOT
    }

    /// The shared `<defs>` element.
    #[must_use]
    pub const fn defs(&self) -> NodeRef {
        Self::DEFS
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, node: NodeRef) -> Option<&DocumentNode> {
        self.nodes.get(node.0)
    }

    /// The parent of a node.
    #[must_use]
    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.node(node).and_then(|n| n.parent)
    }

    /// Number of nodes ever created, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true: the root and `<defs>` always exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn detach(&mut self, node: NodeRef) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.retain(|&c| c != node);
        }
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.parent = None;
        }
    }

    /// Serialize the attached tree, starting at the root.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_node(&mut out, Self::ROOT);
        out
    }

    fn write_node(&self, out: &mut String, node: NodeRef) {
        let Some(n) = self.node(node) else {
            return;
        };
        if n.kind == ElementKind::TextNode {
            out.push_str(&escape_text(&n.text));
            return;
        }
        let tag = n.kind.tag();
        out.push('<');
        out.push_str(tag);
        for (name, value) in &n.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(&value.to_string()));
            out.push('"');
        }
        if n.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for &child in &n.children {
            self.write_node(out, child);
        }
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}

impl NodeBuilder for SvgDocument {
    fn create(&mut self, kind: ElementKind) -> NodeRef {
        self.nodes.push(DocumentNode::new(kind));
        NodeRef(self.nodes.len() - 1)
    }

    fn create_text(&mut self, content: &str) -> NodeRef {
        let node = self.create(ElementKind::TextNode);
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.text = content.to_string();
        }
        node
    }

    fn set_attr(&mut self, node: NodeRef, name: &str, value: AttrValue) {
        let Some(n) = self.nodes.get_mut(node.0) else {
            return;
        };
        match n.attrs.iter_mut().find(|(existing, _)| existing == name) {
            Some(slot) => slot.1 = value,
            None => n.attrs.push((name.to_string(), value)),
        }
    }

    fn remove_attr(&mut self, node: NodeRef, name: &str) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.attrs.retain(|(existing, _)| existing != name);
        }
    }

    fn attr(&self, node: NodeRef, name: &str) -> Option<&AttrValue> {
        self.node(node)?
            .attrs
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    fn append(&mut self, parent: NodeRef, child: NodeRef) {
        if parent == child || parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() {
            return;
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn children(&self, node: NodeRef) -> &[NodeRef] {
        match self.node(node) {
            Some(n) => &n.children,
            None => &[],
        }
    }

    fn kind(&self, node: NodeRef) -> Option<&ElementKind> {
        self.node(node).map(|n| &n.kind)
    }

    fn clear_children(&mut self, node: NodeRef) {
        let Some(n) = self.nodes.get_mut(node.0) else {
            return;
        };
        let children = std::mem::take(&mut n.children);
        for child in children {
            if let Some(c) = self.nodes.get_mut(child.0) {
                c.parent = None;
            }
        }
    }
}

/// Escape text for an attribute value in double quotes.
#[must_use]
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape character data.
#[must_use]
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
