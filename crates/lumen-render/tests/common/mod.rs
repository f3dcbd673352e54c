//! A minimal in-memory builder for exercising renderers without a target.

#![allow(dead_code)]

use lumen_model::{Design, Layer};
use lumen_render::{
    AttrValue, BlockingContent, ElementKind, NodeBuilder, NodeRef, RenderContext, RenderOptions,
    RenderedLayer, RendererRegistry, ResourceCollection,
};
use lumen_common::FetchOptions;

#[derive(Debug)]
pub struct Node {
    pub kind: ElementKind,
    pub attrs: Vec<(String, AttrValue)>,
    pub children: Vec<NodeRef>,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn root(&mut self) -> NodeRef {
        self.create(ElementKind::Group)
    }

    pub fn tag(&self, node: NodeRef) -> &str {
        self.nodes[node.0].kind.tag()
    }

    pub fn attr_str(&self, node: NodeRef, name: &str) -> Option<String> {
        self.attr(node, name).map(ToString::to_string)
    }

    pub fn attr_num(&self, node: NodeRef, name: &str) -> Option<f64> {
        self.attr(node, name).and_then(AttrValue::as_f64)
    }

    /// Concatenated text below `node`.
    pub fn text_content(&self, node: NodeRef) -> String {
        let mut out = self.nodes[node.0].text.clone();
        for child in &self.nodes[node.0].children {
            out.push_str(&self.text_content(*child));
        }
        out
    }

    /// Every descendant (pre-order, excluding `node`) with the given tag.
    pub fn find_all(&self, node: NodeRef, tag: &str) -> Vec<NodeRef> {
        let mut out = Vec::new();
        for child in &self.nodes[node.0].children {
            if self.tag(*child) == tag {
                out.push(*child);
            }
            out.extend(self.find_all(*child, tag));
        }
        out
    }

    /// First descendant carrying `name`.
    pub fn find_with_attr(&self, node: NodeRef, name: &str) -> Option<NodeRef> {
        for child in &self.nodes[node.0].children {
            if self.attr(*child, name).is_some() {
                return Some(*child);
            }
            if let Some(found) = self.find_with_attr(*child, name) {
                return Some(found);
            }
        }
        None
    }
}

impl NodeBuilder for Tree {
    fn create(&mut self, kind: ElementKind) -> NodeRef {
        self.nodes.push(Node {
            kind,
            attrs: Vec::new(),
            children: Vec::new(),
            text: String::new(),
        });
        NodeRef(self.nodes.len() - 1)
    }

    fn create_text(&mut self, content: &str) -> NodeRef {
        let node = self.create(ElementKind::TextNode);
        self.nodes[node.0].text = content.to_string();
        node
    }

    fn set_attr(&mut self, node: NodeRef, name: &str, value: AttrValue) {
        let attrs = &mut self.nodes[node.0].attrs;
        match attrs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => attrs.push((name.to_string(), value)),
        }
    }

    fn remove_attr(&mut self, node: NodeRef, name: &str) {
        self.nodes[node.0].attrs.retain(|(n, _)| n != name);
    }

    fn attr(&self, node: NodeRef, name: &str) -> Option<&AttrValue> {
        self.nodes[node.0]
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    fn append(&mut self, parent: NodeRef, child: NodeRef) {
        self.nodes[parent.0].children.push(child);
    }

    fn children(&self, node: NodeRef) -> &[NodeRef] {
        &self.nodes[node.0].children
    }

    fn kind(&self, node: NodeRef) -> Option<&ElementKind> {
        self.nodes.get(node.0).map(|n| &n.kind)
    }

    fn clear_children(&mut self, node: NodeRef) {
        self.nodes[node.0].children.clear();
    }
}

pub struct Rendered {
    pub tree: Tree,
    pub root: NodeRef,
    pub resources: ResourceCollection,
    pub records: Vec<RenderedLayer>,
}

impl Rendered {
    pub fn wrapper(&self, layer_id: &str) -> NodeRef {
        self.record(layer_id).wrapper
    }

    pub fn content(&self, layer_id: &str) -> NodeRef {
        self.record(layer_id).content
    }

    pub fn record(&self, layer_id: &str) -> &RenderedLayer {
        self.records
            .iter()
            .find(|r| r.layer_id == layer_id)
            .unwrap_or_else(|| panic!("layer {layer_id} was not rendered"))
    }
}

pub fn offline() -> FetchOptions {
    FetchOptions {
        allow_remote: false,
        ..FetchOptions::default()
    }
}

pub fn render_layers(layers: &[Layer]) -> Rendered {
    let registry = RendererRegistry::with_defaults();
    let content = BlockingContent::new(offline());
    let mut resources = ResourceCollection::new();
    let mut tree = Tree::default();
    let root = tree.root();
    let mut cx = RenderContext::new(&registry, &mut resources, &content, RenderOptions::default());
    cx.render_children(&mut tree, root, layers);
    let records = cx.finish();
    Rendered {
        tree,
        root,
        resources,
        records,
    }
}

pub fn render_json(json: &str) -> Rendered {
    let design = Design::from_json(json).expect("valid design json");
    render_layers(&design.layers)
}
