//! The live scene graph.
//!
//! An arena of [`SceneNode`]s addressed by [`NodeRef`]. Unlike the static
//! document, nodes can be swapped out and detached after construction, so
//! the stage can rebuild one layer without touching its siblings. Dropped
//! subtrees return their slots to a free list that later `create` calls
//! draw from, so a [`NodeRef`] into a dropped subtree is stale.

use std::collections::BTreeMap;

use lumen_render::{AttrValue, ElementKind, NodeBuilder, NodeRef};
use serde::Serialize;
use serde_json::Value;

/// A node in the scene.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Element kind, or [`ElementKind::TextNode`] for character data.
    pub kind: ElementKind,
    /// Attributes in insertion order.
    pub attrs: Vec<(String, AttrValue)>,
    /// Character data for text nodes.
    pub text: String,
    /// Containing node; `None` for the root and for detached nodes.
    pub parent: Option<NodeRef>,
    /// Children in paint order.
    pub children: Vec<NodeRef>,
}

/// A serializable copy of an attached subtree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSnapshot {
    /// Tag name, `#text` for text nodes.
    pub tag: String,
    /// Attributes; numbers stay numbers.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, Value>,
    /// Character data of text nodes.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Children in paint order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
}

/// Arena of scene nodes with a fixed root group.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    free: Vec<usize>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    const ROOT: NodeRef = NodeRef(0);

    /// A graph holding only the root group.
    #[must_use]
    pub fn new() -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            free: Vec::new(),
        };
        let _ = graph.create(ElementKind::Group);
        graph
    }

    /// The root group.
    #[must_use]
    pub const fn root(&self) -> NodeRef {
        Self::ROOT
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, node: NodeRef) -> Option<&SceneNode> {
        self.nodes.get(node.0)
    }

    /// The parent of a node.
    #[must_use]
    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.node(node).and_then(|n| n.parent)
    }

    /// Whether `node` is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, node: NodeRef) -> bool {
        let mut current = node;
        loop {
            if current == Self::ROOT {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Number of nodes reachable from the root, root included.
    #[must_use]
    pub fn attached_count(&self) -> usize {
        fn count(graph: &SceneGraph, node: NodeRef) -> usize {
            1 + graph
                .children(node)
                .iter()
                .map(|&child| count(graph, child))
                .sum::<usize>()
        }
        count(self, Self::ROOT)
    }

    /// Slots in the arena, free ones included.
    #[must_use]
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Put `new` where `old` is and drop `old`. Returns `false` when `old`
    /// has no parent.
    pub fn replace(&mut self, old: NodeRef, new: NodeRef) -> bool {
        let Some(parent) = self.parent(old) else {
            return false;
        };
        if new.0 >= self.nodes.len() || old == new {
            return false;
        }
        self.detach(new);
        let siblings = &mut self.nodes[parent.0].children;
        let Some(position) = siblings.iter().position(|&c| c == old) else {
            return false;
        };
        siblings[position] = new;
        self.nodes[old.0].parent = None;
        self.nodes[new.0].parent = Some(parent);
        self.release(old);
        true
    }

    /// Detach `node` from its parent and drop its subtree.
    pub fn remove(&mut self, node: NodeRef) -> bool {
        if self.parent(node).is_none() {
            return false;
        }
        self.detach(node);
        self.release(node);
        true
    }

    /// Return a detached subtree's slots to the free list.
    fn release(&mut self, node: NodeRef) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(slot) = self.nodes.get_mut(current.0) else {
                continue;
            };
            stack.extend(std::mem::take(&mut slot.children));
            slot.attrs.clear();
            slot.text.clear();
            slot.parent = None;
            self.free.push(current.0);
        }
    }

    fn detach(&mut self, node: NodeRef) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        self.nodes[parent.0].children.retain(|&c| c != node);
        self.nodes[node.0].parent = None;
    }

    /// Every attached descendant of `node` (pre-order, excluding `node`)
    /// carrying attribute `name`.
    #[must_use]
    pub fn find_with_attr(&self, node: NodeRef, name: &str) -> Vec<NodeRef> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeRef> = self.children(node).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if self.attr(current, name).is_some() {
                out.push(current);
            }
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Copy the subtree at `node`.
    #[must_use]
    pub fn snapshot(&self, node: NodeRef) -> Option<SceneSnapshot> {
        let n = self.node(node)?;
        let attrs = n
            .attrs
            .iter()
            .map(|(name, value)| {
                let json = match value {
                    AttrValue::Num(num) => serde_json::Number::from_f64(*num)
                        .map_or_else(|| Value::String(value.to_string()), Value::Number),
                    AttrValue::Str(s) => Value::String(s.clone()),
                };
                (name.clone(), json)
            })
            .collect();
        Some(SceneSnapshot {
            tag: n.kind.tag().to_string(),
            attrs,
            text: n.text.clone(),
            children: n
                .children
                .iter()
                .filter_map(|&child| self.snapshot(child))
                .collect(),
        })
    }
}

impl NodeBuilder for SceneGraph {
    fn create(&mut self, kind: ElementKind) -> NodeRef {
        let node = SceneNode {
            kind,
            attrs: Vec::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            self.nodes[index] = node;
            return NodeRef(index);
        }
        self.nodes.push(node);
        NodeRef(self.nodes.len() - 1)
    }

    fn create_text(&mut self, content: &str) -> NodeRef {
        let node = self.create(ElementKind::TextNode);
        self.nodes[node.0].text = content.to_string();
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
        for child in std::mem::take(&mut n.children) {
            self.nodes[child.0].parent = None;
            self.release(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_render::NodeBuilderExt;

    #[test]
    fn test_replace_keeps_position() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.child(root, ElementKind::Group, &[]);
        let b = graph.child(root, ElementKind::Group, &[]);
        let c = graph.child(root, ElementKind::Group, &[]);
        let fresh = graph.create(ElementKind::Rect);
        assert!(graph.replace(b, fresh));
        assert_eq!(graph.children(root), &[a, fresh, c]);
        assert!(!graph.is_attached(b));
        assert!(graph.is_attached(fresh));
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let group = graph.child(root, ElementKind::Group, &[]);
        let rect = graph.child(group, ElementKind::Rect, &[]);
        assert_eq!(graph.attached_count(), 3);
        assert!(graph.remove(group));
        assert!(!graph.remove(group));
        assert!(!graph.is_attached(rect));
        assert_eq!(graph.attached_count(), 1);
    }

    #[test]
    fn test_cleared_slots_are_reused() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let group = graph.child(root, ElementKind::Group, &[]);
        for i in 0..10 {
            graph.clear_children(group);
            let rect = graph.child(group, ElementKind::Rect, &[]);
            let _ = graph.child(rect, ElementKind::Circle, &[]);
            if i % 2 == 0 {
                graph.set(rect, "fill", "#ff0000");
            }
        }
        assert_eq!(graph.arena_len(), 4);
        assert_eq!(graph.attached_count(), 4);
        // Recycled slots start without the previous occupant's attributes.
        let rect = graph.children(group)[0];
        assert!(graph.attr(rect, "fill").is_none());
    }

    #[test]
    fn test_snapshot_keeps_numbers() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let rect = graph.child(root, ElementKind::Rect, &[("width", AttrValue::Num(40.0))]);
        graph.set(rect, "fill", "#ff0000");
        let snapshot = graph.snapshot(root).unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["children"][0]["tag"], "rect");
        assert_eq!(json["children"][0]["attrs"]["width"], 40.0);
        assert_eq!(json["children"][0]["attrs"]["fill"], "#ff0000");
    }
}
