//! The node builder abstraction.
//!
//! Type renderers never touch an output format directly. They create nodes,
//! set attributes, and append children through [`NodeBuilder`], which the
//! static SVG document and the interactive scene graph both implement.

use std::fmt;

use crate::geometry::fmt_num;

/// Handle to a node owned by a builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(pub usize);

/// Element kinds the renderers produce. Imported vector documents may carry
/// any other tag as [`ElementKind::Foreign`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `<g>`
    Group,
    /// `<rect>`
    Rect,
    /// `<circle>`
    Circle,
    /// `<ellipse>`
    Ellipse,
    /// `<line>`
    Line,
    /// `<polygon>`
    Polygon,
    /// `<polyline>`
    Polyline,
    /// `<path>`
    Path,
    /// `<text>`
    Text,
    /// `<tspan>`
    TSpan,
    /// `<image>`
    Image,
    /// `<defs>`
    Defs,
    /// `<linearGradient>`
    LinearGradient,
    /// `<radialGradient>`
    RadialGradient,
    /// `<stop>`
    Stop,
    /// `<pattern>`
    Pattern,
    /// `<clipPath>`
    ClipPath,
    /// `<mask>`
    Mask,
    /// `<filter>`
    Filter,
    /// A filter primitive such as `feGaussianBlur`.
    Primitive(&'static str),
    /// Character data.
    TextNode,
    /// Any other element, by tag name.
    Foreign(String),
}

impl ElementKind {
    /// The tag name. Text nodes have none and report `#text`.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Group => "g",
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
            Self::Line => "line",
            Self::Polygon => "polygon",
            Self::Polyline => "polyline",
            Self::Path => "path",
            Self::Text => "text",
            Self::TSpan => "tspan",
            Self::Image => "image",
            Self::Defs => "defs",
            Self::LinearGradient => "linearGradient",
            Self::RadialGradient => "radialGradient",
            Self::Stop => "stop",
            Self::Pattern => "pattern",
            Self::ClipPath => "clipPath",
            Self::Mask => "mask",
            Self::Filter => "filter",
            Self::Primitive(tag) => *tag,
            Self::TextNode => "#text",
            Self::Foreign(tag) => tag.as_str(),
        }
    }

    /// Map a tag name back to a kind.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "g" => Self::Group,
            "rect" => Self::Rect,
            "circle" => Self::Circle,
            "ellipse" => Self::Ellipse,
            "line" => Self::Line,
            "polygon" => Self::Polygon,
            "polyline" => Self::Polyline,
            "path" => Self::Path,
            "text" => Self::Text,
            "tspan" => Self::TSpan,
            "image" => Self::Image,
            "defs" => Self::Defs,
            "linearGradient" => Self::LinearGradient,
            "radialGradient" => Self::RadialGradient,
            "stop" => Self::Stop,
            "pattern" => Self::Pattern,
            "clipPath" => Self::ClipPath,
            "mask" => Self::Mask,
            "filter" => Self::Filter,
            other => Self::Foreign(other.to_string()),
        }
    }
}

/// An attribute value. Numbers are kept as numbers so the scene graph can
/// read geometry back without parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Literal text.
    Str(String),
    /// A number, formatted compactly on output.
    Num(f64),
}

impl AttrValue {
    /// The numeric value, parsing text if needed.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Str(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Num(n) => f.write_str(&fmt_num(*n)),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Num(value)
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        Self::Num(f64::from(value))
    }
}

/// Tree construction interface shared by both render targets.
pub trait NodeBuilder {
    /// Create a detached element.
    fn create(&mut self, kind: ElementKind) -> NodeRef;

    /// Create a detached text node.
    fn create_text(&mut self, content: &str) -> NodeRef;

    /// Set (or replace) an attribute.
    fn set_attr(&mut self, node: NodeRef, name: &str, value: AttrValue);

    /// Remove an attribute if present.
    fn remove_attr(&mut self, node: NodeRef, name: &str);

    /// Read an attribute.
    fn attr(&self, node: NodeRef, name: &str) -> Option<&AttrValue>;

    /// Append `child` as the last child of `parent`.
    fn append(&mut self, parent: NodeRef, child: NodeRef);

    /// The children of a node, in order.
    fn children(&self, node: NodeRef) -> &[NodeRef];

    /// The kind of a node.
    fn kind(&self, node: NodeRef) -> Option<&ElementKind>;

    /// Detach and drop every child of `node`.
    fn clear_children(&mut self, node: NodeRef);

    /// Replace the content of `node` with a single text node.
    fn set_text(&mut self, node: NodeRef, content: &str) {
        self.clear_children(node);
        let text = self.create_text(content);
        self.append(node, text);
    }
}

/// Generic conveniences over any [`NodeBuilder`], including trait objects.
pub trait NodeBuilderExt: NodeBuilder {
    /// Set an attribute from anything convertible to [`AttrValue`].
    fn set<V: Into<AttrValue>>(&mut self, node: NodeRef, name: &str, value: V) {
        self.set_attr(node, name, value.into());
    }

    /// Create an element, set attributes, and append it to `parent`.
    fn child(
        &mut self,
        parent: NodeRef,
        kind: ElementKind,
        attrs: &[(&str, AttrValue)],
    ) -> NodeRef {
        let node = self.create(kind);
        for (name, value) in attrs {
            self.set_attr(node, name, value.clone());
        }
        self.append(parent, node);
        node
    }
}

impl<B: NodeBuilder + ?Sized> NodeBuilderExt for B {}
