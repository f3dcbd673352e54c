//! Foreign SVG documents: parsing, sanitizing, projection, and import.

use lumen_common::warning::warn_once;
use lumen_style::{ElementStyle, StyleOverrides};
use serde::Serialize;

use crate::builder::{AttrValue, ElementKind, NodeBuilder, NodeBuilderExt, NodeRef};
use crate::geometry::fmt_num;
use crate::loader::LoadError;
use crate::stylesheet::{StyleSheet, declarations};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Elements that never leave the parser.
const DROPPED_ELEMENTS: [&str; 2] = ["script", "foreignObject"];

/// The element whose rules are folded into inline `style` attributes.
const STYLE_ELEMENT: &str = "style";

/// Elements that receive fill/stroke overrides.
pub const PAINTABLE: [&str; 11] = [
    "path", "rect", "circle", "ellipse", "polygon", "polyline", "line", "text", "tspan", "g",
    "use",
];

/// Root attributes that describe the viewport rather than presentation.
const VIEWPORT_ATTRS: [&str; 8] = [
    "width",
    "height",
    "viewBox",
    "x",
    "y",
    "preserveAspectRatio",
    "version",
    "id",
];

/// The document coordinate system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    /// Minimum x.
    pub min_x: f64,
    /// Minimum y.
    pub min_y: f64,
    /// Width (positive).
    pub width: f64,
    /// Height (positive).
    pub height: f64,
}

impl ViewBox {
    /// Uniform scale and offset mapping this box into a `w × h` target,
    /// centered: `(scale, tx, ty)`.
    #[must_use]
    pub fn fit(&self, w: f64, h: f64) -> (f64, f64, f64) {
        let scale = (w / self.width).min(h / self.height);
        let tx = (w - self.width * scale) / 2.0 - self.min_x * scale;
        let ty = (h - self.height * scale) / 2.0 - self.min_y * scale;
        (scale, tx, ty)
    }
}

/// A sanitized element or text run.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorNode {
    /// Element.
    Element(VectorElement),
    /// Character data.
    Text(String),
}

/// A sanitized element.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorElement {
    /// Local tag name.
    pub tag: String,
    /// Attributes in document order (`xlink:` / `xml:` prefixes kept).
    pub attrs: Vec<(String, String)>,
    /// Children.
    pub children: Vec<VectorNode>,
}

impl VectorElement {
    /// Look up an attribute.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Presentation property as rendered: the last inline `style`
    /// declaration, else the attribute.
    #[must_use]
    pub fn presentation(&self, name: &str) -> Option<String> {
        let styled = self.attr("style").and_then(|style| {
            declarations(style)
                .filter(|(prop, _)| prop.eq_ignore_ascii_case(name))
                .last()
                .map(|(_, value)| value.to_string())
        });
        styled.or_else(|| self.attr(name).map(|value| value.trim().to_string()))
    }

    /// Class names.
    #[must_use]
    pub fn classes(&self) -> Vec<&str> {
        self.attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// A parsed, sanitized SVG document.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDocument {
    /// Coordinate system.
    pub view_box: ViewBox,
    /// Presentation attributes of the root `<svg>`.
    pub root_attrs: Vec<(String, String)>,
    /// Top-level content.
    pub children: Vec<VectorNode>,
}

/// One entry of the element projection offered to property panels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    /// Tag name.
    #[serde(rename = "type")]
    pub element_type: String,
    /// `id` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// `class` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Fill as authored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_fill: Option<String>,
    /// Stroke as authored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_stroke: Option<String>,
    /// Stroke width as authored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_stroke_width: Option<String>,
}

fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let value = value.strip_suffix("px").unwrap_or(value);
    value.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

fn parse_view_box(value: &str) -> Option<ViewBox> {
    let numbers: Vec<f64> = value
        .split(|c: char| c == ',' || c.is_ascii_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    let [min_x, min_y, width, height] = numbers.as_slice() else {
        return None;
    };
    (width.is_finite() && height.is_finite() && *width > 0.0 && *height > 0.0).then_some(ViewBox {
        min_x: *min_x,
        min_y: *min_y,
        width: *width,
        height: *height,
    })
}

fn qualified_name(attr: &roxmltree::Attribute<'_, '_>) -> Option<String> {
    match attr.namespace() {
        None => Some(attr.name().to_string()),
        Some(XLINK_NS) => Some(format!("xlink:{}", attr.name())),
        Some(XML_NS) => Some(format!("xml:{}", attr.name())),
        Some(SVG_NS) => Some(attr.name().to_string()),
        Some(_) => None,
    }
}

fn is_unsafe_attr(name: &str, value: &str) -> bool {
    if name.len() > 2 && name.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("on")) {
        return true;
    }
    (name == "href" || name == "xlink:href")
        && value.trim_start().to_ascii_lowercase().starts_with("javascript:")
}

/// Attributes that survive sanitizing, with `style` replaced by its
/// cascaded value when a sheet rule matches.
fn element_attrs(node: roxmltree::Node<'_, '_>, sheet: &StyleSheet) -> Vec<(String, String)> {
    let mut attrs: Vec<(String, String)> = node
        .attributes()
        .filter_map(|attr| {
            let qualified = qualified_name(&attr)?;
            let safe = !is_unsafe_attr(&qualified, attr.value());
            safe.then(|| (qualified, attr.value().to_string()))
        })
        .collect();
    if sheet.is_empty() {
        return attrs;
    }
    let find = |name: &str| {
        attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    };
    let classes: Vec<&str> = find("class")
        .map(|c| c.split_whitespace().collect())
        .unwrap_or_default();
    let Some(style) =
        sheet.inline_style(node.tag_name().name(), find("id"), &classes, find("style"))
    else {
        return attrs;
    };
    match attrs.iter_mut().find(|(n, _)| n == "style") {
        Some(slot) => slot.1 = style,
        None => attrs.push(("style".to_string(), style)),
    }
    attrs
}

fn collect_sheet(root: roxmltree::Node<'_, '_>) -> StyleSheet {
    let mut sheet = StyleSheet::default();
    let styles = root.descendants().filter(|node| {
        node.is_element()
            && node.tag_name().name() == STYLE_ELEMENT
            && node.tag_name().namespace().is_none_or(|ns| ns == SVG_NS)
    });
    for style in styles {
        let text: String = style
            .children()
            .filter_map(|child| child.text())
            .collect();
        sheet.extend(&text);
    }
    sheet
}

fn convert(
    node: roxmltree::Node<'_, '_>,
    sheet: &StyleSheet,
    keep_whitespace: bool,
) -> Option<VectorNode> {
    if node.is_text() {
        let text = node.text()?;
        if !keep_whitespace && text.trim().is_empty() {
            return None;
        }
        return Some(VectorNode::Text(text.to_string()));
    }
    if !node.is_element() {
        return None;
    }
    let tag = node.tag_name();
    if tag.namespace().is_some_and(|ns| ns != SVG_NS) {
        return None;
    }
    let name = tag.name();
    if DROPPED_ELEMENTS.contains(&name) {
        let _ = warn_once("vector", &format!("dropped <{name}> from imported document"));
        return None;
    }
    if name == STYLE_ELEMENT {
        return None;
    }
    let attrs = element_attrs(node, sheet);
    let keep = matches!(name, "text" | "tspan" | "textPath");
    let children = node
        .children()
        .filter_map(|child| convert(child, sheet, keep))
        .collect();
    Some(VectorNode::Element(VectorElement {
        tag: name.to_string(),
        attrs,
        children,
    }))
}

/// Parse and sanitize an SVG document.
///
/// The view box comes from `viewBox`, then from `width`/`height`, then
/// defaults to 100 × 100.
///
/// # Errors
///
/// [`LoadError::Parse`] for malformed XML or a root that is not `<svg>`.
pub fn parse_document(text: &str) -> Result<VectorDocument, LoadError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let document = roxmltree::Document::parse_with_options(text, options)
        .map_err(|e| LoadError::Parse(e.to_string()))?;
    let root = document.root_element();
    if root.tag_name().name() != "svg" {
        return Err(LoadError::Parse(format!(
            "root element is <{}>, expected <svg>",
            root.tag_name().name()
        )));
    }

    let view_box = root
        .attribute("viewBox")
        .and_then(parse_view_box)
        .or_else(|| {
            let width = root.attribute("width").and_then(parse_length)?;
            let height = root.attribute("height").and_then(parse_length)?;
            Some(ViewBox {
                min_x: 0.0,
                min_y: 0.0,
                width,
                height,
            })
        })
        .unwrap_or(ViewBox {
            min_x: 0.0,
            min_y: 0.0,
            width: 100.0,
            height: 100.0,
        });

    let sheet = collect_sheet(root);
    let root_attrs = element_attrs(root, &sheet)
        .into_iter()
        .filter(|(name, _)| !name.contains(':') && !VIEWPORT_ATTRS.contains(&name.as_str()))
        .collect();

    let children = root
        .children()
        .filter_map(|child| convert(child, &sheet, false))
        .collect();

    Ok(VectorDocument {
        view_box,
        root_attrs,
        children,
    })
}

impl VectorDocument {
    /// Every element in document order, excluding the root.
    #[must_use]
    pub fn elements(&self) -> Vec<ElementInfo> {
        fn walk(nodes: &[VectorNode], out: &mut Vec<ElementInfo>) {
            for node in nodes {
                if let VectorNode::Element(element) = node {
                    out.push(ElementInfo {
                        element_type: element.tag.clone(),
                        id: element.attr("id").map(str::to_string),
                        class_name: element.attr("class").map(str::to_string),
                        original_fill: element.presentation("fill"),
                        original_stroke: element.presentation("stroke"),
                        original_stroke_width: element.presentation("stroke-width"),
                    });
                    walk(&element.children, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.children, &mut out);
        out
    }
}

/// Rewrite local references (`url(#x)`, `href="#x"`) to prefixed ids.
fn prefix_references(value: &str, prefix: &str) -> String {
    let mut out = value.to_string();
    for opener in ["url(#", "url('#", "url(\"#"] {
        out = out.replace(opener, &format!("{opener}{prefix}-"));
    }
    out
}

fn strip_style_properties(style: &str, names: &[&str]) -> String {
    declarations(style)
        .filter(|(prop, _)| !names.iter().any(|n| prop.eq_ignore_ascii_case(n)))
        .map(|(prop, value)| format!("{prop}:{value}"))
        .collect::<Vec<_>>()
        .join(";")
}

struct Importer<'a> {
    prefix: &'a str,
    overrides: &'a StyleOverrides,
}

impl Importer<'_> {
    fn import<B: NodeBuilder + ?Sized>(&self, builder: &mut B, parent: NodeRef, node: &VectorNode) {
        match node {
            VectorNode::Text(text) => {
                let text_node = builder.create_text(text);
                builder.append(parent, text_node);
            }
            VectorNode::Element(element) => {
                let created = builder.create(ElementKind::from_tag(&element.tag));
                self.copy_attrs(builder, created, element);
                for child in &element.children {
                    self.import(builder, created, child);
                }
                builder.append(parent, created);
            }
        }
    }

    fn copy_attrs<B: NodeBuilder + ?Sized>(
        &self,
        builder: &mut B,
        node: NodeRef,
        element: &VectorElement,
    ) {
        let style = if PAINTABLE.contains(&element.tag.as_str()) && !self.overrides.is_empty() {
            self.overrides
                .resolve(&element.tag, element.attr("id"), &element.classes())
        } else {
            ElementStyle::default()
        };
        let mut overridden: Vec<&str> = Vec::new();
        if style.fill.is_some() {
            overridden.push("fill");
        }
        if style.stroke.is_some() {
            overridden.push("stroke");
        }
        if style.stroke_width.is_some() {
            overridden.push("stroke-width");
        }

        for (name, value) in &element.attrs {
            let value = match name.as_str() {
                "id" => format!("{}-{value}", self.prefix),
                "href" | "xlink:href" if value.starts_with('#') => {
                    format!("#{}-{}", self.prefix, &value[1..])
                }
                "style" if !overridden.is_empty() => {
                    let kept = strip_style_properties(value, &overridden);
                    if kept.is_empty() {
                        continue;
                    }
                    prefix_references(&kept, self.prefix)
                }
                _ => prefix_references(value, self.prefix),
            };
            builder.set(node, name, value);
        }

        if let Some(fill) = style.fill {
            builder.set(node, "fill", fill.to_hex());
        }
        if let Some(stroke) = style.stroke {
            builder.set(node, "stroke", stroke.to_hex());
        }
        if let Some(width) = style.stroke_width {
            builder.set(node, "stroke-width", width);
        }
    }
}

/// Import a document under `parent`, fitted into a `w × h` box.
///
/// Returns the fitting group. Ids are prefixed with `layer_id` and
/// overrides are applied to paintable elements.
pub fn import_document<B: NodeBuilder + ?Sized>(
    builder: &mut B,
    parent: NodeRef,
    document: &VectorDocument,
    layer_id: &str,
    overrides: &StyleOverrides,
    w: f64,
    h: f64,
) -> NodeRef {
    let (scale, tx, ty) = document.view_box.fit(w, h);
    let group = builder.child(
        parent,
        ElementKind::Group,
        &[(
            "transform",
            AttrValue::Str(format!(
                "translate({} {}) scale({})",
                fmt_num(tx),
                fmt_num(ty),
                fmt_num(scale)
            )),
        )],
    );
    for (name, value) in &document.root_attrs {
        builder.set(group, name, prefix_references(value, layer_id));
    }
    let importer = Importer {
        prefix: layer_id,
        overrides,
    };
    for child in &document.children {
        importer.import(builder, group, child);
    }
    group
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_box_fallbacks() {
        let doc = parse_document(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 50 25"/>"#)
            .expect("parses");
        assert_eq!((doc.view_box.width, doc.view_box.height), (50.0, 25.0));
        let doc = parse_document(r#"<svg width="40px" height="20"/>"#).expect("parses");
        assert_eq!((doc.view_box.width, doc.view_box.height), (40.0, 20.0));
        let doc = parse_document("<svg/>").expect("parses");
        assert_eq!((doc.view_box.width, doc.view_box.height), (100.0, 100.0));
    }

    #[test]
    fn test_fit_centers_uniformly() {
        let vb = ViewBox {
            min_x: 0.0,
            min_y: 0.0,
            width: 50.0,
            height: 100.0,
        };
        assert_eq!(vb.fit(100.0, 100.0), (1.0, 25.0, 0.0));
    }

    #[test]
    fn test_non_svg_root_is_rejected() {
        assert!(matches!(parse_document("<html/>"), Err(LoadError::Parse(_))));
        assert!(matches!(parse_document("<svg"), Err(LoadError::Parse(_))));
    }

    #[test]
    fn test_prefix_references() {
        assert_eq!(prefix_references("url(#g1)", "L"), "url(#L-g1)");
        assert_eq!(prefix_references("fill:url('#g1')", "L"), "fill:url('#L-g1')");
        assert_eq!(prefix_references("#fff", "L"), "#fff");
    }

    #[test]
    fn test_strip_style_properties() {
        assert_eq!(
            strip_style_properties("fill: red; opacity:0.5;stroke:blue", &["fill", "stroke"]),
            "opacity:0.5"
        );
    }
}
