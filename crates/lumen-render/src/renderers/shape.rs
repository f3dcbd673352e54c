//! Shape layers: the geometric primitives and their paint.

use lumen_model::LayerType;
use lumen_style::layer::SHAPE_FILL;
use lumen_style::{Color, Fill, ResolvedProperties, ShapeStyle, ShapeType, Stroke};

use crate::builder::{ElementKind, NodeBuilder, NodeBuilderExt, NodeRef};
use crate::geometry::{
    arrow, circle, closed_path, ellipse, line, points_attr, rect_corner_radius, regular_polygon,
    star,
};
use crate::paint::{Paint, apply_fill, apply_stroke, resolve_fill};
use crate::registry::{LayerInput, RenderContext, TypeRenderer, content_key};

/// Width of a line drawn with its fill color.
const LINE_FALLBACK_WIDTH: f64 = 2.0;

/// Parametric shapes. The content node is the shape element itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeRenderer;

fn fill_color(fill: &Fill) -> Option<(Color, f64)> {
    match fill {
        Fill::Solid(solid) => Some((solid.color, solid.opacity)),
        Fill::Linear(g) => g.stops.first().map(|s| (s.color, s.opacity)),
        Fill::Radial(g) => g.stops.first().map(|s| (s.color, s.opacity)),
        Fill::Pattern(p) => Some((p.foreground, 1.0)),
    }
}

/// Lines have no interior: they stroke with the fill color at width 2 when
/// no stroke width is set.
fn line_stroke(style: &ShapeStyle) -> Stroke {
    if style.stroke.width > 0.0 {
        return style.stroke;
    }
    let (color, opacity) = fill_color(&style.fill).unwrap_or((SHAPE_FILL, 1.0));
    Stroke {
        color,
        opacity,
        width: LINE_FALLBACK_WIDTH,
        style: style.stroke.style,
    }
}

fn apply_paint(
    builder: &mut dyn NodeBuilder,
    node: NodeRef,
    style: &ShapeStyle,
    cx: &mut RenderContext<'_>,
) {
    if style.shape_type == ShapeType::Line {
        apply_fill(builder, node, &Paint::none());
        apply_stroke(builder, node, &line_stroke(style));
    } else {
        let paint = resolve_fill(&style.fill, cx.resources);
        apply_fill(builder, node, &paint);
        apply_stroke(builder, node, &style.stroke);
    }
}

fn build_geometry(builder: &mut dyn NodeBuilder, style: &ShapeStyle, w: f64, h: f64) -> NodeRef {
    match style.shape_type {
        ShapeType::Rectangle => {
            let node = builder.create(ElementKind::Rect);
            builder.set(node, "x", 0.0);
            builder.set(node, "y", 0.0);
            builder.set(node, "width", w);
            builder.set(node, "height", h);
            let r = rect_corner_radius(style.corner_radius, w, h);
            if r > 0.0 {
                builder.set(node, "rx", r);
                builder.set(node, "ry", r);
            }
            node
        }
        ShapeType::Circle => {
            let (c, r) = circle(w, h);
            let node = builder.create(ElementKind::Circle);
            builder.set(node, "cx", c.x);
            builder.set(node, "cy", c.y);
            builder.set(node, "r", r);
            node
        }
        ShapeType::Ellipse => {
            let (c, rx, ry) = ellipse(w, h);
            let node = builder.create(ElementKind::Ellipse);
            builder.set(node, "cx", c.x);
            builder.set(node, "cy", c.y);
            builder.set(node, "rx", rx);
            builder.set(node, "ry", ry);
            node
        }
        ShapeType::Polygon => {
            let node = builder.create(ElementKind::Polygon);
            builder.set(node, "points", points_attr(&regular_polygon(style.sides, w, h)));
            node
        }
        ShapeType::Star => {
            let node = builder.create(ElementKind::Polygon);
            builder.set(
                node,
                "points",
                points_attr(&star(style.points, style.inner_radius, w, h)),
            );
            node
        }
        ShapeType::Line => {
            let (a, b) = line(&style.line, w, h);
            let node = builder.create(ElementKind::Line);
            builder.set(node, "x1", a.x);
            builder.set(node, "y1", a.y);
            builder.set(node, "x2", b.x);
            builder.set(node, "y2", b.y);
            node
        }
        ShapeType::Arrow => {
            let node = builder.create(ElementKind::Path);
            builder.set(node, "d", closed_path(&arrow(w, h)));
            node
        }
    }
}

impl TypeRenderer for ShapeRenderer {
    fn name(&self) -> &'static str {
        "shape"
    }

    fn supported_types(&self) -> Vec<LayerType> {
        vec![LayerType::Shape]
    }

    fn render_content(
        &self,
        input: &LayerInput<'_>,
        builder: &mut dyn NodeBuilder,
        cx: &mut RenderContext<'_>,
    ) -> NodeRef {
        let ResolvedProperties::Shape(style) = &input.resolved.properties else {
            return builder.create(ElementKind::Group);
        };
        let node = build_geometry(builder, style, input.width(), input.height());
        let shape_name: &str = style.shape_type.as_ref();
        builder.set(node, "data-shape", shape_name);
        apply_paint(builder, node, style, cx);
        node
    }

    fn structure_key(&self, input: &LayerInput<'_>) -> String {
        let ResolvedProperties::Shape(style) = &input.resolved.properties else {
            return String::new();
        };
        content_key(&(
            style.shape_type,
            style.corner_radius,
            style.sides,
            style.points,
            style.inner_radius,
            &style.line,
            input.width(),
            input.height(),
        ))
    }

    fn patch_content(
        &self,
        input: &LayerInput<'_>,
        builder: &mut dyn NodeBuilder,
        content: NodeRef,
        cx: &mut RenderContext<'_>,
    ) -> bool {
        let ResolvedProperties::Shape(style) = &input.resolved.properties else {
            return false;
        };
        apply_paint(builder, content, style, cx);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_model::ShapeProperties;
    use lumen_style::layer::normalize_shape;

    #[test]
    fn test_line_falls_back_to_fill_color() {
        let raw = ShapeProperties {
            shape_type: Some("line".into()),
            fill: Some(lumen_model::FillInput::Color("#ff0000".into())),
            ..ShapeProperties::default()
        };
        let stroke = line_stroke(&normalize_shape(&raw));
        assert_eq!(stroke.color.to_hex(), "#ff0000");
        assert_eq!(stroke.width, LINE_FALLBACK_WIDTH);
    }
}
