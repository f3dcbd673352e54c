//! The paint resolver.
//!
//! Solid fills become literal colors. Gradients and patterns become
//! interned resources referenced by `url(#id)`.

use lumen_style::{
    Canvas, Fill, GradientStop, LinearGradient, PatternFill, RadialGradient, Stroke,
};

use crate::builder::{AttrValue, ElementKind, NodeBuilder, NodeBuilderExt, NodeRef};
use crate::geometry::fmt_num;
use crate::resources::{
    LinearGradientDef, PatternDef, RadialGradientDef, ResourceCollection, ResourceDefinition,
    StopDef,
};

/// A resolved paint value.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    /// `#rrggbb`, `url(#id)`, or `none`.
    pub value: String,
    /// Opacity attribute, only when below 1.
    pub opacity: Option<f64>,
}

impl Paint {
    /// Paint nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            value: "none".to_string(),
            opacity: None,
        }
    }

    /// A color with an opacity.
    #[must_use]
    pub fn color(hex: String, opacity: f64) -> Self {
        Self {
            value: hex,
            opacity: (opacity < 1.0).then_some(opacity),
        }
    }
}

fn stop_defs(stops: &[GradientStop]) -> Vec<StopDef> {
    stops
        .iter()
        .map(|s| StopDef {
            offset: s.offset * 100.0,
            color: s.color.to_hex(),
            opacity: s.opacity,
        })
        .collect()
}

/// Resource definition for a linear gradient.
#[must_use]
pub fn linear_definition(gradient: &LinearGradient) -> ResourceDefinition {
    let (x1, y1, x2, y2) = gradient.endpoints();
    // Rounded so that float noise from trigonometry cannot split
    // otherwise identical gradients.
    let p = |v: f64| (v * 100.0 * 10_000.0).round() / 10_000.0;
    ResourceDefinition::LinearGradient(LinearGradientDef {
        x1: p(x1),
        y1: p(y1),
        x2: p(x2),
        y2: p(y2),
        stops: stop_defs(&gradient.stops),
    })
}

/// Resource definition for a radial gradient.
#[must_use]
pub fn radial_definition(gradient: &RadialGradient) -> ResourceDefinition {
    ResourceDefinition::RadialGradient(RadialGradientDef {
        cx: gradient.center_x * 100.0,
        cy: gradient.center_y * 100.0,
        r: gradient.radius * 100.0,
        stops: stop_defs(&gradient.stops),
    })
}

/// Resource definition for a pattern.
#[must_use]
pub fn pattern_definition(pattern: &PatternFill) -> ResourceDefinition {
    ResourceDefinition::Pattern(PatternDef {
        kind: pattern.kind,
        size: pattern.size,
        tile: pattern.tile(),
        foreground: pattern.foreground.to_hex(),
        background: pattern.background.map(|c| c.to_hex()),
    })
}

/// Resolve a fill into a paint value, interning any resource it needs.
pub fn resolve_fill(fill: &Fill, resources: &mut ResourceCollection) -> Paint {
    match fill {
        Fill::Solid(solid) if solid.is_invisible() => Paint::none(),
        Fill::Solid(solid) => Paint::color(solid.color.to_hex(), solid.opacity),
        Fill::Linear(gradient) => Paint {
            value: resources.intern(linear_definition(gradient)).url(),
            opacity: None,
        },
        Fill::Radial(gradient) => Paint {
            value: resources.intern(radial_definition(gradient)).url(),
            opacity: None,
        },
        Fill::Pattern(pattern) => Paint {
            value: resources.intern(pattern_definition(pattern)).url(),
            opacity: None,
        },
    }
}

/// Set `fill` and `fill-opacity` on a node.
pub fn apply_fill<B: NodeBuilder + ?Sized>(builder: &mut B, node: NodeRef, paint: &Paint) {
    builder.set(node, "fill", paint.value.as_str());
    match paint.opacity {
        Some(opacity) => builder.set(node, "fill-opacity", opacity),
        None => builder.remove_attr(node, "fill-opacity"),
    }
}

/// Append a full-canvas `<rect data-role="background">` painted with the
/// canvas background.
pub fn canvas_background<B: NodeBuilder + ?Sized>(
    builder: &mut B,
    parent: NodeRef,
    canvas: &Canvas,
    resources: &mut ResourceCollection,
) -> NodeRef {
    let paint = resolve_fill(&canvas.background, resources);
    let rect = builder.child(
        parent,
        ElementKind::Rect,
        &[
            ("data-role", "background".into()),
            ("x", AttrValue::Num(0.0)),
            ("y", AttrValue::Num(0.0)),
            ("width", canvas.width.into()),
            ("height", canvas.height.into()),
        ],
    );
    apply_fill(builder, rect, &paint);
    rect
}

/// Set the stroke attributes on a node, or clear them for an invisible
/// stroke.
pub fn apply_stroke<B: NodeBuilder + ?Sized>(builder: &mut B, node: NodeRef, stroke: &Stroke) {
    if !stroke.is_visible() {
        for name in ["stroke", "stroke-width", "stroke-opacity", "stroke-dasharray"] {
            builder.remove_attr(node, name);
        }
        return;
    }
    builder.set(node, "stroke", stroke.color.to_hex());
    builder.set(node, "stroke-width", stroke.width);
    if stroke.opacity < 1.0 {
        builder.set(node, "stroke-opacity", stroke.opacity);
    } else {
        builder.remove_attr(node, "stroke-opacity");
    }
    match stroke.style.dash_array(stroke.width) {
        Some([dash, gap]) => {
            builder.set(node, "stroke-dasharray", format!("{} {}", fmt_num(dash), fmt_num(gap)));
        }
        None => builder.remove_attr(node, "stroke-dasharray"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_style::Color;

    #[test]
    fn test_transparent_solid_is_none() {
        let mut resources = ResourceCollection::new();
        let paint = resolve_fill(&Fill::solid(Color::TRANSPARENT), &mut resources);
        assert_eq!(paint, Paint::none());
        assert!(resources.is_empty());
    }

    #[test]
    fn test_translucent_solid_carries_opacity() {
        let mut resources = ResourceCollection::new();
        let fill = Fill::Solid(lumen_style::SolidFill::new(Color::rgb(255, 0, 0), 0.5));
        let paint = resolve_fill(&fill, &mut resources);
        assert_eq!(paint.value, "#ff0000");
        assert_eq!(paint.opacity, Some(0.5));
    }
}
