//! Text layers, laid out line by line into `<tspan>`s.

use lumen_model::LayerType;
use lumen_style::{ResolvedProperties, TextDecoration, TextStyle};

use crate::builder::{ElementKind, NodeBuilder, NodeBuilderExt, NodeRef};
use crate::paint::{apply_fill, apply_stroke, resolve_fill};
use crate::registry::{LayerInput, RenderContext, TypeRenderer, content_key};
use crate::text::{TextLayout, layout_text};

/// Text layers: a `<text>` element, one `<tspan>` per line when wrapped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

fn apply_paint(
    builder: &mut dyn NodeBuilder,
    node: NodeRef,
    style: &TextStyle,
    cx: &mut RenderContext<'_>,
) {
    let font_style: &str = style.font_style.as_ref();
    builder.set(node, "font-family", style.font_family.as_str());
    builder.set(node, "font-size", style.font_size);
    builder.set(node, "font-weight", style.font_weight.to_string());
    builder.set(node, "font-style", font_style);
    if style.text_decoration == TextDecoration::None {
        builder.remove_attr(node, "text-decoration");
    } else {
        let decoration: &str = style.text_decoration.as_ref();
        builder.set(node, "text-decoration", decoration);
    }
    if style.letter_spacing == 0.0 {
        builder.remove_attr(node, "letter-spacing");
    } else {
        builder.set(node, "letter-spacing", style.letter_spacing);
    }
    let paint = resolve_fill(&style.fill, cx.resources);
    apply_fill(builder, node, &paint);
    match &style.stroke {
        Some(stroke) => apply_stroke(builder, node, stroke),
        None => {
            for name in ["stroke", "stroke-width", "stroke-opacity", "stroke-dasharray"] {
                builder.remove_attr(node, name);
            }
        }
    }
}

impl TypeRenderer for TextRenderer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn supported_types(&self) -> Vec<LayerType> {
        vec![LayerType::Text]
    }

    fn render_content(
        &self,
        input: &LayerInput<'_>,
        builder: &mut dyn NodeBuilder,
        cx: &mut RenderContext<'_>,
    ) -> NodeRef {
        let node = builder.create(ElementKind::Text);
        let ResolvedProperties::Text(style) = &input.resolved.properties else {
            return node;
        };
        builder.set(node, "text-anchor", style.text_align.anchor());
        apply_paint(builder, node, style, cx);

        match layout_text(style, input.width(), input.height()) {
            TextLayout::Single { x, y, text } => {
                builder.set(node, "x", x);
                builder.set(node, "y", y);
                builder.set(node, "dominant-baseline", "central");
                builder.set_text(node, &text);
            }
            TextLayout::Lines { x, lines } => {
                builder.set(node, "x", x);
                if let Some(first) = lines.first() {
                    builder.set(node, "y", first.y);
                }
                for line in &lines {
                    let tspan = builder.child(
                        node,
                        ElementKind::TSpan,
                        &[
                            ("x", x.into()),
                            ("dy", line.dy.into()),
                        ],
                    );
                    builder.set_text(tspan, &line.text);
                }
            }
        }
        node
    }

    fn structure_key(&self, input: &LayerInput<'_>) -> String {
        let ResolvedProperties::Text(style) = &input.resolved.properties else {
            return String::new();
        };
        content_key(&(
            &style.text,
            style.font_size,
            style.line_height,
            style.word_wrap,
            style.text_align,
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
        let ResolvedProperties::Text(style) = &input.resolved.properties else {
            return false;
        };
        apply_paint(builder, content, style, cx);
        true
    }
}
