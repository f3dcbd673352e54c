//! Vector-source layers.

use lumen_common::warning::warn_once;
use lumen_model::LayerType;
use lumen_style::{ResolvedProperties, VectorStyle};

use crate::builder::{ElementKind, NodeBuilder, NodeRef};
use crate::loader::{ContentState, abbreviate};
use crate::registry::{LayerInput, RenderContext, TypeRenderer, content_key};
use crate::renderers::placeholder::{PlaceholderKind, placeholder};
use crate::vector::import_document;

/// Vector-source layers: a foreign SVG fitted into the layer box.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorRenderer;

/// Fill `content` with the document, or return `false` when it is not
/// available.
fn import_into(
    builder: &mut dyn NodeBuilder,
    content: NodeRef,
    input: &LayerInput<'_>,
    style: &VectorStyle,
    cx: &mut RenderContext<'_>,
) -> bool {
    let Some(src) = style.src.as_deref() else {
        return false;
    };
    let ContentState::Ready(document) = cx.content.vector(src) else {
        return false;
    };
    builder.clear_children(content);
    let _ = import_document(
        builder,
        content,
        &document,
        input.id(),
        &style.overrides,
        input.width(),
        input.height(),
    );
    true
}

impl TypeRenderer for VectorRenderer {
    fn name(&self) -> &'static str {
        "vector-source"
    }

    fn supported_types(&self) -> Vec<LayerType> {
        vec![LayerType::VectorSource]
    }

    fn render_content(
        &self,
        input: &LayerInput<'_>,
        builder: &mut dyn NodeBuilder,
        cx: &mut RenderContext<'_>,
    ) -> NodeRef {
        let (w, h) = (input.width(), input.height());
        let ResolvedProperties::VectorSource(style) = &input.resolved.properties else {
            return builder.create(ElementKind::Group);
        };
        let Some(src) = style.src.as_deref() else {
            return placeholder(builder, PlaceholderKind::Empty, "No SVG source", w, h);
        };
        match cx.content.vector(src) {
            ContentState::Ready(_) => {
                let content = builder.create(ElementKind::Group);
                let _ = import_into(builder, content, input, style, cx);
                content
            }
            ContentState::Loading => {
                cx.wait_for(src);
                placeholder(builder, PlaceholderKind::Loading, "Loading SVG", w, h)
            }
            ContentState::Failed(error) => {
                let (id, src) = (input.id(), abbreviate(src));
                let _ = warn_once(
                    "vector",
                    &format!("layer '{id}': could not load '{src}': {error}"),
                );
                placeholder(builder, PlaceholderKind::Failed, "Failed to load SVG", w, h)
            }
        }
    }

    /// Overrides are re-applied in place; a new source, size, or load state
    /// rebuilds.
    fn structure_key(&self, input: &LayerInput<'_>) -> String {
        let ResolvedProperties::VectorSource(style) = &input.resolved.properties else {
            return String::new();
        };
        content_key(&(&style.src, input.width(), input.height()))
    }

    fn patch_content(
        &self,
        input: &LayerInput<'_>,
        builder: &mut dyn NodeBuilder,
        content: NodeRef,
        cx: &mut RenderContext<'_>,
    ) -> bool {
        let ResolvedProperties::VectorSource(style) = &input.resolved.properties else {
            return false;
        };
        if builder.attr(content, "data-placeholder").is_some() {
            return false;
        }
        import_into(builder, content, input, style, cx)
    }
}
