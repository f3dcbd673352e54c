//! Group layers: children in paint order inside an optional clip and mask.

use lumen_common::warning::warn_once;
use lumen_model::LayerType;
use lumen_style::{GroupStyle, LinearGradient, Mask, ResolvedProperties};

use crate::builder::{ElementKind, NodeBuilder, NodeBuilderExt, NodeRef};
use crate::geometry::ClipShape;
use crate::loader::{ContentState, abbreviate};
use crate::paint::{apply_fill, linear_definition, resolve_fill};
use crate::registry::{LayerInput, RenderContext, TypeRenderer};
use crate::resources::{MaskDef, ResourceDefinition, ResourceId};

/// Group layers: optional background, clip, and mask around the children.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupRenderer;

fn mask_definition(
    mask: &Mask,
    layer_id: &str,
    w: f64,
    h: f64,
    cx: &mut RenderContext<'_>,
) -> Option<ResourceId> {
    let definition = match mask {
        Mask::Gradient { angle, stops } => {
            let gradient = cx.intern(linear_definition(&LinearGradient {
                angle: *angle,
                stops: stops.clone(),
            }));
            MaskDef::Gradient {
                gradient,
                width: w,
                height: h,
            }
        }
        Mask::Image { src } => {
            let href = match cx.content.image(src) {
                ContentState::Ready(asset)
                    if cx.options.embed_images && !src.starts_with("data:") =>
                {
                    asset.data_url()
                }
                ContentState::Ready(_) => src.clone(),
                ContentState::Loading => {
                    cx.wait_for(src);
                    return None;
                }
                ContentState::Failed(error) => {
                    let src = abbreviate(src);
                    let _ = warn_once(
                        "mask",
                        &format!("layer '{layer_id}': mask image '{src}' unavailable: {error}"),
                    );
                    return None;
                }
            };
            MaskDef::Image {
                href,
                width: w,
                height: h,
            }
        }
        Mask::Shape { shape } => MaskDef::Shape {
            shape: *shape,
            width: w,
            height: h,
        },
    };
    Some(cx.intern(ResourceDefinition::Mask(definition)))
}

fn decorate(
    builder: &mut dyn NodeBuilder,
    content: NodeRef,
    style: &GroupStyle,
    layer_id: &str,
    w: f64,
    h: f64,
    cx: &mut RenderContext<'_>,
) {
    if let Some(background) = &style.background {
        let rect = builder.child(
            content,
            ElementKind::Rect,
            &[
                ("width", w.into()),
                ("height", h.into()),
            ],
        );
        builder.set(rect, "data-role", "background");
        let paint = resolve_fill(background, cx.resources);
        apply_fill(builder, rect, &paint);
    }
    if let Some(clip) = &style.clip {
        let id = cx.intern(ResourceDefinition::ClipPath(ClipShape::from_clip(clip)));
        builder.set(content, "clip-path", id.url());
    }
    if let Some(id) = style
        .mask
        .as_ref()
        .and_then(|mask| mask_definition(mask, layer_id, w, h, cx))
    {
        builder.set(content, "mask", id.url());
    }
}

impl TypeRenderer for GroupRenderer {
    fn name(&self) -> &'static str {
        "group"
    }

    fn supported_types(&self) -> Vec<LayerType> {
        vec![LayerType::Group]
    }

    fn render_content(
        &self,
        input: &LayerInput<'_>,
        builder: &mut dyn NodeBuilder,
        cx: &mut RenderContext<'_>,
    ) -> NodeRef {
        let content = builder.create(ElementKind::Group);
        if let ResolvedProperties::Group(style) = &input.resolved.properties {
            decorate(builder, content, style, input.id(), input.width(), input.height(), cx);
        }
        cx.render_children(builder, content, &input.layer.children);
        content
    }
}
