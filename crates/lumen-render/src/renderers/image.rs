//! Image layers.

use lumen_common::warning::warn_once;
use lumen_model::LayerType;
use lumen_style::{ImageStyle, ResolvedProperties};

use crate::builder::{AttrValue, ElementKind, NodeBuilder, NodeBuilderExt, NodeRef};
use crate::geometry::{ClipShape, rect_corner_radius};
use crate::loader::{ContentState, ImageAsset, abbreviate};
use crate::paint::apply_stroke;
use crate::registry::{LayerInput, RenderContext, TypeRenderer};
use crate::renderers::placeholder::{PlaceholderKind, placeholder};
use crate::resources::ResourceDefinition;

/// Image layers: a fitted `<image>` with optional rounded corners and border.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRenderer;

fn image_href(src: &str, asset: &ImageAsset, embed: bool) -> String {
    if embed && !src.starts_with("data:") {
        asset.data_url()
    } else {
        src.to_string()
    }
}

fn render_image(
    builder: &mut dyn NodeBuilder,
    style: &ImageStyle,
    src: &str,
    asset: &ImageAsset,
    w: f64,
    h: f64,
    cx: &mut RenderContext<'_>,
) -> NodeRef {
    let group = builder.create(ElementKind::Group);
    if let Some(alt) = &style.alt {
        builder.set(group, "aria-label", alt.as_str());
    }
    let image = builder.child(
        group,
        ElementKind::Image,
        &[
            ("x", AttrValue::Num(0.0)),
            ("y", AttrValue::Num(0.0)),
            ("width", w.into()),
            ("height", h.into()),
            ("preserveAspectRatio", style.object_fit.preserve_aspect_ratio().into()),
            ("href", image_href(src, asset, cx.options.embed_images).into()),
        ],
    );
    let radius = rect_corner_radius(style.corner_radius, w, h);
    if radius > 0.0 {
        let clip = cx.intern(ResourceDefinition::ClipPath(ClipShape::rounded_rect(w, h, radius)));
        builder.set(image, "clip-path", clip.url());
    }
    if let Some(border) = &style.border {
        let frame = builder.child(
            group,
            ElementKind::Rect,
            &[
                ("x", AttrValue::Num(0.0)),
                ("y", AttrValue::Num(0.0)),
                ("width", w.into()),
                ("height", h.into()),
                ("fill", "none".into()),
            ],
        );
        if radius > 0.0 {
            builder.set(frame, "rx", radius);
            builder.set(frame, "ry", radius);
        }
        apply_stroke(builder, frame, border);
    }
    group
}

impl TypeRenderer for ImageRenderer {
    fn name(&self) -> &'static str {
        "image"
    }

    fn supported_types(&self) -> Vec<LayerType> {
        vec![LayerType::Image]
    }

    fn render_content(
        &self,
        input: &LayerInput<'_>,
        builder: &mut dyn NodeBuilder,
        cx: &mut RenderContext<'_>,
    ) -> NodeRef {
        let (w, h) = (input.width(), input.height());
        let ResolvedProperties::Image(style) = &input.resolved.properties else {
            return builder.create(ElementKind::Group);
        };
        let Some(src) = style.src.as_deref() else {
            return placeholder(builder, PlaceholderKind::Empty, "No image", w, h);
        };
        match cx.content.image(src) {
            ContentState::Ready(asset) => render_image(builder, style, src, &asset, w, h, cx),
            ContentState::Loading => {
                cx.wait_for(src);
                placeholder(builder, PlaceholderKind::Loading, "Loading image", w, h)
            }
            ContentState::Failed(error) => {
                let (id, src) = (input.id(), abbreviate(src));
                let _ = warn_once(
                    "image",
                    &format!("layer '{id}': could not load '{src}': {error}"),
                );
                placeholder(builder, PlaceholderKind::Failed, "Image not found", w, h)
            }
        }
    }
}
