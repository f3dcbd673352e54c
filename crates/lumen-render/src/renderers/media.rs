//! Static panels standing in for video and audio layers.

use lumen_model::LayerType;
use lumen_style::ResolvedProperties;

use crate::builder::{AttrValue, ElementKind, NodeBuilder, NodeBuilderExt, NodeRef};
use crate::geometry::{Point, points_attr};
use crate::loader::ContentState;
use crate::registry::{LayerInput, RenderContext, TypeRenderer};

const PANEL: &str = "#1f2937";
const ACCENT: &str = "#60a5fa";
const LABEL: &str = "#e5e7eb";

/// Video and audio layers. Neither plays; both render a recognizable panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaRenderer;

fn panel(builder: &mut dyn NodeBuilder, group: NodeRef, w: f64, h: f64) {
    let _ = builder.child(
        group,
        ElementKind::Rect,
        &[
            ("width", w.into()),
            ("height", h.into()),
            ("rx", 8.0_f64.min(w.min(h) / 2.0).into()),
            ("fill", PANEL.into()),
        ],
    );
}

fn label(builder: &mut dyn NodeBuilder, group: NodeRef, text: &str, x: f64, y: f64, anchor: &str) {
    let node = builder.child(
        group,
        ElementKind::Text,
        &[
            ("x", x.into()),
            ("y", y.into()),
            ("text-anchor", anchor.into()),
            ("dominant-baseline", "central".into()),
            ("font-family", "sans-serif".into()),
            ("font-size", AttrValue::Num(12.0)),
            ("fill", LABEL.into()),
        ],
    );
    builder.set_text(node, text);
}

fn render_video(
    builder: &mut dyn NodeBuilder,
    poster: Option<&str>,
    w: f64,
    h: f64,
    cx: &mut RenderContext<'_>,
) -> NodeRef {
    let group = builder.create(ElementKind::Group);
    builder.set(group, "data-media", "video");
    let poster_href = poster.and_then(|src| match cx.content.image(src) {
        ContentState::Ready(asset) if cx.options.embed_images && !src.starts_with("data:") => {
            Some(asset.data_url())
        }
        ContentState::Ready(_) => Some(src.to_string()),
        ContentState::Loading => {
            cx.wait_for(src);
            None
        }
        ContentState::Failed(_) => None,
    });
    match poster_href {
        Some(href) => {
            let _ = builder.child(
                group,
                ElementKind::Image,
                &[
                    ("width", w.into()),
                    ("height", h.into()),
                    ("preserveAspectRatio", "xMidYMid slice".into()),
                    ("href", href.into()),
                ],
            );
        }
        None => panel(builder, group, w, h),
    }

    let size = w.min(h) * 0.25;
    let (cx0, cy0) = (w / 2.0, h / 2.0);
    let triangle = [
        Point::new(cx0 - size * 0.4, cy0 - size / 2.0),
        Point::new(cx0 - size * 0.4, cy0 + size / 2.0),
        Point::new(cx0 + size * 0.6, cy0),
    ];
    let _ = builder.child(
        group,
        ElementKind::Polygon,
        &[
            ("points", points_attr(&triangle).into()),
            ("fill", "#ffffff".into()),
            ("fill-opacity", AttrValue::Num(0.9)),
        ],
    );
    label(builder, group, "Video", w / 2.0, h - (h * 0.1).clamp(6.0, 16.0), "middle");
    group
}

/// Bar heights in `(0, 1]`, fixed for a given count.
fn waveform(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            0.2 + 0.8 * ((t * 1.7).sin() * (t * 0.45).cos()).abs()
        })
        .collect()
}

fn render_audio(builder: &mut dyn NodeBuilder, title: Option<&str>, w: f64, h: f64) -> NodeRef {
    let group = builder.create(ElementKind::Group);
    builder.set(group, "data-media", "audio");
    panel(builder, group, w, h);

    let count = ((w / 8.0).floor() as usize).clamp(4, 48);
    let slot = w / count as f64;
    let bar_width = slot / 2.0;
    let max_height = h * 0.5;
    let mid = h / 2.0;
    for (i, amplitude) in waveform(count).into_iter().enumerate() {
        let bar_height = max_height * amplitude;
        let _ = builder.child(
            group,
            ElementKind::Rect,
            &[
                ("x", (i as f64 * slot + bar_width / 2.0).into()),
                ("y", (mid - bar_height / 2.0).into()),
                ("width", bar_width.into()),
                ("height", bar_height.into()),
                ("fill", ACCENT.into()),
            ],
        );
    }
    let text = title.map_or_else(|| "Audio".to_string(), |t| format!("Audio: {t}"));
    label(builder, group, &text, 8.0, (h * 0.12).clamp(8.0, 16.0), "start");
    group
}

impl TypeRenderer for MediaRenderer {
    fn name(&self) -> &'static str {
        "media"
    }

    fn supported_types(&self) -> Vec<LayerType> {
        vec![LayerType::Video, LayerType::Audio]
    }

    fn render_content(
        &self,
        input: &LayerInput<'_>,
        builder: &mut dyn NodeBuilder,
        cx: &mut RenderContext<'_>,
    ) -> NodeRef {
        let (w, h) = (input.width(), input.height());
        match &input.resolved.properties {
            ResolvedProperties::Video(style) => {
                render_video(builder, style.poster.as_deref(), w, h, cx)
            }
            ResolvedProperties::Audio(style) => render_audio(builder, style.title.as_deref(), w, h),
            _ => builder.create(ElementKind::Group),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_is_deterministic_and_bounded() {
        let a = waveform(24);
        assert_eq!(a, waveform(24));
        assert!(a.iter().all(|v| *v > 0.0 && *v <= 1.0));
    }
}
