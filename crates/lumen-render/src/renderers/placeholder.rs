//! Labeled placeholders for content that is missing, loading, or broken.

use crate::builder::{AttrValue, ElementKind, NodeBuilder, NodeBuilderExt, NodeRef};

/// Which placeholder is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// No source configured.
    Empty,
    /// Waiting for a fetch.
    Loading,
    /// The fetch or decode failed.
    Failed,
}

impl PlaceholderKind {
    /// Value of the `data-placeholder` marker attribute.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Loading => "loading",
            Self::Failed => "error",
        }
    }

    const fn colors(self) -> (&'static str, &'static str) {
        match self {
            Self::Empty | Self::Loading => ("#f3f4f6", "#9ca3af"),
            Self::Failed => ("#fef2f2", "#ef4444"),
        }
    }
}

/// Dashed box with a centered label, as a detached group.
pub fn placeholder(
    builder: &mut dyn NodeBuilder,
    kind: PlaceholderKind,
    label: &str,
    w: f64,
    h: f64,
) -> NodeRef {
    let (background, border) = kind.colors();
    let group = builder.create(ElementKind::Group);
    builder.set(group, "data-placeholder", kind.marker());
    let _ = builder.child(
        group,
        ElementKind::Rect,
        &[
            ("width", w.into()),
            ("height", h.into()),
            ("fill", background.into()),
            ("stroke", border.into()),
            ("stroke-width", AttrValue::Num(1.0)),
            ("stroke-dasharray", "6 4".into()),
        ],
    );
    let font_size = (h / 4.0).clamp(8.0, 14.0);
    let text = builder.child(
        group,
        ElementKind::Text,
        &[
            ("x", (w / 2.0).into()),
            ("y", (h / 2.0).into()),
            ("text-anchor", "middle".into()),
            ("dominant-baseline", "central".into()),
            ("font-family", "sans-serif".into()),
            ("font-size", AttrValue::Num(font_size)),
            ("fill", border.into()),
        ],
    );
    builder.set_text(text, label);
    group
}
