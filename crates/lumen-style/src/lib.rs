//! Property normalizer for the Lumen layer renderer.
//!
//! Turns the raw, leniently decoded properties of `lumen-model` into fully
//! resolved values: every number clamped to its documented range, every
//! color parsed, every enum known. Both render targets consume only these
//! resolved values, so they see identical defaults.
//!
//! Nothing here fails. Malformed input resolves to the documented default
//! and is reported once through [`lumen_common::warning::warn_once`].

pub mod canvas;
pub mod clip;
pub mod color;
pub mod effects;
pub mod enums;
pub mod fill;
pub mod layer;
pub mod rules;

pub use canvas::{Canvas, normalize_canvas};
pub use clip::{Clip, Mask, is_valid_path_data, normalize_clip, normalize_mask};
pub use color::{Color, resolve_color};
pub use effects::{Effects, FilterSettings, Glow, Shadow, normalize_effects};
pub use enums::{
    ClipKind, FillKind, FontStyle, FontWeight, MaskKind, MaskShape, ObjectFit, PatternKind,
    ShapeType, StrokeStyle, TextAlign, TextDecoration,
};
pub use fill::{
    Fill, GradientStop, LinearGradient, PatternFill, RadialGradient, SolidFill, normalize_fill,
};
pub use layer::{
    AudioStyle, ElementStyle, GroupStyle, ImageStyle, LineEnds, ResolvedLayer,
    ResolvedProperties, ResolvedTransform, ShapeStyle, Stroke, StyleOverrides, TextStyle,
    VectorStyle, VideoStyle, normalize_layer,
};
pub use rules::NumberRule;
