//! Raw clip and mask descriptors for group layers.
//!
//! Both accept a boolean shorthand or an object; the meaning of each form is
//! decided by the normalizer, not here.

use serde::{Deserialize, Serialize};

use crate::lenient::{lenient, lenient_bool, lenient_number, lenient_string};
use crate::paint::GradientStopInput;

/// `clipPath`: `true`, `false`, or a [`ClipConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClipInput {
    /// Boolean shorthand.
    Flag(bool),
    /// Full descriptor.
    Config(ClipConfig),
}

/// Clip descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClipConfig {
    /// Must be `true` for an object config to take effect.
    #[serde(deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// `rectangle`, `circle`, `ellipse`, `polygon`, or `path`.
    #[serde(
        rename = "type",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none",
    )]
    pub clip_type: Option<String>,
    /// Rectangle x.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Rectangle y.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Rectangle width.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Rectangle height.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Rectangle corner radius.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    /// Circle / ellipse center x.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub cx: Option<f64>,
    /// Circle / ellipse center y.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub cy: Option<f64>,
    /// Circle radius.
    #[serde(
        alias = "r",
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none",
    )]
    pub radius: Option<f64>,
    /// Ellipse x radius.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub rx: Option<f64>,
    /// Ellipse y radius.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub ry: Option<f64>,
    /// Polygon vertices.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<PointInput>>,
    /// Raw path data.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// A polygon vertex: `[x, y]` or `{ "x": .., "y": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointInput {
    /// Array form.
    Pair([f64; 2]),
    /// Object form.
    Object {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
    },
}

impl PointInput {
    /// The vertex as an `(x, y)` tuple.
    #[must_use]
    pub const fn xy(self) -> (f64, f64) {
        match self {
            Self::Pair([x, y]) | Self::Object { x, y } => (x, y),
        }
    }
}

/// `mask`: `true`, `false`, or a [`MaskConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaskInput {
    /// Boolean shorthand.
    Flag(bool),
    /// Full descriptor.
    Config(MaskConfig),
}

/// Mask descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaskConfig {
    /// Must be `true` for an object config to take effect.
    #[serde(deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// `gradient`, `image`, or `shape`.
    #[serde(
        rename = "type",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none",
    )]
    pub mask_type: Option<String>,
    /// Gradient stops (gradient masks).
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub stops: Option<Vec<GradientStopInput>>,
    /// Gradient angle in degrees (gradient masks).
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    /// Image source (image masks).
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// `rectangle`, `circle`, or `ellipse` (shape masks).
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
}
