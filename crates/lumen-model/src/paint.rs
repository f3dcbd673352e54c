//! Raw paint and effect descriptors as they appear in a design snapshot.

use serde::{Deserialize, Serialize};

use crate::lenient::{lenient, lenient_bool, lenient_number, lenient_string};

/// A fill as written by the editor: either a bare color string or a full
/// [`FillConfig`] object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillInput {
    /// Shorthand: `"fill": "#ff0000"`.
    Color(String),
    /// Full descriptor.
    Config(FillConfig),
}

impl FillInput {
    /// Shorthand constructor for a solid color fill.
    #[must_use]
    pub fn color(color: &str) -> Self {
        Self::Color(color.to_string())
    }
}

/// `FillConfig`: solid color, linear/radial gradient, or pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FillConfig {
    /// `solid`, `linear`, `radial`, or `pattern`.
    #[serde(
        rename = "type",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none",
    )]
    pub fill_type: Option<String>,
    /// Solid color.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Solid color opacity.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Gradient color stops, in order.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub stops: Option<Vec<GradientStopInput>>,
    /// Linear gradient angle in degrees (0 = left to right).
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    /// Radial gradient center x in `[0, 1]`.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub center_x: Option<f64>,
    /// Radial gradient center y in `[0, 1]`.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub center_y: Option<f64>,
    /// Radial gradient radius in `[0, 1]`.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Pattern kind: `dots`, `stripes`, or `grid`.
    #[serde(
        alias = "patternType",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none",
    )]
    pub pattern: Option<String>,
    /// Pattern feature size.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    /// Pattern gap between features.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,
    /// Pattern colors: foreground, then optional background.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
}

/// One gradient color stop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientStopInput {
    /// Stop color.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Position along the gradient in `[0, 1]`.
    #[serde(
        alias = "offset",
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none",
    )]
    pub stop: Option<f64>,
    /// Optional stop opacity.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// Drop shadow descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShadowInput {
    /// Shadow color.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Blur radius.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
    /// Horizontal offset.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<f64>,
    /// Vertical offset.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<f64>,
    /// Shadow opacity.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Whether the shadow is drawn.
    #[serde(deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Outer glow descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowInput {
    /// Glow color.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Blur radius.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
    /// Glow opacity.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Whether the glow is drawn.
    #[serde(deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Visual adjustment filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterInput {
    /// Gaussian blur radius.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
    /// Brightness multiplier (1 = identity).
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    /// Contrast multiplier (1 = identity).
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
    /// Saturation multiplier (1 = identity).
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f64>,
    /// Hue rotation in degrees.
    #[serde(
        alias = "hue",
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none",
    )]
    pub hue_rotate: Option<f64>,
    /// Sepia amount.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub sepia: Option<f64>,
    /// Grayscale amount.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub grayscale: Option<f64>,
    /// Invert amount.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub invert: Option<f64>,
}

/// Effects shared by every layer type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectProperties {
    /// Adjustment filters.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterInput>,
    /// Drop shadow.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowInput>,
    /// Outer glow.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub glow: Option<GlowInput>,
}
