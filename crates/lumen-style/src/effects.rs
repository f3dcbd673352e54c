//! Normalized filters, shadow, and glow.

use lumen_model::{EffectProperties, FilterInput, GlowInput, ShadowInput};
use serde::Serialize;

use crate::color::{Color, resolve_color};
use crate::rules;

/// Adjustment filter amounts. Identity values mean "stage absent".
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilterSettings {
    /// Gaussian blur radius.
    pub blur: f64,
    /// Brightness multiplier (1 = identity).
    pub brightness: f64,
    /// Contrast multiplier (1 = identity).
    pub contrast: f64,
    /// Saturation multiplier (1 = identity).
    pub saturation: f64,
    /// Hue rotation in degrees.
    pub hue_rotate: f64,
    /// Sepia amount.
    pub sepia: f64,
    /// Grayscale amount.
    pub grayscale: f64,
    /// Invert amount.
    pub invert: f64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            blur: rules::BLUR.default,
            brightness: rules::LEVEL.default,
            contrast: rules::LEVEL.default,
            saturation: rules::LEVEL.default,
            hue_rotate: rules::HUE_ROTATE.default,
            sepia: rules::AMOUNT.default,
            grayscale: rules::AMOUNT.default,
            invert: rules::AMOUNT.default,
        }
    }
}

impl FilterSettings {
    /// Clamp every present amount into range.
    #[must_use]
    pub fn from_input(input: &FilterInput) -> Self {
        Self {
            blur: rules::BLUR.apply(input.blur),
            brightness: rules::LEVEL.apply(input.brightness),
            contrast: rules::LEVEL.apply(input.contrast),
            saturation: rules::LEVEL.apply(input.saturation),
            hue_rotate: rules::HUE_ROTATE.apply(input.hue_rotate),
            sepia: rules::AMOUNT.apply(input.sepia),
            grayscale: rules::AMOUNT.apply(input.grayscale),
            invert: rules::AMOUNT.apply(input.invert),
        }
    }

    /// No stage would change the image.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// Drop shadow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shadow {
    /// Opaque shadow color.
    pub color: Color,
    /// Blur radius.
    pub blur: f64,
    /// Horizontal offset.
    pub offset_x: f64,
    /// Vertical offset.
    pub offset_y: f64,
    /// Flood opacity.
    pub opacity: f64,
}

/// Outer glow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Glow {
    /// Opaque glow color.
    pub color: Color,
    /// Blur radius.
    pub blur: f64,
    /// Flood opacity.
    pub opacity: f64,
}

/// All effects attached to one layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Effects {
    /// Adjustment filters.
    pub filters: FilterSettings,
    /// Enabled shadow.
    pub shadow: Option<Shadow>,
    /// Enabled glow.
    pub glow: Option<Glow>,
}

impl Effects {
    /// Nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_identity() && self.shadow.is_none() && self.glow.is_none()
    }
}

/// Shadows are opt-in: `enabled` must be `true`.
fn normalize_shadow(input: &ShadowInput) -> Option<Shadow> {
    if input.enabled != Some(true) {
        return None;
    }
    let color = resolve_color(input.color.as_deref(), Color::BLACK);
    Some(Shadow {
        color: color.opaque(),
        blur: rules::EFFECT_BLUR.apply(input.blur),
        offset_x: rules::SHADOW_OFFSET.apply(input.offset_x),
        offset_y: rules::SHADOW_OFFSET.apply(input.offset_y),
        opacity: rules::SHADOW_OPACITY.apply(input.opacity) * color.alpha,
    })
}

fn normalize_glow(input: &GlowInput) -> Option<Glow> {
    if input.enabled != Some(true) {
        return None;
    }
    let color = resolve_color(input.color.as_deref(), Color::WHITE);
    Some(Glow {
        color: color.opaque(),
        blur: rules::EFFECT_BLUR.apply(input.blur),
        opacity: rules::GLOW_OPACITY.apply(input.opacity) * color.alpha,
    })
}

/// Normalize a layer's effect properties.
#[must_use]
pub fn normalize_effects(raw: Option<&EffectProperties>) -> Effects {
    let Some(raw) = raw else {
        return Effects::default();
    };
    Effects {
        filters: raw
            .filters
            .as_ref()
            .map(FilterSettings::from_input)
            .unwrap_or_default(),
        shadow: raw.shadow.as_ref().and_then(normalize_shadow),
        glow: raw.glow.as_ref().and_then(normalize_glow),
    }
}
