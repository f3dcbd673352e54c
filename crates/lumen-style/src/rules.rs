//! Numeric property rules: a default and an inclusive range.

use serde::Serialize;

/// `(default, min, max)` for one numeric property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumberRule {
    /// Value used when the property is absent.
    pub default: f64,
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
}

impl NumberRule {
    /// Define a rule.
    #[must_use]
    pub const fn new(default: f64, min: f64, max: f64) -> Self {
        Self { default, min, max }
    }

    /// Clamp a present value, or take the default.
    #[must_use]
    pub fn apply(&self, raw: Option<f64>) -> f64 {
        self.apply_or(raw, self.default)
    }

    /// Like [`apply`](Self::apply) with a caller-supplied default (used
    /// where the default depends on the layer, e.g. line endpoints).
    #[must_use]
    pub fn apply_or(&self, raw: Option<f64>, default: f64) -> f64 {
        match raw {
            Some(v) if v.is_finite() => v.clamp(self.min, self.max),
            _ => default,
        }
    }

    /// Round to the nearest integer before clamping (counts such as polygon
    /// sides).
    #[must_use]
    pub fn apply_count(&self, raw: Option<f64>) -> u32 {
        self.apply(raw.map(f64::round)) as u32
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Canvas
// ─────────────────────────────────────────────────────────────────────────────

/// Canvas width.
pub const CANVAS_WIDTH: NumberRule = NumberRule::new(800.0, 1.0, 100_000.0);
/// Canvas height.
pub const CANVAS_HEIGHT: NumberRule = NumberRule::new(600.0, 1.0, 100_000.0);

// ─────────────────────────────────────────────────────────────────────────────
// Transform
// ─────────────────────────────────────────────────────────────────────────────

/// Layer width and height.
pub const SIZE: NumberRule = NumberRule::new(100.0, 0.0, 100_000.0);
/// Layer rotation in degrees.
pub const ROTATION: NumberRule = NumberRule::new(0.0, -360.0, 360.0);
/// Layer scale factors.
pub const SCALE: NumberRule = NumberRule::new(1.0, -100.0, 100.0);
/// Any opacity.
pub const OPACITY: NumberRule = NumberRule::new(1.0, 0.0, 1.0);

// ─────────────────────────────────────────────────────────────────────────────
// Text
// ─────────────────────────────────────────────────────────────────────────────

/// Font size in pixels.
pub const FONT_SIZE: NumberRule = NumberRule::new(16.0, 1.0, 500.0);
/// Line height multiplier.
pub const LINE_HEIGHT: NumberRule = NumberRule::new(1.2, 0.5, 5.0);
/// Letter spacing in pixels.
pub const LETTER_SPACING: NumberRule = NumberRule::new(0.0, -50.0, 100.0);

// ─────────────────────────────────────────────────────────────────────────────
// Shape
// ─────────────────────────────────────────────────────────────────────────────

/// Stroke width (also vector override stroke width and image border width).
pub const STROKE_WIDTH: NumberRule = NumberRule::new(0.0, 0.0, 100.0);
/// Corner radius before the geometric `min(w, h) / 2` clamp.
pub const CORNER_RADIUS: NumberRule = NumberRule::new(0.0, 0.0, 10_000.0);
/// Regular polygon side count.
pub const SIDES: NumberRule = NumberRule::new(6.0, 3.0, 20.0);
/// Star point count.
pub const STAR_POINTS: NumberRule = NumberRule::new(5.0, 3.0, 20.0);
/// Star inner radius ratio.
pub const INNER_RADIUS: NumberRule = NumberRule::new(0.5, 0.1, 0.9);
/// Unbounded layer-local coordinate (line endpoints, clip geometry).
pub const COORDINATE: NumberRule = NumberRule::new(0.0, -100_000.0, 100_000.0);

// ─────────────────────────────────────────────────────────────────────────────
// Paint
// ─────────────────────────────────────────────────────────────────────────────

/// Gradient stop offset.
pub const STOP_OFFSET: NumberRule = NumberRule::new(0.0, 0.0, 1.0);
/// Linear gradient angle.
pub const ANGLE: NumberRule = NumberRule::new(0.0, -360.0, 360.0);
/// Radial center coordinates.
pub const CENTER: NumberRule = NumberRule::new(0.5, 0.0, 1.0);
/// Radial radius.
pub const RADIUS: NumberRule = NumberRule::new(0.5, 0.0, 1.0);
/// Pattern feature size.
pub const PATTERN_SIZE: NumberRule = NumberRule::new(10.0, 1.0, 200.0);
/// Pattern spacing.
pub const PATTERN_SPACING: NumberRule = NumberRule::new(10.0, 0.0, 200.0);

// ─────────────────────────────────────────────────────────────────────────────
// Effects
// ─────────────────────────────────────────────────────────────────────────────

/// Shadow and glow blur radius.
pub const EFFECT_BLUR: NumberRule = NumberRule::new(10.0, 0.0, 100.0);
/// Shadow offsets.
pub const SHADOW_OFFSET: NumberRule = NumberRule::new(4.0, -500.0, 500.0);
/// Shadow opacity.
pub const SHADOW_OPACITY: NumberRule = NumberRule::new(0.5, 0.0, 1.0);
/// Glow opacity.
pub const GLOW_OPACITY: NumberRule = NumberRule::new(0.8, 0.0, 1.0);
/// Blur filter radius.
pub const BLUR: NumberRule = NumberRule::new(0.0, 0.0, 50.0);
/// Brightness, contrast, saturation (1 = identity).
pub const LEVEL: NumberRule = NumberRule::new(1.0, 0.0, 3.0);
/// Hue rotation in degrees.
pub const HUE_ROTATE: NumberRule = NumberRule::new(0.0, -360.0, 360.0);
/// Sepia, grayscale, invert amounts.
pub const AMOUNT: NumberRule = NumberRule::new(0.0, 0.0, 1.0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_clamps_and_defaults() {
        assert_eq!(LEVEL.apply(Some(10.0)), 3.0);
        assert_eq!(BLUR.apply(Some(-5.0)), 0.0);
        assert_eq!(FONT_SIZE.apply(None), 16.0);
        assert_eq!(OPACITY.apply(Some(f64::NAN)), 1.0);
    }

    #[test]
    fn test_apply_count_rounds() {
        assert_eq!(SIDES.apply_count(Some(4.6)), 5);
        assert_eq!(SIDES.apply_count(Some(1.0)), 3);
        assert_eq!(STAR_POINTS.apply_count(Some(99.0)), 20);
        assert_eq!(STAR_POINTS.apply_count(None), 5);
    }
}
