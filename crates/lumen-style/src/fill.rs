//! Normalized fills.

use lumen_model::{FillConfig, FillInput, GradientStopInput};
use serde::Serialize;

use crate::color::{Color, resolve_color, resolve_optional_color};
use crate::enums::{FillKind, PatternKind, parse_or_default};
use crate::rules;

/// A fully resolved fill.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Fill {
    /// Flat color.
    Solid(SolidFill),
    /// Linear gradient.
    Linear(LinearGradient),
    /// Radial gradient.
    Radial(RadialGradient),
    /// Repeating pattern.
    Pattern(PatternFill),
}

/// A flat color; `color` is opaque and all alpha lives in `opacity`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolidFill {
    /// The color.
    pub color: Color,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

impl SolidFill {
    /// Fold a color's alpha into an opacity.
    #[must_use]
    pub fn new(color: Color, opacity: f64) -> Self {
        Self {
            color: color.opaque(),
            opacity: (opacity * color.alpha).clamp(0.0, 1.0),
        }
    }

    /// Nothing would be painted.
    #[must_use]
    pub fn is_invisible(&self) -> bool {
        self.opacity <= 0.0
    }
}

/// One gradient stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradientStop {
    /// Offset in `[0, 1]`.
    pub offset: f64,
    /// Opaque color.
    pub color: Color,
    /// Stop opacity in `[0, 1]`.
    pub opacity: f64,
}

/// Linear gradient along `angle` degrees (0 = left to right).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearGradient {
    /// Direction in degrees.
    pub angle: f64,
    /// Stops in input order.
    pub stops: Vec<GradientStop>,
}

impl LinearGradient {
    /// Fractional endpoints `(x1, y1, x2, y2)` in the bounding box.
    #[must_use]
    pub fn endpoints(&self) -> (f64, f64, f64, f64) {
        let theta = self.angle.to_radians();
        let (sin, cos) = theta.sin_cos();
        (
            0.5 - 0.5 * cos,
            0.5 - 0.5 * sin,
            0.5 + 0.5 * cos,
            0.5 + 0.5 * sin,
        )
    }
}

/// Radial gradient in bounding-box fractions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadialGradient {
    /// Center x in `[0, 1]`.
    pub center_x: f64,
    /// Center y in `[0, 1]`.
    pub center_y: f64,
    /// Radius in `[0, 1]`.
    pub radius: f64,
    /// Stops in input order.
    pub stops: Vec<GradientStop>,
}

/// Repeating pattern tile parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatternFill {
    /// Tile content.
    pub kind: PatternKind,
    /// Feature size.
    pub size: f64,
    /// Gap between features.
    pub spacing: f64,
    /// Feature color.
    pub foreground: Color,
    /// Tile background, if any.
    pub background: Option<Color>,
}

impl PatternFill {
    /// Tile edge length.
    #[must_use]
    pub fn tile(&self) -> f64 {
        self.size + self.spacing
    }
}

impl Fill {
    /// An opaque solid fill.
    #[must_use]
    pub fn solid(color: Color) -> Self {
        Self::Solid(SolidFill::new(color, 1.0))
    }
}

/// The stops used when a gradient has none.
#[must_use]
pub fn default_stops() -> Vec<GradientStop> {
    vec![
        GradientStop {
            offset: 0.0,
            color: Color::BLACK,
            opacity: 1.0,
        },
        GradientStop {
            offset: 1.0,
            color: Color::WHITE,
            opacity: 1.0,
        },
    ]
}

/// Normalize a list of raw stops, keeping input order.
#[must_use]
pub fn normalize_stops(raw: Option<&[GradientStopInput]>) -> Vec<GradientStop> {
    let stops: Vec<GradientStop> = raw
        .unwrap_or_default()
        .iter()
        .map(|stop| {
            let color = resolve_color(stop.color.as_deref(), Color::BLACK);
            GradientStop {
                offset: rules::STOP_OFFSET.apply(stop.stop),
                color: color.opaque(),
                opacity: rules::OPACITY.apply(stop.opacity) * color.alpha,
            }
        })
        .collect();
    if stops.is_empty() { default_stops() } else { stops }
}

/// Normalize an optional fill. `None` input yields `default`.
#[must_use]
pub fn normalize_fill(raw: Option<&FillInput>, default: Option<Fill>) -> Option<Fill> {
    match raw {
        None => default,
        Some(FillInput::Color(color)) => {
            Some(Fill::solid(resolve_color(Some(color), Color::BLACK)))
        }
        Some(FillInput::Config(config)) => Some(normalize_config(config, default.as_ref())),
    }
}

fn normalize_config(config: &FillConfig, default: Option<&Fill>) -> Fill {
    let kind: FillKind = parse_or_default(config.fill_type.as_deref(), "fill type");
    match kind {
        FillKind::Solid => {
            let fallback = match default {
                Some(Fill::Solid(solid)) => solid.color,
                _ => Color::BLACK,
            };
            let color = resolve_color(config.color.as_deref(), fallback);
            Fill::Solid(SolidFill::new(color, rules::OPACITY.apply(config.opacity)))
        }
        FillKind::Linear | FillKind::Radial => {
            let stops = normalize_stops(config.stops.as_deref());
            if let [only] = stops.as_slice() {
                return Fill::Solid(SolidFill::new(only.color, only.opacity));
            }
            if kind == FillKind::Linear {
                Fill::Linear(LinearGradient {
                    angle: rules::ANGLE.apply(config.angle),
                    stops,
                })
            } else {
                Fill::Radial(RadialGradient {
                    center_x: rules::CENTER.apply(config.center_x),
                    center_y: rules::CENTER.apply(config.center_y),
                    radius: rules::RADIUS.apply(config.radius),
                    stops,
                })
            }
        }
        FillKind::Pattern => {
            let colors = config.colors.as_deref().unwrap_or_default();
            Fill::Pattern(PatternFill {
                kind: parse_or_default(config.pattern.as_deref(), "pattern"),
                size: rules::PATTERN_SIZE.apply(config.size),
                spacing: rules::PATTERN_SPACING.apply(config.spacing),
                foreground: resolve_color(colors.first().map(String::as_str), Color::BLACK),
                background: resolve_optional_color(colors.get(1).map(String::as_str)),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(fill_type: &str) -> FillConfig {
        FillConfig {
            fill_type: Some(fill_type.to_string()),
            ..FillConfig::default()
        }
    }

    #[test]
    fn test_linear_endpoints() {
        let g = LinearGradient {
            angle: 0.0,
            stops: default_stops(),
        };
        assert_eq!(g.endpoints(), (0.0, 0.5, 1.0, 0.5));
        let down = LinearGradient {
            angle: 90.0,
            stops: default_stops(),
        };
        let (x1, y1, x2, y2) = down.endpoints();
        assert!((x1 - 0.5).abs() < 1e-12 && (x2 - 0.5).abs() < 1e-12);
        assert!(y1.abs() < 1e-12 && (y2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_gradient_gets_default_stops() {
        let fill = normalize_fill(Some(&FillInput::Config(config("linear"))), None);
        let Some(Fill::Linear(g)) = fill else {
            panic!("expected linear gradient");
        };
        assert_eq!(g.stops, default_stops());
    }

    #[test]
    fn test_single_stop_is_solid() {
        let mut c = config("radial");
        c.stops = Some(vec![GradientStopInput {
            color: Some("red".into()),
            stop: Some(0.3),
            opacity: None,
        }]);
        let fill = normalize_fill(Some(&FillInput::Config(c)), None);
        assert_eq!(fill, Some(Fill::solid(Color::rgb(255, 0, 0))));
    }

    #[test]
    fn test_rgba_alpha_folds_into_opacity() {
        let fill = normalize_fill(Some(&FillInput::color("rgba(0,0,0,0.5)")), None);
        let Some(Fill::Solid(solid)) = fill else {
            panic!("expected solid");
        };
        assert_eq!(solid.color, Color::BLACK);
        assert!((solid.opacity - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_pattern_colors() {
        let mut c = config("pattern");
        c.pattern = Some("grid".into());
        c.colors = Some(vec!["#fff".into(), "navy".into()]);
        c.size = Some(0.0);
        let Some(Fill::Pattern(p)) = normalize_fill(Some(&FillInput::Config(c)), None) else {
            panic!("expected pattern");
        };
        assert_eq!(p.kind, PatternKind::Grid);
        assert_eq!(p.size, 1.0);
        assert_eq!(p.tile(), 11.0);
        assert_eq!(p.foreground, Color::WHITE);
        assert_eq!(p.background, Some(Color::rgb(0, 0, 128)));
    }
}
