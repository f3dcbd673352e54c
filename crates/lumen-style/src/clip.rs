//! Clip and mask normalization for group layers.
//!
//! Shorthand rules:
//! - `true` enables the default kind (rectangle clip, gradient mask).
//! - `false` or absent disables.
//! - An object takes effect only when it carries `enabled: true`, even if it
//!   names a kind.

use lumen_common::warning::warn_once;
use lumen_model::{ClipConfig, ClipInput, MaskConfig, MaskInput};
use serde::Serialize;

use crate::color::Color;
use crate::enums::{ClipKind, MaskKind, MaskShape, parse_or_default};
use crate::fill::{GradientStop, normalize_stops};
use crate::rules;

/// Clip geometry in layer-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Clip {
    /// Rounded rectangle.
    Rectangle {
        /// Left.
        x: f64,
        /// Top.
        y: f64,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
        /// Corner radius (clamped by the geometry library).
        corner_radius: f64,
    },
    /// Circle.
    Circle {
        /// Center x.
        cx: f64,
        /// Center y.
        cy: f64,
        /// Radius.
        r: f64,
    },
    /// Ellipse.
    Ellipse {
        /// Center x.
        cx: f64,
        /// Center y.
        cy: f64,
        /// X radius.
        rx: f64,
        /// Y radius.
        ry: f64,
    },
    /// Closed polygon.
    Polygon {
        /// Vertices.
        points: Vec<(f64, f64)>,
    },
    /// Validated path data.
    Path {
        /// The `d` attribute.
        data: String,
    },
}

/// Mask content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Mask {
    /// Linear gradient of white at the stop opacities.
    Gradient {
        /// Direction in degrees.
        angle: f64,
        /// Stops.
        stops: Vec<GradientStop>,
    },
    /// External image stretched to the bounds.
    Image {
        /// Image source.
        src: String,
    },
    /// Solid white shape.
    Shape {
        /// Which shape.
        shape: MaskShape,
    },
}

/// Path data may only contain command letters, digits, whitespace, and
/// number punctuation, and must start with a moveto.
#[must_use]
pub fn is_valid_path_data(data: &str) -> bool {
    let data = data.trim();
    if !data.starts_with(['M', 'm']) {
        return false;
    }
    data.chars().all(|c| {
        matches!(
            c,
            'M' | 'm' | 'L' | 'l' | 'H' | 'h' | 'V' | 'v' | 'C' | 'c' | 'S' | 's' | 'Q' | 'q'
                | 'T' | 't' | 'A' | 'a' | 'Z' | 'z' | ',' | '.' | '-' | '+' | 'e' | 'E'
        ) || c.is_ascii_digit()
            || c.is_ascii_whitespace()
    })
}

/// Resolve a clip config for a layer of size `w × h`.
#[must_use]
pub fn normalize_clip(raw: Option<&ClipInput>, w: f64, h: f64) -> Option<Clip> {
    match raw? {
        ClipInput::Flag(false) => None,
        ClipInput::Flag(true) => Some(clip_from_config(&ClipConfig::default(), w, h)),
        ClipInput::Config(config) if config.enabled == Some(true) => {
            let clip = clip_from_config(config, w, h);
            match &clip {
                Clip::Path { data } if !is_valid_path_data(data) => {
                    let _ = warn_once("style", &format!("rejected clip path data '{data}'"));
                    None
                }
                _ => Some(clip),
            }
        }
        ClipInput::Config(_) => None,
    }
}

fn clip_from_config(config: &ClipConfig, w: f64, h: f64) -> Clip {
    let coord = |raw, default| rules::COORDINATE.apply_or(raw, default);
    let size = |raw, default| rules::SIZE.apply_or(raw, default);
    match parse_or_default::<ClipKind>(config.clip_type.as_deref(), "clip type") {
        ClipKind::Rectangle => Clip::Rectangle {
            x: coord(config.x, 0.0),
            y: coord(config.y, 0.0),
            width: size(config.width, w),
            height: size(config.height, h),
            corner_radius: rules::CORNER_RADIUS.apply(config.corner_radius),
        },
        ClipKind::Circle => Clip::Circle {
            cx: coord(config.cx, w / 2.0),
            cy: coord(config.cy, h / 2.0),
            r: size(config.radius, w.min(h) / 2.0),
        },
        ClipKind::Ellipse => Clip::Ellipse {
            cx: coord(config.cx, w / 2.0),
            cy: coord(config.cy, h / 2.0),
            rx: size(config.rx, w / 2.0),
            ry: size(config.ry, h / 2.0),
        },
        ClipKind::Polygon => {
            let points: Vec<(f64, f64)> = config
                .points
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|p| {
                    let (x, y) = p.xy();
                    (coord(Some(x), 0.0), coord(Some(y), 0.0))
                })
                .collect();
            let points = if points.len() >= 3 {
                points
            } else {
                vec![(w / 2.0, 0.0), (w, h), (0.0, h)]
            };
            Clip::Polygon { points }
        }
        ClipKind::Path => Clip::Path {
            data: config.path.clone().unwrap_or_default(),
        },
    }
}

/// The gradient used by `mask: true`: white fading to transparent.
#[must_use]
pub fn default_mask_stops() -> Vec<GradientStop> {
    vec![
        GradientStop {
            offset: 0.0,
            color: Color::WHITE,
            opacity: 1.0,
        },
        GradientStop {
            offset: 1.0,
            color: Color::WHITE,
            opacity: 0.0,
        },
    ]
}

/// Resolve a mask config.
#[must_use]
pub fn normalize_mask(raw: Option<&MaskInput>) -> Option<Mask> {
    match raw? {
        MaskInput::Flag(false) => None,
        MaskInput::Flag(true) => Some(Mask::Gradient {
            angle: rules::ANGLE.default,
            stops: default_mask_stops(),
        }),
        MaskInput::Config(config) if config.enabled == Some(true) => mask_from_config(config),
        MaskInput::Config(_) => None,
    }
}

fn mask_from_config(config: &MaskConfig) -> Option<Mask> {
    match parse_or_default::<MaskKind>(config.mask_type.as_deref(), "mask type") {
        MaskKind::Gradient => Some(Mask::Gradient {
            angle: rules::ANGLE.apply(config.angle),
            stops: match config.stops.as_deref() {
                Some(stops) if !stops.is_empty() => normalize_stops(Some(stops)),
                _ => default_mask_stops(),
            },
        }),
        MaskKind::Image => match config.src.as_deref().map(str::trim) {
            Some(src) if !src.is_empty() => Some(Mask::Image {
                src: src.to_string(),
            }),
            _ => {
                let _ = warn_once("style", "image mask without src, mask disabled");
                None
            }
        },
        MaskKind::Shape => Some(Mask::Shape {
            shape: parse_or_default(config.shape.as_deref(), "mask shape"),
        }),
    }
}
