//! Canvas-level properties.

use lumen_model::Design;
use serde::Serialize;

use crate::color::Color;
use crate::fill::{Fill, normalize_fill};
use crate::rules;

/// Resolved canvas size and background.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Background paint; white when absent.
    pub background: Fill,
}

/// Resolve the canvas of a design.
#[must_use]
pub fn normalize_canvas(design: &Design) -> Canvas {
    let white = Fill::solid(Color::WHITE);
    Canvas {
        width: rules::CANVAS_WIDTH.apply(design.width),
        height: rules::CANVAS_HEIGHT.apply(design.height),
        background: normalize_fill(design.background.as_ref(), Some(white.clone()))
            .unwrap_or(white),
    }
}
