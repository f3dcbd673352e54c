//! Shape and clip geometry.
//!
//! All coordinates are layer-local: origin at the top-left corner, `w` and
//! `h` the layer size. Both targets draw from these functions, so exported
//! and on-canvas silhouettes are identical.

use std::f64::consts::PI;
use std::fmt::Write;

use lumen_style::{Clip, LineEnds};
use serde::Serialize;

/// A point in layer-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    /// X.
    pub x: f64,
    /// Y.
    pub y: f64,
}

impl Point {
    /// Construct a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Format a number compactly: at most four decimals, no trailing zeros,
/// never `-0`.
#[must_use]
pub fn fmt_num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let mut s = format!("{value:.4}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Corner radius clamped to `[0, min(w, h) / 2]`.
#[must_use]
pub fn rect_corner_radius(radius: f64, w: f64, h: f64) -> f64 {
    radius.clamp(0.0, (w.min(h) / 2.0).max(0.0))
}

/// Center of the layer box.
#[must_use]
pub fn center(w: f64, h: f64) -> Point {
    Point::new(w / 2.0, h / 2.0)
}

/// Circle inscribed in the box: `(center, r)`.
#[must_use]
pub fn circle(w: f64, h: f64) -> (Point, f64) {
    (center(w, h), w.min(h) / 2.0)
}

/// Ellipse filling the box: `(center, rx, ry)`.
#[must_use]
pub fn ellipse(w: f64, h: f64) -> (Point, f64, f64) {
    (center(w, h), w / 2.0, h / 2.0)
}

/// Regular polygon; vertex 0 points up.
#[must_use]
pub fn regular_polygon(sides: u32, w: f64, h: f64) -> Vec<Point> {
    let c = center(w, h);
    let r = w.min(h) / 2.0;
    let step = 2.0 * PI / f64::from(sides);
    (0..sides)
        .map(|i| {
            let theta = f64::from(i) * step - PI / 2.0;
            Point::new(c.x + r * theta.cos(), c.y + r * theta.sin())
        })
        .collect()
}

/// Star with `2 * points` vertices alternating outer and inner radius,
/// starting at the top.
#[must_use]
pub fn star(points: u32, inner_ratio: f64, w: f64, h: f64) -> Vec<Point> {
    let c = center(w, h);
    let outer = w.min(h) / 2.0;
    let inner = outer * inner_ratio;
    let step = PI / f64::from(points);
    (0..points * 2)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let theta = f64::from(i) * step - PI / 2.0;
            Point::new(c.x + r * theta.cos(), c.y + r * theta.sin())
        })
        .collect()
}

/// Line endpoints; missing ends default to the horizontal mid-line.
#[must_use]
pub fn line(ends: &LineEnds, w: f64, h: f64) -> (Point, Point) {
    (
        Point::new(ends.x1.unwrap_or(0.0), ends.y1.unwrap_or(h / 2.0)),
        Point::new(ends.x2.unwrap_or(w), ends.y2.unwrap_or(h / 2.0)),
    )
}

/// Right-pointing arrow: a shaft 40% of the height, and a head spanning
/// the last 20% of the width.
#[must_use]
pub fn arrow(w: f64, h: f64) -> [Point; 7] {
    let neck = 0.8 * w;
    [
        Point::new(0.0, 0.3 * h),
        Point::new(neck, 0.3 * h),
        Point::new(neck, 0.0),
        Point::new(w, h / 2.0),
        Point::new(neck, h),
        Point::new(neck, 0.7 * h),
        Point::new(0.0, 0.7 * h),
    ]
}

/// `points` attribute: `x,y x,y ...`.
#[must_use]
pub fn points_attr(points: &[Point]) -> String {
    let mut out = String::new();
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{},{}", fmt_num(p.x), fmt_num(p.y));
    }
    out
}

/// Closed path data through the points.
#[must_use]
pub fn closed_path(points: &[Point]) -> String {
    let mut out = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(out, "{cmd}{} {} ", fmt_num(p.x), fmt_num(p.y));
    }
    out.push('Z');
    out
}

/// Parse a `points` attribute back into points.
#[must_use]
pub fn parse_points(attr: &str) -> Vec<Point> {
    let numbers: Vec<f64> = attr
        .split(|c: char| c == ',' || c.is_ascii_whitespace())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    numbers
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect()
}

/// Resolved clip outline, ready to emit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "kebab-case")]
pub enum ClipShape {
    /// Rounded rectangle with the corner radius already clamped.
    Rect {
        /// Left.
        x: f64,
        /// Top.
        y: f64,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
        /// Corner radius.
        rx: f64,
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
    /// Polygon.
    Polygon {
        /// Vertices.
        points: Vec<Point>,
    },
    /// Path data.
    Path {
        /// The `d` attribute.
        d: String,
    },
}

impl ClipShape {
    /// Geometry for a normalized clip.
    #[must_use]
    pub fn from_clip(clip: &Clip) -> Self {
        match clip {
            Clip::Rectangle {
                x,
                y,
                width,
                height,
                corner_radius,
            } => Self::Rect {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
                rx: rect_corner_radius(*corner_radius, *width, *height),
            },
            Clip::Circle { cx, cy, r } => Self::Circle {
                cx: *cx,
                cy: *cy,
                r: *r,
            },
            Clip::Ellipse { cx, cy, rx, ry } => Self::Ellipse {
                cx: *cx,
                cy: *cy,
                rx: *rx,
                ry: *ry,
            },
            Clip::Polygon { points } => Self::Polygon {
                points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            },
            Clip::Path { data } => Self::Path { d: data.clone() },
        }
    }

    /// A rounded-rectangle clip covering the box.
    #[must_use]
    pub fn rounded_rect(w: f64, h: f64, radius: f64) -> Self {
        Self::Rect {
            x: 0.0,
            y: 0.0,
            width: w,
            height: h,
            rx: rect_corner_radius(radius, w, h),
        }
    }
}
