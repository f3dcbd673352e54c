//! Enumerated style properties.
//!
//! Every enum parses case-insensitively through `strum`; an unknown value
//! falls back to the enum's `Default` and is reported once.

use std::fmt;
use std::str::FromStr;

use lumen_common::warning::warn_once;
use serde::Serialize;
use strum_macros::{AsRefStr, EnumString};

/// Parse an optional raw enum value, falling back to `T::default()`.
#[must_use]
pub fn parse_or_default<T: FromStr + Default>(raw: Option<&str>, property: &str) -> T {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return T::default();
    };
    raw.parse().unwrap_or_else(|_| {
        let _ = warn_once("style", &format!("unknown {property} '{raw}', using default"));
        T::default()
    })
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlign {
    /// Anchor at x = 0.
    #[default]
    Left,
    /// Anchor at x = w / 2.
    Center,
    /// Anchor at x = w.
    Right,
}

impl TextAlign {
    /// The `text-anchor` value.
    #[must_use]
    pub const fn anchor(self) -> &'static str {
        match self {
            Self::Left => "start",
            Self::Center => "middle",
            Self::Right => "end",
        }
    }

    /// The anchor x coordinate for a box of width `w`.
    #[must_use]
    pub fn anchor_x(self, w: f64) -> f64 {
        match self {
            Self::Left => 0.0,
            Self::Center => w / 2.0,
            Self::Right => w,
        }
    }
}

/// Font weight: `normal`, `bold`, or a multiple of 100 in `[100, 900]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FontWeight {
    /// `normal`.
    #[default]
    Normal,
    /// `bold`.
    Bold,
    /// Numeric weight.
    Numeric(u16),
}

impl FromStr for FontWeight {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("normal") {
            return Ok(Self::Normal);
        }
        if s.eq_ignore_ascii_case("bold") {
            return Ok(Self::Bold);
        }
        match s.parse::<u16>() {
            Ok(n) if (100..=900).contains(&n) && n % 100 == 0 => Ok(Self::Numeric(n)),
            _ => Err(strum::ParseError::VariantNotFound),
        }
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("normal"),
            Self::Bold => f.write_str("bold"),
            Self::Numeric(n) => write!(f, "{n}"),
        }
    }
}

/// Font style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Italic.
    Italic,
}

/// Text decoration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    /// No decoration.
    #[default]
    None,
    /// Underline.
    Underline,
    /// Strike-through.
    LineThrough,
}

/// Shape kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeType {
    /// Rectangle with optional rounded corners.
    #[default]
    Rectangle,
    /// Circle inscribed in the layer box.
    Circle,
    /// Ellipse filling the layer box.
    Ellipse,
    /// Regular polygon.
    Polygon,
    /// Star.
    Star,
    /// Straight line.
    Line,
    /// Right-pointing arrow.
    Arrow,
}

/// Stroke dash style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum StrokeStyle {
    /// Continuous.
    #[default]
    Solid,
    /// `4w 2w`.
    Dashed,
    /// `w 2w`.
    Dotted,
}

impl StrokeStyle {
    /// The dash array for a stroke of width `w`, if any.
    #[must_use]
    pub fn dash_array(self, w: f64) -> Option<[f64; 2]> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some([4.0 * w, 2.0 * w]),
            Self::Dotted => Some([w, 2.0 * w]),
        }
    }
}

/// How an image fits its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectFit {
    /// Stretch to the frame.
    Fill,
    /// Fit inside, letterboxed.
    Contain,
    /// Cover the frame, cropped.
    #[default]
    Cover,
}

impl ObjectFit {
    /// The `preserveAspectRatio` value.
    #[must_use]
    pub const fn preserve_aspect_ratio(self) -> &'static str {
        match self {
            Self::Fill => "none",
            Self::Contain => "xMidYMid meet",
            Self::Cover => "xMidYMid slice",
        }
    }
}

/// Fill kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum FillKind {
    /// Flat color.
    #[default]
    Solid,
    /// Linear gradient.
    Linear,
    /// Radial gradient.
    Radial,
    /// Repeating pattern.
    Pattern,
}

/// Pattern tile content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    /// Centered circles.
    #[default]
    Dots,
    /// Diagonal stripes.
    Stripes,
    /// Grid lines.
    Grid,
}

/// Clip geometry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum ClipKind {
    /// Rectangle, defaulting to the layer bounds.
    #[default]
    Rectangle,
    /// Circle.
    Circle,
    /// Ellipse.
    Ellipse,
    /// Polygon.
    Polygon,
    /// Raw path data.
    Path,
}

/// Mask kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum MaskKind {
    /// Linear luminance gradient.
    #[default]
    Gradient,
    /// External image stretched to the bounds.
    Image,
    /// Solid white shape.
    Shape,
}

/// Mask shape for [`MaskKind::Shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum MaskShape {
    /// Full-bounds rectangle.
    #[default]
    Rectangle,
    /// Inscribed circle.
    Circle,
    /// Inscribed ellipse.
    Ellipse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(parse_or_default::<ShapeType>(Some("STAR"), "shapeType"), ShapeType::Star);
        assert_eq!(
            parse_or_default::<TextDecoration>(Some("line-through"), "textDecoration"),
            TextDecoration::LineThrough
        );
    }

    #[test]
    fn test_invalid_falls_back_to_default() {
        assert_eq!(parse_or_default::<ObjectFit>(Some("tile"), "objectFit"), ObjectFit::Cover);
        assert_eq!(parse_or_default::<TextAlign>(None, "textAlign"), TextAlign::Left);
        assert_eq!(parse_or_default::<FontWeight>(Some("450"), "fontWeight"), FontWeight::Normal);
        assert_eq!(
            parse_or_default::<FontWeight>(Some("700"), "fontWeight"),
            FontWeight::Numeric(700)
        );
    }

    #[test]
    fn test_dash_arrays() {
        assert_eq!(StrokeStyle::Dashed.dash_array(2.0), Some([8.0, 4.0]));
        assert_eq!(StrokeStyle::Dotted.dash_array(3.0), Some([3.0, 6.0]));
        assert_eq!(StrokeStyle::Solid.dash_array(3.0), None);
    }
}
