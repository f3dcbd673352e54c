//! Color values.
//!
//! Accepted notations: `#rgb`, `#rrggbb`, `rgb(r, g, b)`, `rgba(r, g, b, a)`
//! and a small named-color table. Anything else resolves to black.

use lumen_common::warning::warn_once;
use serde::Serialize;

/// sRGB color with a separate alpha multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    /// Red channel (0-255).
    pub r: u8,
    /// Green channel (0-255).
    pub g: u8,
    /// Blue channel (0-255).
    pub b: u8,
    /// Alpha in `[0, 1]`; only `rgba()` and `transparent` produce values below 1.
    pub alpha: f64,
}

impl Color {
    /// Opaque black, the fallback for unparseable colors.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        alpha: 0.0,
    };

    /// An opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 1.0 }
    }

    /// Parse any accepted notation.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.starts_with('#') {
            return Self::from_hex(input);
        }
        let lower = input.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            return Self::from_rgb_function(args.strip_suffix(')')?);
        }
        Self::from_named(&lower)
    }

    /// `#rgb` or `#rrggbb`.
    ///
    /// The three-digit form is expanded by replicating digits, not by adding
    /// zeros.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
                Some(Self::rgb(r, g, b))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::rgb(r, g, b))
            }
            _ => None,
        }
    }

    /// The body of `rgb(...)` / `rgba(...)`, without the closing paren.
    ///
    /// Channels are numbers or percentages and clamp to `[0, 255]`; alpha
    /// clamps to `[0, 1]`.
    fn from_rgb_function(args: &str) -> Option<Self> {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        let channel = |part: &str| -> Option<u8> {
            let value = match part.strip_suffix('%') {
                Some(pct) => pct.trim().parse::<f64>().ok()? * 2.55,
                None => part.parse::<f64>().ok()?,
            };
            value.is_finite().then(|| value.round().clamp(0.0, 255.0) as u8)
        };
        let alpha = match parts.get(3) {
            Some(part) => {
                let value = match part.strip_suffix('%') {
                    Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0,
                    None => part.parse::<f64>().ok()?,
                };
                if !value.is_finite() {
                    return None;
                }
                value.clamp(0.0, 1.0)
            }
            None => 1.0,
        };
        Some(Self {
            r: channel(parts[0])?,
            g: channel(parts[1])?,
            b: channel(parts[2])?,
            alpha,
        })
    }

    /// The named-color table: the 16 basic colors plus a few common extras.
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" => Self::rgb(0, 0, 0),
            "white" => Self::rgb(255, 255, 255),
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "silver" => Self::rgb(192, 192, 192),
            "maroon" => Self::rgb(128, 0, 0),
            "purple" => Self::rgb(128, 0, 128),
            "fuchsia" | "magenta" => Self::rgb(255, 0, 255),
            "lime" => Self::rgb(0, 255, 0),
            "olive" => Self::rgb(128, 128, 0),
            "navy" => Self::rgb(0, 0, 128),
            "teal" => Self::rgb(0, 128, 128),
            "aqua" | "cyan" => Self::rgb(0, 255, 255),
            "orange" => Self::rgb(255, 165, 0),
            "pink" => Self::rgb(255, 192, 203),
            "brown" => Self::rgb(165, 42, 42),
            "transparent" => Self::TRANSPARENT,
            _ => return None,
        };
        Some(color)
    }

    /// `#rrggbb`, ignoring alpha.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// The same color at full alpha.
    #[must_use]
    pub const fn opaque(self) -> Self {
        Self::rgb(self.r, self.g, self.b)
    }

    /// True when nothing would be painted.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.alpha <= 0.0
    }
}

/// Resolve an optional raw color: missing takes `default`, invalid becomes
/// black (and is reported once).
#[must_use]
pub fn resolve_color(raw: Option<&str>, default: Color) -> Color {
    match raw {
        None => default,
        Some(s) if s.trim().is_empty() => default,
        Some(s) => Color::parse(s).unwrap_or_else(|| {
            let _ = warn_once("style", &format!("invalid color '{s}', using #000000"));
            Color::BLACK
        }),
    }
}

/// Resolve a color that has no default: missing stays missing.
#[must_use]
pub fn resolve_optional_color(raw: Option<&str>) -> Option<Color> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| resolve_color(Some(s), Color::BLACK))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(Color::parse("#f00"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("#00FF7f"), Some(Color::rgb(0, 255, 127)));
        assert_eq!(Color::parse("#12345"), None);
        assert_eq!(Color::parse("#ggg"), None);
    }

    #[test]
    fn test_rgb_functions() {
        assert_eq!(Color::parse("rgb(10, 20, 30)"), Some(Color::rgb(10, 20, 30)));
        assert_eq!(Color::parse("RGB(300,-4,0)"), Some(Color::rgb(255, 0, 0)));
        let c = Color::parse("rgba(0, 0, 255, 0.25)").expect("rgba");
        assert_eq!((c.b, c.alpha), (255, 0.25));
        assert_eq!(Color::parse("rgb(1, 2)"), None);
        assert_eq!(Color::parse("rgb(1, 2, 3"), None);
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(Color::parse("Orange"), Some(Color::rgb(255, 165, 0)));
        assert!(Color::parse("transparent").is_some_and(|c| c.is_transparent()));
        assert_eq!(Color::parse("rebeccapurple"), None);
    }

    #[test]
    fn test_resolve_color_fallbacks() {
        assert_eq!(resolve_color(None, Color::WHITE), Color::WHITE);
        assert_eq!(resolve_color(Some("nope"), Color::WHITE), Color::BLACK);
        assert_eq!(resolve_optional_color(None), None);
        assert_eq!(resolve_color(Some("#abc"), Color::WHITE).to_hex(), "#aabbcc");
    }
}
