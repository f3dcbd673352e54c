//! The filter pipeline.
//!
//! Adjustment stages always run in this order:
//! blur, brightness, contrast, saturation, hue-rotate, sepia, grayscale,
//! invert. Shadow and then glow are composited after the adjustments.
//! A stage at its identity value is omitted.

use lumen_style::{Effects, FilterSettings, Glow, Shadow};
use serde::Serialize;

use crate::geometry::fmt_num;

/// One adjustment stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "stage", content = "amount", rename_all = "kebab-case")]
pub enum FilterStage {
    /// Gaussian blur standard deviation.
    Blur(f64),
    /// Linear brightness slope.
    Brightness(f64),
    /// Linear contrast slope around mid-gray.
    Contrast(f64),
    /// Saturation factor.
    Saturate(f64),
    /// Hue rotation in degrees.
    HueRotate(f64),
    /// Sepia amount.
    Sepia(f64),
    /// Grayscale amount.
    Grayscale(f64),
    /// Invert amount.
    Invert(f64),
}

impl FilterStage {
    /// Stage name as used in diagnostics and tests.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Blur(_) => "blur",
            Self::Brightness(_) => "brightness",
            Self::Contrast(_) => "contrast",
            Self::Saturate(_) => "saturate",
            Self::HueRotate(_) => "hue-rotate",
            Self::Sepia(_) => "sepia",
            Self::Grayscale(_) => "grayscale",
            Self::Invert(_) => "invert",
        }
    }
}

/// An ordered, normalized filter chain. This is the resource definition
/// that gets content-hashed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterChain {
    /// Adjustment stages in pipeline order.
    pub stages: Vec<FilterStage>,
    /// Drop shadow composited under the graphic.
    pub shadow: Option<Shadow>,
    /// Glow composited under the graphic (after the shadow).
    pub glow: Option<Glow>,
}

/// A backend-neutral filter primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPrimitive {
    /// Element name, e.g. `feGaussianBlur`.
    pub tag: &'static str,
    /// Attributes in output order.
    pub attrs: Vec<(&'static str, String)>,
    /// Transfer functions (`feFuncR` ...) for `feComponentTransfer`.
    pub children: Vec<FilterPrimitive>,
}

impl FilterPrimitive {
    fn new(tag: &'static str, attrs: Vec<(&'static str, String)>) -> Self {
        Self {
            tag,
            attrs,
            children: Vec::new(),
        }
    }

    /// Look up an attribute.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

fn stages_for(filters: &FilterSettings) -> Vec<FilterStage> {
    let candidates = [
        (filters.blur != 0.0, FilterStage::Blur(filters.blur)),
        (filters.brightness != 1.0, FilterStage::Brightness(filters.brightness)),
        (filters.contrast != 1.0, FilterStage::Contrast(filters.contrast)),
        (filters.saturation != 1.0, FilterStage::Saturate(filters.saturation)),
        (filters.hue_rotate != 0.0, FilterStage::HueRotate(filters.hue_rotate)),
        (filters.sepia != 0.0, FilterStage::Sepia(filters.sepia)),
        (filters.grayscale != 0.0, FilterStage::Grayscale(filters.grayscale)),
        (filters.invert != 0.0, FilterStage::Invert(filters.invert)),
    ];
    candidates
        .into_iter()
        .filter_map(|(active, stage)| active.then_some(stage))
        .collect()
}

fn transfer(kind: &str, params: &[(&'static str, String)]) -> FilterPrimitive {
    let mut primitive = FilterPrimitive::new("feComponentTransfer", Vec::new());
    for func in ["feFuncR", "feFuncG", "feFuncB"] {
        let mut attrs = vec![("type", kind.to_string())];
        attrs.extend(params.iter().cloned());
        primitive.children.push(FilterPrimitive::new(func, attrs));
    }
    primitive
}

fn color_matrix(kind: &str, values: String) -> FilterPrimitive {
    FilterPrimitive::new(
        "feColorMatrix",
        vec![("type", kind.to_string()), ("values", values)],
    )
}

fn matrix_values(m: &[f64; 20]) -> String {
    m.iter().map(|v| fmt_num(*v)).collect::<Vec<_>>().join(" ")
}

/// Interpolate between the identity matrix and `full` by `amount`.
fn blend_matrix(full: [f64; 9], amount: f64) -> String {
    let identity = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
    let mut m = [0.0; 20];
    for row in 0..3 {
        for col in 0..3 {
            let i = row * 3 + col;
            m[row * 5 + col] = identity[i] + (full[i] - identity[i]) * amount;
        }
    }
    m[18] = 1.0;
    matrix_values(&m)
}

const SEPIA: [f64; 9] = [
    0.393, 0.769, 0.189, //
    0.349, 0.686, 0.168, //
    0.272, 0.534, 0.131,
];

const GRAYSCALE: [f64; 9] = [
    0.2126, 0.7152, 0.0722, //
    0.2126, 0.7152, 0.0722, //
    0.2126, 0.7152, 0.0722,
];

impl FilterStage {
    fn primitive(&self) -> FilterPrimitive {
        match *self {
            Self::Blur(s) => {
                FilterPrimitive::new("feGaussianBlur", vec![("stdDeviation", fmt_num(s))])
            }
            Self::Brightness(b) => transfer(
                "linear",
                &[("slope", fmt_num(b)), ("intercept", "0".to_string())],
            ),
            Self::Contrast(c) => transfer(
                "linear",
                &[("slope", fmt_num(c)), ("intercept", fmt_num(0.5 - 0.5 * c))],
            ),
            Self::Saturate(s) => color_matrix("saturate", fmt_num(s)),
            Self::HueRotate(deg) => color_matrix("hueRotate", fmt_num(deg)),
            Self::Sepia(a) => color_matrix("matrix", blend_matrix(SEPIA, a)),
            Self::Grayscale(a) => color_matrix("matrix", blend_matrix(GRAYSCALE, a)),
            Self::Invert(a) => {
                let table = format!("{} {}", fmt_num(a), fmt_num(1.0 - a));
                transfer("table", &[("tableValues", table)])
            }
        }
    }
}

/// Shadow and glow blur values are radii; the primitive takes σ = r / 2.
fn sigma(radius: f64) -> String {
    fmt_num(radius / 2.0)
}

impl FilterChain {
    /// Build the chain for a layer's effects; `None` when nothing applies.
    #[must_use]
    pub fn from_effects(effects: &Effects) -> Option<Self> {
        let chain = Self {
            stages: stages_for(&effects.filters),
            shadow: effects.shadow,
            glow: effects.glow,
        };
        (!chain.is_empty()).then_some(chain)
    }

    /// No stage and no composite effect.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty() && self.shadow.is_none() && self.glow.is_none()
    }

    /// Stage names in order, followed by `shadow` / `glow` when present.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.stages.iter().map(FilterStage::name).collect();
        if self.shadow.is_some() {
            names.push("shadow");
        }
        if self.glow.is_some() {
            names.push("glow");
        }
        names
    }

    /// Expand into primitives. Results are named `s0`, `s1`, ... for the
    /// adjustments; the adjusted graphic is composited over each effect.
    #[must_use]
    pub fn primitives(&self) -> Vec<FilterPrimitive> {
        let mut out = Vec::new();
        let mut current = "SourceGraphic".to_string();
        for (i, stage) in self.stages.iter().enumerate() {
            let mut primitive = stage.primitive();
            let result = format!("s{i}");
            primitive.attrs.insert(0, ("in", current.clone()));
            primitive.attrs.push(("result", result.clone()));
            out.push(primitive);
            current = result;
        }

        if let Some(shadow) = &self.shadow {
            out.push(FilterPrimitive::new(
                "feGaussianBlur",
                vec![
                    ("in", "SourceAlpha".into()),
                    ("stdDeviation", sigma(shadow.blur)),
                    ("result", "shadowBlur".into()),
                ],
            ));
            out.push(FilterPrimitive::new(
                "feOffset",
                vec![
                    ("in", "shadowBlur".into()),
                    ("dx", fmt_num(shadow.offset_x)),
                    ("dy", fmt_num(shadow.offset_y)),
                    ("result", "shadowOffset".into()),
                ],
            ));
            out.push(FilterPrimitive::new(
                "feFlood",
                vec![
                    ("flood-color", shadow.color.to_hex()),
                    ("flood-opacity", fmt_num(shadow.opacity)),
                    ("result", "shadowColor".into()),
                ],
            ));
            out.push(FilterPrimitive::new(
                "feComposite",
                vec![
                    ("in", "shadowColor".into()),
                    ("in2", "shadowOffset".into()),
                    ("operator", "in".into()),
                    ("result", "shadow".into()),
                ],
            ));
            out.push(FilterPrimitive::new(
                "feComposite",
                vec![
                    ("in", current.clone()),
                    ("in2", "shadow".into()),
                    ("operator", "over".into()),
                    ("result", "withShadow".into()),
                ],
            ));
            current = "withShadow".into();
        }

        if let Some(glow) = &self.glow {
            out.push(FilterPrimitive::new(
                "feGaussianBlur",
                vec![
                    ("in", "SourceAlpha".into()),
                    ("stdDeviation", sigma(glow.blur)),
                    ("result", "glowBlur".into()),
                ],
            ));
            out.push(FilterPrimitive::new(
                "feFlood",
                vec![
                    ("flood-color", glow.color.to_hex()),
                    ("flood-opacity", fmt_num(glow.opacity)),
                    ("result", "glowColor".into()),
                ],
            ));
            out.push(FilterPrimitive::new(
                "feComposite",
                vec![
                    ("in", "glowColor".into()),
                    ("in2", "glowBlur".into()),
                    ("operator", "in".into()),
                    ("result", "glow".into()),
                ],
            ));
            out.push(FilterPrimitive::new(
                "feComposite",
                vec![
                    ("in", current),
                    ("in2", "glow".into()),
                    ("operator", "over".into()),
                    ("result", "withGlow".into()),
                ],
            ));
        }
        out
    }
}
