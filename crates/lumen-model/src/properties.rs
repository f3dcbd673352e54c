//! Per-type layer properties.
//!
//! `Layer.properties` is a tagged union keyed by the layer type, so every
//! type renderer receives a statically known shape. Each payload is still
//! "raw": fields are optional and decoded leniently, and defaults are the
//! normalizer's job.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clip::{ClipInput, MaskInput};
use crate::layer::LayerType;
use crate::lenient::{lenient, lenient_bool, lenient_number, lenient_string};
use crate::paint::{EffectProperties, FillInput};

/// Text layer properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextProperties {
    /// The text content. `\n` separates lines.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Font family name.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Font size in pixels.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// `normal`, `bold`, or a numeric weight.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    /// `normal` or `italic`.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    /// `left`, `center`, or `right`.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    /// Line height as a multiple of the font size.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    /// Extra spacing between characters in pixels.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    /// `none`, `underline`, or `line-through`.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<String>,
    /// Text color (used when no `fill` is given).
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Optional gradient/pattern fill for the glyphs.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillInput>,
    /// Outline color.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    /// Outline width.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// Wrap words to the layer width.
    #[serde(deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    pub word_wrap: Option<bool>,
    /// Shared effects.
    #[serde(flatten)]
    pub effects: EffectProperties,
}

/// Shape layer properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapeProperties {
    /// `rectangle`, `circle`, `ellipse`, `polygon`, `star`, `line`, or `arrow`.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<String>,
    /// Fill paint.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillInput>,
    /// Stroke color.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    /// Stroke width.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// `solid`, `dashed`, or `dotted`.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub stroke_style: Option<String>,
    /// Rectangle corner radius.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    /// Polygon side count.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub sides: Option<f64>,
    /// Star point count.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
    /// Star inner radius as a fraction of the outer radius.
    #[serde(
        alias = "innerRatio",
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none",
    )]
    pub inner_radius: Option<f64>,
    /// Line start x (layer-local pixels).
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub x1: Option<f64>,
    /// Line start y.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub y1: Option<f64>,
    /// Line end x.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub x2: Option<f64>,
    /// Line end y.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub y2: Option<f64>,
    /// Shared effects.
    #[serde(flatten)]
    pub effects: EffectProperties,
}

/// Image layer properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageProperties {
    /// Image source: data URI, URL, or local path.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Alternative text.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// `fill`, `contain`, or `cover`.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub object_fit: Option<String>,
    /// Corner radius of the image frame.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    /// Frame border color.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Frame border width.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    /// Shared effects.
    #[serde(flatten)]
    pub effects: EffectProperties,
}

/// A per-selector style override for imported vector elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementOverride {
    /// Replacement fill color.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Replacement stroke color.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    /// Replacement stroke width.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
}

/// Vector-source (foreign SVG) layer properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VectorSourceProperties {
    /// Document source: data URI, URL, or local path.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Selector → override. Keys: `global`, a tag name, `#id`, or `.class`.
    #[serde(
        alias = "colorOverrides",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none",
    )]
    pub style_overrides: Option<BTreeMap<String, ElementOverride>>,
    /// Shared effects.
    #[serde(flatten)]
    pub effects: EffectProperties,
}

/// Group (container) layer properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupProperties {
    /// Optional background paint behind the children.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub background: Option<FillInput>,
    /// Clip configuration.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub clip_path: Option<ClipInput>,
    /// Mask configuration.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub mask: Option<MaskInput>,
    /// Shared effects.
    #[serde(flatten)]
    pub effects: EffectProperties,
}

/// Video placeholder properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoProperties {
    /// Video source (not decoded; identifies the clip).
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Poster frame image source.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    /// Shared effects.
    #[serde(flatten)]
    pub effects: EffectProperties,
}

/// Audio placeholder properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioProperties {
    /// Audio source (not decoded; identifies the clip).
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Display title.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Shared effects.
    #[serde(flatten)]
    pub effects: EffectProperties,
}

/// The type-discriminated properties payload of a layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerProperties {
    /// Text layer.
    Text(TextProperties),
    /// Shape layer.
    Shape(ShapeProperties),
    /// Image layer.
    Image(ImageProperties),
    /// Foreign vector document layer.
    VectorSource(VectorSourceProperties),
    /// Container layer.
    Group(GroupProperties),
    /// Video placeholder.
    Video(VideoProperties),
    /// Audio placeholder.
    Audio(AudioProperties),
    /// Payload of a layer type this engine does not know; kept verbatim.
    Unknown(Value),
}

impl LayerProperties {
    /// Decode a raw properties object for the given layer type.
    ///
    /// Never fails: a payload that is not an object yields the type's
    /// default (empty) properties.
    #[must_use]
    pub fn from_value(layer_type: &LayerType, value: Value) -> Self {
        match layer_type {
            LayerType::Text => Self::Text(decode_or_default(value)),
            LayerType::Shape => Self::Shape(decode_or_default(value)),
            LayerType::Image => Self::Image(decode_or_default(value)),
            LayerType::VectorSource => Self::VectorSource(decode_or_default(value)),
            LayerType::Group => Self::Group(decode_or_default(value)),
            LayerType::Video => Self::Video(decode_or_default(value)),
            LayerType::Audio => Self::Audio(decode_or_default(value)),
            LayerType::Unknown(_) => Self::Unknown(value),
        }
    }

    /// Default properties for a layer type.
    #[must_use]
    pub fn default_for(layer_type: &LayerType) -> Self {
        Self::from_value(layer_type, Value::Null)
    }

    /// Encode back into a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let encoded = match self {
            Self::Text(p) => serde_json::to_value(p),
            Self::Shape(p) => serde_json::to_value(p),
            Self::Image(p) => serde_json::to_value(p),
            Self::VectorSource(p) => serde_json::to_value(p),
            Self::Group(p) => serde_json::to_value(p),
            Self::Video(p) => serde_json::to_value(p),
            Self::Audio(p) => serde_json::to_value(p),
            Self::Unknown(v) => return v.clone(),
        };
        encoded.unwrap_or(Value::Null)
    }

    /// The shared effect properties, if this payload has any.
    #[must_use]
    pub const fn effects(&self) -> Option<&EffectProperties> {
        match self {
            Self::Text(p) => Some(&p.effects),
            Self::Shape(p) => Some(&p.effects),
            Self::Image(p) => Some(&p.effects),
            Self::VectorSource(p) => Some(&p.effects),
            Self::Group(p) => Some(&p.effects),
            Self::Video(p) => Some(&p.effects),
            Self::Audio(p) => Some(&p.effects),
            Self::Unknown(_) => None,
        }
    }
}

fn decode_or_default<T: DeserializeOwned + Default>(value: Value) -> T {
    if value.is_null() {
        return T::default();
    }
    serde_json::from_value(value).unwrap_or_default()
}
