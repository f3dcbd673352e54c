//! Layers: identity, type, transform, flags, and properties.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::EnumString;

use crate::lenient::{lenient, lenient_bool, lenient_list, lenient_number, lenient_string};
use crate::properties::LayerProperties;

/// The type of a layer.
///
/// Parsing never fails: an unrecognized name becomes [`LayerType::Unknown`],
/// which no renderer claims, so the layer is skipped at render time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum LayerType {
    /// Text.
    Text,
    /// Primitive or parametric shape.
    Shape,
    /// Raster or vector image shown as a picture.
    Image,
    /// Foreign SVG document imported element by element.
    #[strum(serialize = "vector-source", serialize = "svg")]
    VectorSource,
    /// Container of child layers.
    Group,
    /// Video placeholder.
    Video,
    /// Audio placeholder.
    Audio,
    /// Any other type name.
    #[strum(default)]
    Unknown(String),
}

impl LayerType {
    /// Parse a type name.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        name.trim()
            .parse()
            .unwrap_or_else(|_| Self::Unknown(name.to_string()))
    }

    /// The canonical type name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Shape => "shape",
            Self::Image => "image",
            Self::VectorSource => "vector-source",
            Self::Group => "group",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Unknown(name) => name,
        }
    }
}

/// Position, size, rotation, scale, and opacity of a layer.
///
/// Raw values; see the normalizer for defaults and ranges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transform {
    /// Left edge in parent coordinates.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Top edge in parent coordinates.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Width.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Height.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Rotation in degrees, clockwise.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Horizontal scale factor.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f64>,
    /// Vertical scale factor.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f64>,
    /// Opacity in `[0, 1]`.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Transform {
    /// A transform at `(x, y)` with the given size.
    #[must_use]
    pub const fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            rotation: None,
            scale_x: None,
            scale_y: None,
            opacity: None,
        }
    }
}

/// One visual element of a design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LayerRecord", into = "LayerRecord")]
pub struct Layer {
    /// Stable identifier.
    pub id: String,
    /// The layer type; selects the renderer and the properties shape.
    pub layer_type: LayerType,
    /// Geometric transform.
    pub transform: Transform,
    /// Hidden layers render nothing.
    pub visible: bool,
    /// Locked layers cannot be moved interactively.
    pub locked: bool,
    /// Stacking order among siblings (stable-sorted, ties keep list order).
    pub z_index: i64,
    /// Type-specific properties.
    pub properties: LayerProperties,
    /// Child layers (groups only; ignored for other types).
    pub children: Vec<Layer>,
    /// Opaque plugin state, passed through untouched.
    pub plugin_state: Option<Value>,
}

impl Layer {
    /// A visible, unlocked layer with default properties for its type.
    #[must_use]
    pub fn new(id: &str, layer_type: LayerType, transform: Transform) -> Self {
        let properties = LayerProperties::default_for(&layer_type);
        Self {
            id: id.to_string(),
            layer_type,
            transform,
            visible: true,
            locked: false,
            z_index: 0,
            properties,
            children: Vec::new(),
            plugin_state: None,
        }
    }

    /// Replace the properties payload.
    #[must_use]
    pub fn with_properties(mut self, properties: LayerProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Replace the children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }

    /// Find this layer or a descendant by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Self> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// The wire shape of a layer, decoded before the properties are typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LayerRecord {
    #[serde(deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    layer_type: Option<String>,
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    transform: Option<Transform>,
    #[serde(deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    visible: Option<bool>,
    #[serde(deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    locked: Option<bool>,
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    z_index: Option<f64>,
    properties: Value,
    #[serde(deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    children: Vec<Layer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plugin_state: Option<Value>,
}

impl From<LayerRecord> for Layer {
    fn from(record: LayerRecord) -> Self {
        let layer_type = LayerType::parse(record.layer_type.as_deref().unwrap_or_default());
        let properties = LayerProperties::from_value(&layer_type, record.properties);
        Self {
            id: record.id.unwrap_or_default(),
            layer_type,
            transform: record.transform.unwrap_or_default(),
            visible: record.visible.unwrap_or(true),
            locked: record.locked.unwrap_or(false),
            z_index: record.z_index.map_or(0, |z| z.round() as i64),
            properties,
            children: record.children,
            plugin_state: record.plugin_state.filter(|v| !v.is_null()),
        }
    }
}

impl From<Layer> for LayerRecord {
    fn from(layer: Layer) -> Self {
        Self {
            id: Some(layer.id),
            layer_type: Some(layer.layer_type.name().to_string()),
            transform: Some(layer.transform),
            visible: Some(layer.visible),
            locked: Some(layer.locked),
            z_index: Some(layer.z_index as f64),
            properties: layer.properties.to_value(),
            children: layer.children,
            plugin_state: layer.plugin_state,
        }
    }
}

/// Stable-sort sibling layers by `zIndex`, keeping list order for ties.
#[must_use]
pub fn paint_order(layers: &[Layer]) -> Vec<&Layer> {
    let mut ordered: Vec<&Layer> = layers.iter().collect();
    ordered.sort_by_key(|layer| layer.z_index);
    ordered
}
