//! Design graph types for the Lumen layer renderer.
//!
//! A [`Design`] is the immutable snapshot the engine renders: canvas size,
//! background, and an ordered list of [`Layer`]s (groups nest children).
//! The snapshot is produced by the editor's persistence/history layer; this
//! crate only decodes it.
//!
//! # Decoding policy
//!
//! Decoding is total. A malformed field becomes absent (see [`lenient`]), an
//! unknown layer type becomes [`LayerType::Unknown`], and a list entry that
//! is not an object is dropped. Property defaults and ranges are applied by
//! `lumen-style`, not here.

pub mod clip;
pub mod layer;
pub mod lenient;
pub mod paint;
pub mod properties;

pub use clip::{ClipConfig, ClipInput, MaskConfig, MaskInput, PointInput};
pub use layer::{Layer, LayerType, Transform, paint_order};
pub use paint::{
    EffectProperties, FillConfig, FillInput, FilterInput, GlowInput, GradientStopInput,
    ShadowInput,
};
pub use properties::{
    AudioProperties, ElementOverride, GroupProperties, ImageProperties, LayerProperties,
    ShapeProperties, TextProperties, VectorSourceProperties, VideoProperties,
};

use serde::{Deserialize, Serialize};

use crate::lenient::{lenient, lenient_list, lenient_number};

/// A design snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Design {
    /// Canvas width in pixels.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Canvas height in pixels.
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Canvas background: color string or fill descriptor.
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub background: Option<FillInput>,
    /// Root layers in z-order (back to front).
    #[serde(deserialize_with = "lenient_list")]
    pub layers: Vec<Layer>,
}

impl Design {
    /// Decode a design from JSON text.
    ///
    /// # Errors
    ///
    /// Fails only when the text is not JSON or the top level is not an object.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Encode the design as JSON text.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` serialization failures.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Find a layer anywhere in the tree by id.
    #[must_use]
    pub fn find_layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find_map(|layer| layer.find(id))
    }
}
