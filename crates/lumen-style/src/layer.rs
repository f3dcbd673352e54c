//! Per-type resolved properties and the layer normalizer.

use std::collections::BTreeMap;

use lumen_model::{
    AudioProperties, ElementOverride, GroupProperties, ImageProperties, Layer, LayerProperties,
    LayerType, ShapeProperties, TextProperties, Transform, VectorSourceProperties,
    VideoProperties,
};
use serde::Serialize;

use crate::clip::{Clip, Mask, normalize_clip, normalize_mask};
use crate::color::{Color, resolve_color, resolve_optional_color};
use crate::effects::{Effects, normalize_effects};
use crate::enums::{
    FontStyle, FontWeight, ObjectFit, ShapeType, StrokeStyle, TextAlign, TextDecoration,
    parse_or_default,
};
use crate::fill::{Fill, normalize_fill};
use crate::rules;

/// Default text color.
pub const TEXT_COLOR: Color = Color::BLACK;
/// Default shape fill.
pub const SHAPE_FILL: Color = Color::rgb(0xcc, 0xcc, 0xcc);
/// Default shape stroke color.
pub const SHAPE_STROKE: Color = Color::BLACK;
/// Default font family.
pub const FONT_FAMILY: &str = "sans-serif";

/// Resolved transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedTransform {
    /// Left.
    pub x: f64,
    /// Top.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Degrees, clockwise, about the layer center.
    pub rotation: f64,
    /// Horizontal scale.
    pub scale_x: f64,
    /// Vertical scale.
    pub scale_y: f64,
    /// Opacity.
    pub opacity: f64,
}

impl ResolvedTransform {
    /// Apply defaults and ranges.
    #[must_use]
    pub fn from_raw(raw: &Transform) -> Self {
        Self {
            x: rules::COORDINATE.apply(raw.x),
            y: rules::COORDINATE.apply(raw.y),
            width: rules::SIZE.apply(raw.width),
            height: rules::SIZE.apply(raw.height),
            rotation: rules::ROTATION.apply(raw.rotation),
            scale_x: rules::SCALE.apply(raw.scale_x),
            scale_y: rules::SCALE.apply(raw.scale_y),
            opacity: rules::OPACITY.apply(raw.opacity),
        }
    }
}

/// A stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    /// Opaque color.
    pub color: Color,
    /// Opacity from the color's alpha.
    pub opacity: f64,
    /// Width; 0 means no stroke.
    pub width: f64,
    /// Dash style.
    pub style: StrokeStyle,
}

impl Stroke {
    fn new(color: Color, width: f64, style: StrokeStyle) -> Self {
        Self {
            color: color.opaque(),
            opacity: color.alpha,
            width,
            style,
        }
    }

    /// Whether anything would be painted.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.opacity > 0.0
    }
}

/// Text properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    /// Content.
    pub text: String,
    /// Font family.
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Weight.
    pub font_weight: FontWeight,
    /// Style.
    pub font_style: FontStyle,
    /// Alignment.
    pub text_align: TextAlign,
    /// Line height multiplier.
    pub line_height: f64,
    /// Letter spacing.
    pub letter_spacing: f64,
    /// Decoration.
    pub text_decoration: TextDecoration,
    /// Glyph fill.
    pub fill: Fill,
    /// Glyph outline, if visible.
    pub stroke: Option<Stroke>,
    /// Wrap to the layer width.
    pub word_wrap: bool,
}

/// Shape properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeStyle {
    /// Shape kind.
    pub shape_type: ShapeType,
    /// Fill.
    pub fill: Fill,
    /// Stroke (possibly zero width).
    pub stroke: Stroke,
    /// Rectangle corner radius before the geometric clamp.
    pub corner_radius: f64,
    /// Polygon sides.
    pub sides: u32,
    /// Star points.
    pub points: u32,
    /// Star inner radius ratio.
    pub inner_radius: f64,
    /// Line endpoints, when given.
    pub line: LineEnds,
}

/// Optional explicit line endpoints; absent ends default to the horizontal
/// mid-line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LineEnds {
    /// Start x.
    pub x1: Option<f64>,
    /// Start y.
    pub y1: Option<f64>,
    /// End x.
    pub x2: Option<f64>,
    /// End y.
    pub y2: Option<f64>,
}

/// Image properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageStyle {
    /// Source, if any.
    pub src: Option<String>,
    /// Alternative text.
    pub alt: Option<String>,
    /// Fit mode.
    pub object_fit: ObjectFit,
    /// Frame corner radius.
    pub corner_radius: f64,
    /// Frame border, if visible.
    pub border: Option<Stroke>,
}

/// Style override for imported vector elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ElementStyle {
    /// Fill color.
    pub fill: Option<Color>,
    /// Stroke color.
    pub stroke: Option<Color>,
    /// Stroke width.
    pub stroke_width: Option<f64>,
}

impl ElementStyle {
    fn from_raw(raw: &ElementOverride) -> Self {
        Self {
            fill: resolve_optional_color(raw.fill.as_deref()),
            stroke: resolve_optional_color(raw.stroke.as_deref()),
            stroke_width: raw.stroke_width.map(|w| rules::STROKE_WIDTH.apply(Some(w))),
        }
    }
}

/// Selector-keyed overrides, split by selector kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StyleOverrides {
    /// `global` wildcard.
    pub global: Option<ElementStyle>,
    /// Keyed by lower-case tag name.
    pub by_tag: BTreeMap<String, ElementStyle>,
    /// Keyed by id (without `#`).
    pub by_id: BTreeMap<String, ElementStyle>,
    /// Keyed by class (without `.`).
    pub by_class: BTreeMap<String, ElementStyle>,
}

impl StyleOverrides {
    /// Split raw selector keys.
    #[must_use]
    pub fn from_raw(raw: Option<&BTreeMap<String, ElementOverride>>) -> Self {
        let mut overrides = Self::default();
        for (key, value) in raw.into_iter().flatten() {
            let style = ElementStyle::from_raw(value);
            let key = key.trim();
            if key == "global" || key == "*" {
                overrides.global = Some(style);
            } else if let Some(id) = key.strip_prefix('#') {
                let _ = overrides.by_id.insert(id.to_string(), style);
            } else if let Some(class) = key.strip_prefix('.') {
                let _ = overrides.by_class.insert(class.to_string(), style);
            } else if !key.is_empty() {
                let _ = overrides.by_tag.insert(key.to_ascii_lowercase(), style);
            }
        }
        overrides
    }

    /// No selector present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.global.is_none()
            && self.by_tag.is_empty()
            && self.by_id.is_empty()
            && self.by_class.is_empty()
    }

    /// The effective override for an element. Each property resolves
    /// independently: tag, then `#id`, then each `.class` in order, then
    /// `global`.
    #[must_use]
    pub fn resolve(&self, tag: &str, id: Option<&str>, classes: &[&str]) -> ElementStyle {
        let mut candidates: Vec<&ElementStyle> = Vec::new();
        candidates.extend(self.by_tag.get(&tag.to_ascii_lowercase()));
        candidates.extend(id.and_then(|id| self.by_id.get(id)));
        candidates.extend(classes.iter().filter_map(|c| self.by_class.get(*c)));
        candidates.extend(self.global.as_ref());
        ElementStyle {
            fill: candidates.iter().find_map(|s| s.fill),
            stroke: candidates.iter().find_map(|s| s.stroke),
            stroke_width: candidates.iter().find_map(|s| s.stroke_width),
        }
    }
}

/// Vector-source properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorStyle {
    /// Source, if any.
    pub src: Option<String>,
    /// Element overrides.
    pub overrides: StyleOverrides,
}

/// Group properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStyle {
    /// Background paint.
    pub background: Option<Fill>,
    /// Clip, if enabled.
    pub clip: Option<Clip>,
    /// Mask, if enabled.
    pub mask: Option<Mask>,
}

/// Video placeholder properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoStyle {
    /// Clip source.
    pub src: Option<String>,
    /// Poster image source.
    pub poster: Option<String>,
}

/// Audio placeholder properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioStyle {
    /// Clip source.
    pub src: Option<String>,
    /// Title.
    pub title: Option<String>,
}

/// Resolved per-type properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ResolvedProperties {
    /// Text.
    Text(TextStyle),
    /// Shape.
    Shape(ShapeStyle),
    /// Image.
    Image(ImageStyle),
    /// Vector source.
    VectorSource(VectorStyle),
    /// Group.
    Group(GroupStyle),
    /// Video.
    Video(VideoStyle),
    /// Audio.
    Audio(AudioStyle),
    /// Unknown type; nothing renders it.
    Unknown,
}

/// A layer with every property resolved. Children are not included; the
/// dispatcher normalizes them as it descends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLayer {
    /// Layer id.
    pub id: String,
    /// Layer type.
    #[serde(skip)]
    pub layer_type: LayerType,
    /// Transform.
    pub transform: ResolvedTransform,
    /// Visible flag.
    pub visible: bool,
    /// Locked flag.
    pub locked: bool,
    /// Stacking order.
    pub z_index: i64,
    /// Properties.
    pub properties: ResolvedProperties,
    /// Effects.
    pub effects: Effects,
}

fn text_or_none(raw: Option<&String>) -> Option<String> {
    raw.map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn optional_stroke(color: Option<&str>, width: Option<f64>, default: Color) -> Option<Stroke> {
    let width = rules::STROKE_WIDTH.apply(width);
    let stroke = Stroke::new(resolve_color(color, default), width, StrokeStyle::Solid);
    stroke.is_visible().then_some(stroke)
}

/// Resolve text properties.
#[must_use]
pub fn normalize_text(raw: &TextProperties) -> TextStyle {
    let color = resolve_color(raw.color.as_deref(), TEXT_COLOR);
    TextStyle {
        text: raw.text.clone().unwrap_or_default(),
        font_family: text_or_none(raw.font_family.as_ref()).unwrap_or_else(|| FONT_FAMILY.into()),
        font_size: rules::FONT_SIZE.apply(raw.font_size),
        font_weight: parse_or_default(raw.font_weight.as_deref(), "fontWeight"),
        font_style: parse_or_default(raw.font_style.as_deref(), "fontStyle"),
        text_align: parse_or_default(raw.text_align.as_deref(), "textAlign"),
        line_height: rules::LINE_HEIGHT.apply(raw.line_height),
        letter_spacing: rules::LETTER_SPACING.apply(raw.letter_spacing),
        text_decoration: parse_or_default(raw.text_decoration.as_deref(), "textDecoration"),
        fill: normalize_fill(raw.fill.as_ref(), Some(Fill::solid(color)))
            .unwrap_or_else(|| Fill::solid(color)),
        stroke: optional_stroke(raw.stroke.as_deref(), raw.stroke_width, Color::BLACK),
        word_wrap: raw.word_wrap.unwrap_or(false),
    }
}

/// Resolve shape properties.
#[must_use]
pub fn normalize_shape(raw: &ShapeProperties) -> ShapeStyle {
    let stroke_color = resolve_color(raw.stroke.as_deref(), SHAPE_STROKE);
    let default_fill = Fill::solid(SHAPE_FILL);
    ShapeStyle {
        shape_type: parse_or_default(raw.shape_type.as_deref(), "shapeType"),
        fill: normalize_fill(raw.fill.as_ref(), Some(default_fill.clone())).unwrap_or(default_fill),
        stroke: Stroke::new(
            stroke_color,
            rules::STROKE_WIDTH.apply(raw.stroke_width),
            parse_or_default(raw.stroke_style.as_deref(), "strokeStyle"),
        ),
        corner_radius: rules::CORNER_RADIUS.apply(raw.corner_radius),
        sides: rules::SIDES.apply_count(raw.sides),
        points: rules::STAR_POINTS.apply_count(raw.points),
        inner_radius: rules::INNER_RADIUS.apply(raw.inner_radius),
        line: LineEnds {
            x1: raw.x1.map(|v| rules::COORDINATE.apply(Some(v))),
            y1: raw.y1.map(|v| rules::COORDINATE.apply(Some(v))),
            x2: raw.x2.map(|v| rules::COORDINATE.apply(Some(v))),
            y2: raw.y2.map(|v| rules::COORDINATE.apply(Some(v))),
        },
    }
}

/// Resolve image properties.
#[must_use]
pub fn normalize_image(raw: &ImageProperties) -> ImageStyle {
    ImageStyle {
        src: text_or_none(raw.src.as_ref()),
        alt: text_or_none(raw.alt.as_ref()),
        object_fit: parse_or_default(raw.object_fit.as_deref(), "objectFit"),
        corner_radius: rules::CORNER_RADIUS.apply(raw.corner_radius),
        border: optional_stroke(raw.border_color.as_deref(), raw.border_width, Color::BLACK),
    }
}

/// Resolve vector-source properties.
#[must_use]
pub fn normalize_vector(raw: &VectorSourceProperties) -> VectorStyle {
    VectorStyle {
        src: text_or_none(raw.src.as_ref()),
        overrides: StyleOverrides::from_raw(raw.style_overrides.as_ref()),
    }
}

/// Resolve group properties for a group of size `w × h`.
#[must_use]
pub fn normalize_group(raw: &GroupProperties, w: f64, h: f64) -> GroupStyle {
    GroupStyle {
        background: normalize_fill(raw.background.as_ref(), None),
        clip: normalize_clip(raw.clip_path.as_ref(), w, h),
        mask: normalize_mask(raw.mask.as_ref()),
    }
}

fn normalize_video(raw: &VideoProperties) -> VideoStyle {
    VideoStyle {
        src: text_or_none(raw.src.as_ref()),
        poster: text_or_none(raw.poster.as_ref()),
    }
}

fn normalize_audio(raw: &AudioProperties) -> AudioStyle {
    AudioStyle {
        src: text_or_none(raw.src.as_ref()),
        title: text_or_none(raw.title.as_ref()),
    }
}

/// Normalize one layer (not its children).
#[must_use]
pub fn normalize_layer(layer: &Layer) -> ResolvedLayer {
    let transform = ResolvedTransform::from_raw(&layer.transform);
    let properties = match &layer.properties {
        LayerProperties::Text(p) => ResolvedProperties::Text(normalize_text(p)),
        LayerProperties::Shape(p) => ResolvedProperties::Shape(normalize_shape(p)),
        LayerProperties::Image(p) => ResolvedProperties::Image(normalize_image(p)),
        LayerProperties::VectorSource(p) => ResolvedProperties::VectorSource(normalize_vector(p)),
        LayerProperties::Group(p) => ResolvedProperties::Group(normalize_group(
            p,
            transform.width,
            transform.height,
        )),
        LayerProperties::Video(p) => ResolvedProperties::Video(normalize_video(p)),
        LayerProperties::Audio(p) => ResolvedProperties::Audio(normalize_audio(p)),
        LayerProperties::Unknown(_) => ResolvedProperties::Unknown,
    };
    ResolvedLayer {
        id: layer.id.clone(),
        layer_type: layer.layer_type.clone(),
        transform,
        visible: layer.visible,
        locked: layer.locked,
        z_index: layer.z_index,
        properties,
        effects: normalize_effects(layer.properties.effects()),
    }
}
