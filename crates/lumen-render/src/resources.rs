//! Content-addressed paint resources.
//!
//! A [`ResourceCollection`] belongs to one render pass. Interning a
//! definition hashes its canonical JSON encoding with BLAKE3; identical
//! definitions share one id and one entry, so two layers with the same
//! gradient produce a single `<linearGradient>`.

use std::collections::HashSet;
use std::fmt;

use lumen_style::{MaskShape, PatternKind};
use serde::Serialize;
use tracing::trace;

use crate::builder::{AttrValue, ElementKind, NodeBuilder, NodeBuilderExt, NodeRef};
use crate::filter::{FilterChain, FilterPrimitive};
use crate::geometry::{ClipShape, fmt_num, points_attr};

/// Identifier of an interned resource: kind prefix plus 16 hex digits of
/// the content hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// The id text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `url(#id)` reference.
    #[must_use]
    pub fn url(&self) -> String {
        format!("url(#{})", self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A gradient stop ready for output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopDef {
    /// Offset in percent.
    pub offset: f64,
    /// `#rrggbb`.
    pub color: String,
    /// Stop opacity.
    pub opacity: f64,
}

/// `<linearGradient>` with endpoints in percent of the bounding box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearGradientDef {
    /// Start x (%).
    pub x1: f64,
    /// Start y (%).
    pub y1: f64,
    /// End x (%).
    pub x2: f64,
    /// End y (%).
    pub y2: f64,
    /// Stops.
    pub stops: Vec<StopDef>,
}

/// `<radialGradient>` in percent of the bounding box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadialGradientDef {
    /// Center x (%).
    pub cx: f64,
    /// Center y (%).
    pub cy: f64,
    /// Radius (%).
    pub r: f64,
    /// Stops.
    pub stops: Vec<StopDef>,
}

/// `<pattern>` tile parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternDef {
    /// Tile content.
    pub kind: PatternKind,
    /// Feature size.
    pub size: f64,
    /// Tile edge (size + spacing).
    pub tile: f64,
    /// Feature color.
    pub foreground: String,
    /// Tile background.
    pub background: Option<String>,
}

/// `<mask>` content in user space of a `width × height` box.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "content", rename_all = "kebab-case")]
pub enum MaskDef {
    /// Rectangle filled with an interned gradient.
    Gradient {
        /// The gradient resource.
        gradient: ResourceId,
        /// Box width.
        width: f64,
        /// Box height.
        height: f64,
    },
    /// Image stretched to the box.
    Image {
        /// Image reference (data URI or URL).
        href: String,
        /// Box width.
        width: f64,
        /// Box height.
        height: f64,
    },
    /// Solid white shape.
    Shape {
        /// Which shape.
        shape: MaskShape,
        /// Box width.
        width: f64,
        /// Box height.
        height: f64,
    },
}

/// A deduplicated resource definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "resource", rename_all = "kebab-case")]
pub enum ResourceDefinition {
    /// Linear gradient.
    LinearGradient(LinearGradientDef),
    /// Radial gradient.
    RadialGradient(RadialGradientDef),
    /// Pattern.
    Pattern(PatternDef),
    /// Filter chain.
    Filter(FilterChain),
    /// Clip path.
    ClipPath(ClipShape),
    /// Mask.
    Mask(MaskDef),
}

impl ResourceDefinition {
    /// Id prefix for the kind.
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::LinearGradient(_) => "lg",
            Self::RadialGradient(_) => "rg",
            Self::Pattern(_) => "pat",
            Self::Filter(_) => "flt",
            Self::ClipPath(_) => "clip",
            Self::Mask(_) => "mask",
        }
    }

    /// Other resources this definition points at.
    #[must_use]
    pub fn dependencies(&self) -> Vec<&ResourceId> {
        match self {
            Self::Mask(MaskDef::Gradient { gradient, .. }) => vec![gradient],
            _ => Vec::new(),
        }
    }

    /// Content-addressed id.
    #[must_use]
    pub fn content_id(&self) -> ResourceId {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        let hash = blake3::hash(&canonical).to_hex();
        ResourceId(format!("{}-{}", self.prefix(), &hash.as_str()[..16]))
    }
}

/// Pass-scoped set of resource definitions, in first-use order.
#[derive(Debug, Default, Clone)]
pub struct ResourceCollection {
    entries: Vec<(ResourceId, ResourceDefinition)>,
    ids: HashSet<ResourceId>,
}

impl ResourceCollection {
    /// An empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `definition`, adding it on first use.
    pub fn intern(&mut self, definition: ResourceDefinition) -> ResourceId {
        let id = definition.content_id();
        if self.ids.insert(id.clone()) {
            trace!(target: "lumen::resources", %id, "new resource");
            self.entries.push((id.clone(), definition));
        }
        id
    }

    /// Look up a definition.
    #[must_use]
    pub fn get(&self, id: &ResourceId) -> Option<&ResourceDefinition> {
        self.entries.iter().find(|(i, _)| i == id).map(|(_, d)| d)
    }

    /// Number of distinct definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Definitions in first-use order.
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, &ResourceDefinition)> {
        self.entries.iter().map(|(i, d)| (i, d))
    }

    /// Drop every definition not named in `used` and not depended on by
    /// one that is. Returns how many were dropped.
    pub fn retain_used(&mut self, used: &HashSet<&str>) -> usize {
        let mut keep: HashSet<&ResourceId> = HashSet::new();
        // Dependencies are interned before their dependents.
        for (id, definition) in self.entries.iter().rev() {
            if keep.contains(id) || used.contains(id.as_str()) {
                let _ = keep.insert(id);
                keep.extend(definition.dependencies());
            }
        }
        let keep: HashSet<ResourceId> = keep.into_iter().cloned().collect();
        let before = self.entries.len();
        self.entries.retain(|(id, _)| keep.contains(id));
        self.ids.retain(|id| keep.contains(id));
        let dropped = before - self.entries.len();
        if dropped > 0 {
            trace!(target: "lumen::resources", dropped, "unused resources released");
        }
        dropped
    }

    /// Count definitions with the given id prefix (`lg`, `flt`, ...).
    #[must_use]
    pub fn count_kind(&self, prefix: &str) -> usize {
        self.entries
            .iter()
            .filter(|(_, d)| d.prefix() == prefix)
            .count()
    }
}

/// Ids named by `url(#id)` references in an attribute value.
pub fn url_references(value: &str) -> impl Iterator<Item = &str> {
    value.split("url(").skip(1).filter_map(|rest| {
        let inner = rest.split(')').next()?;
        let inner = inner.trim().trim_matches(|c| c == '\'' || c == '"');
        inner.strip_prefix('#').filter(|id| !id.is_empty())
    })
}

fn pct(value: f64) -> AttrValue {
    AttrValue::Str(format!("{}%", fmt_num(value)))
}

fn emit_stops<B: NodeBuilder + ?Sized>(builder: &mut B, parent: NodeRef, stops: &[StopDef]) {
    for stop in stops {
        let node = builder.child(
            parent,
            ElementKind::Stop,
            &[
                ("offset", pct(stop.offset)),
                ("stop-color", stop.color.as_str().into()),
            ],
        );
        if stop.opacity < 1.0 {
            builder.set(node, "stop-opacity", stop.opacity);
        }
    }
}

fn emit_primitive<B: NodeBuilder + ?Sized>(
    builder: &mut B,
    parent: NodeRef,
    primitive: &FilterPrimitive,
) {
    let node = builder.create(ElementKind::Primitive(primitive.tag));
    for (name, value) in &primitive.attrs {
        builder.set(node, name, value.as_str());
    }
    for child in &primitive.children {
        emit_primitive(builder, node, child);
    }
    builder.append(parent, node);
}

/// Emit a clip outline as a child of `parent`.
pub fn emit_clip_shape<B: NodeBuilder + ?Sized>(
    builder: &mut B,
    parent: NodeRef,
    shape: &ClipShape,
) -> NodeRef {
    match shape {
        ClipShape::Rect {
            x,
            y,
            width,
            height,
            rx,
        } => {
            let node = builder.child(
                parent,
                ElementKind::Rect,
                &[
                    ("x", (*x).into()),
                    ("y", (*y).into()),
                    ("width", (*width).into()),
                    ("height", (*height).into()),
                ],
            );
            if *rx > 0.0 {
                builder.set(node, "rx", *rx);
                builder.set(node, "ry", *rx);
            }
            node
        }
        ClipShape::Circle { cx, cy, r } => builder.child(
            parent,
            ElementKind::Circle,
            &[
                ("cx", (*cx).into()),
                ("cy", (*cy).into()),
                ("r", (*r).into()),
            ],
        ),
        ClipShape::Ellipse { cx, cy, rx, ry } => builder.child(
            parent,
            ElementKind::Ellipse,
            &[
                ("cx", (*cx).into()),
                ("cy", (*cy).into()),
                ("rx", (*rx).into()),
                ("ry", (*ry).into()),
            ],
        ),
        ClipShape::Polygon { points } => builder.child(
            parent,
            ElementKind::Polygon,
            &[("points", points_attr(points).into())],
        ),
        ClipShape::Path { d } => {
            builder.child(parent, ElementKind::Path, &[("d", d.as_str().into())])
        }
    }
}

fn emit_pattern<B: NodeBuilder + ?Sized>(builder: &mut B, node: NodeRef, def: &PatternDef) {
    builder.set(node, "patternUnits", "userSpaceOnUse");
    builder.set(node, "width", def.tile);
    builder.set(node, "height", def.tile);
    if let Some(background) = &def.background {
        let _ = builder.child(
            node,
            ElementKind::Rect,
            &[
                ("width", def.tile.into()),
                ("height", def.tile.into()),
                ("fill", background.as_str().into()),
            ],
        );
    }
    let fg: AttrValue = def.foreground.as_str().into();
    match def.kind {
        PatternKind::Dots => {
            let _ = builder.child(
                node,
                ElementKind::Circle,
                &[
                    ("cx", (def.tile / 2.0).into()),
                    ("cy", (def.tile / 2.0).into()),
                    ("r", (def.size / 2.0).into()),
                    ("fill", fg),
                ],
            );
        }
        PatternKind::Stripes => {
            builder.set(node, "patternTransform", "rotate(45)");
            let _ = builder.child(
                node,
                ElementKind::Rect,
                &[
                    ("width", def.size.into()),
                    ("height", def.tile.into()),
                    ("fill", fg),
                ],
            );
        }
        PatternKind::Grid => {
            let _ = builder.child(
                node,
                ElementKind::Path,
                &[
                    ("d", format!("M{t} 0 L0 0 L0 {t}", t = fmt_num(def.tile)).into()),
                    ("fill", "none".into()),
                    ("stroke", fg),
                    ("stroke-width", AttrValue::Num(1.0)),
                ],
            );
        }
    }
}

fn emit_mask<B: NodeBuilder + ?Sized>(builder: &mut B, node: NodeRef, def: &MaskDef) {
    builder.set(node, "maskUnits", "userSpaceOnUse");
    builder.set(node, "x", 0.0);
    builder.set(node, "y", 0.0);
    match def {
        MaskDef::Gradient {
            gradient,
            width,
            height,
        } => {
            builder.set(node, "width", *width);
            builder.set(node, "height", *height);
            let _ = builder.child(
                node,
                ElementKind::Rect,
                &[
                    ("width", (*width).into()),
                    ("height", (*height).into()),
                    ("fill", gradient.url().into()),
                ],
            );
        }
        MaskDef::Image {
            href,
            width,
            height,
        } => {
            builder.set(node, "width", *width);
            builder.set(node, "height", *height);
            let _ = builder.child(
                node,
                ElementKind::Image,
                &[
                    ("href", href.as_str().into()),
                    ("width", (*width).into()),
                    ("height", (*height).into()),
                    ("preserveAspectRatio", "none".into()),
                ],
            );
        }
        MaskDef::Shape {
            shape,
            width,
            height,
        } => {
            builder.set(node, "width", *width);
            builder.set(node, "height", *height);
            let (w, h) = (*width, *height);
            let outline = match shape {
                MaskShape::Rectangle => ClipShape::rounded_rect(w, h, 0.0),
                MaskShape::Circle => ClipShape::Circle {
                    cx: w / 2.0,
                    cy: h / 2.0,
                    r: w.min(h) / 2.0,
                },
                MaskShape::Ellipse => ClipShape::Ellipse {
                    cx: w / 2.0,
                    cy: h / 2.0,
                    rx: w / 2.0,
                    ry: h / 2.0,
                },
            };
            let shape_node = emit_clip_shape(builder, node, &outline);
            builder.set(shape_node, "fill", "#ffffff");
        }
    }
}

/// Emit one definition as a child of `defs`.
pub fn emit_definition<B: NodeBuilder + ?Sized>(
    builder: &mut B,
    defs: NodeRef,
    id: &ResourceId,
    definition: &ResourceDefinition,
) -> NodeRef {
    let kind = match definition {
        ResourceDefinition::LinearGradient(_) => ElementKind::LinearGradient,
        ResourceDefinition::RadialGradient(_) => ElementKind::RadialGradient,
        ResourceDefinition::Pattern(_) => ElementKind::Pattern,
        ResourceDefinition::Filter(_) => ElementKind::Filter,
        ResourceDefinition::ClipPath(_) => ElementKind::ClipPath,
        ResourceDefinition::Mask(_) => ElementKind::Mask,
    };
    let node = builder.create(kind);
    builder.set(node, "id", id.as_str());
    match definition {
        ResourceDefinition::LinearGradient(def) => {
            builder.set(node, "x1", pct(def.x1));
            builder.set(node, "y1", pct(def.y1));
            builder.set(node, "x2", pct(def.x2));
            builder.set(node, "y2", pct(def.y2));
            emit_stops(builder, node, &def.stops);
        }
        ResourceDefinition::RadialGradient(def) => {
            builder.set(node, "cx", pct(def.cx));
            builder.set(node, "cy", pct(def.cy));
            builder.set(node, "r", pct(def.r));
            emit_stops(builder, node, &def.stops);
        }
        ResourceDefinition::Pattern(def) => emit_pattern(builder, node, def),
        ResourceDefinition::Filter(chain) => {
            builder.set(node, "x", "-50%");
            builder.set(node, "y", "-50%");
            builder.set(node, "width", "200%");
            builder.set(node, "height", "200%");
            builder.set(node, "color-interpolation-filters", "sRGB");
            for primitive in chain.primitives() {
                emit_primitive(builder, node, &primitive);
            }
        }
        ResourceDefinition::ClipPath(shape) => {
            let _ = emit_clip_shape(builder, node, shape);
        }
        ResourceDefinition::Mask(def) => emit_mask(builder, node, def),
    }
    builder.append(defs, node);
    node
}

/// Emit every definition, in first-use order, under `defs`.
pub fn emit_definitions<B: NodeBuilder + ?Sized>(
    builder: &mut B,
    defs: NodeRef,
    resources: &ResourceCollection,
) {
    for (id, definition) in resources.iter() {
        let _ = emit_definition(builder, defs, id, definition);
    }
}
