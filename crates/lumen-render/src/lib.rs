//! The shared rendering contract for Lumen.
//!
//! Both render targets (the static SVG exporter and the interactive scene
//! graph) drive the same code through the [`NodeBuilder`] interface:
//!
//! - [`geometry`]: shape formulas in layer-local coordinates
//! - [`paint`] and [`resources`]: fills to paint values, with gradients,
//!   patterns, filters, clips, and masks interned per render pass
//! - [`filter`]: the fixed-order filter pipeline
//! - [`text`]: line layout and the word-wrap heuristic
//! - [`vector`]: foreign SVG parsing, sanitizing, and import
//! - [`loader`]: fetch, decode, and memoize external content
//! - [`registry`] and [`renderers`]: type dispatch and per-type content
//!
//! A render pass owns its [`ResourceCollection`]; nothing is global except
//! the fetch caches, which load each key at most once.

pub mod builder;
pub mod filter;
pub mod geometry;
pub mod loader;
pub mod paint;
pub mod registry;
pub mod renderers;
pub mod resources;
mod stylesheet;
pub mod text;
pub mod vector;

pub use builder::{AttrValue, ElementKind, NodeBuilder, NodeBuilderExt, NodeRef};
pub use filter::{FilterChain, FilterPrimitive, FilterStage};
pub use geometry::{ClipShape, Point, fmt_num};
pub use loader::{
    BlockingContent, ContentCaches, ContentSource, ContentState, FetchCache, ImageAsset,
    LoadError, load_image, load_vector,
};
pub use paint::{Paint, canvas_background, resolve_fill};
pub use registry::{
    LayerInput, RegistryError, RenderContext, RenderOptions, RenderedLayer, RendererRegistry,
    TypeRenderer, transform_attr,
};
pub use resources::{
    ResourceCollection, ResourceDefinition, ResourceId, emit_definitions, url_references,
};
pub use text::{TextLayout, layout_text};
pub use vector::{ElementInfo, VectorDocument, import_document, parse_document};
