//! Design to SVG markup.

use lumen_common::FetchOptions;
use lumen_model::Design;
use lumen_render::{
    BlockingContent, ContentSource, RenderContext, RenderOptions, RenderedLayer, RendererRegistry,
    ResourceCollection, canvas_background, emit_definitions,
};
use lumen_style::normalize_canvas;
use tracing::debug;

use crate::document::SvgDocument;

/// Options for a static export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// How external content is fetched.
    pub fetch: FetchOptions,
    /// Inline images as `data:` URIs. When false, images link their source.
    pub embed_images: bool,
    /// Paint the canvas background behind the layers.
    pub include_background: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            fetch: FetchOptions::default(),
            embed_images: true,
            include_background: true,
        }
    }
}

/// A finished export.
#[derive(Debug, Clone)]
pub struct SvgExport {
    /// Serialized SVG document.
    pub markup: String,
    /// Canvas width.
    pub width: f64,
    /// Canvas height.
    pub height: f64,
    /// Number of definitions in `<defs>`.
    pub resource_count: usize,
    /// What was rendered for each layer, children before parents.
    pub layers: Vec<RenderedLayer>,
}

impl SvgExport {
    /// The record for a layer id.
    #[must_use]
    pub fn layer(&self, layer_id: &str) -> Option<&RenderedLayer> {
        self.layers.iter().find(|r| r.layer_id == layer_id)
    }
}

/// Render a design with the default renderers, loading content
/// synchronously.
#[must_use]
pub fn export_svg(design: &Design, options: &ExportOptions) -> SvgExport {
    let registry = RendererRegistry::with_defaults();
    let content = BlockingContent::new(options.fetch.clone());
    export_with(design, options, &registry, &content)
}

/// Render a design with a caller-supplied registry and content source.
#[must_use]
pub fn export_with(
    design: &Design,
    options: &ExportOptions,
    registry: &RendererRegistry,
    content: &dyn ContentSource,
) -> SvgExport {
    let canvas = normalize_canvas(design);
    let mut document = SvgDocument::new(canvas.width, canvas.height);
    let root = document.root();
    let defs = document.defs();
    let mut resources = ResourceCollection::new();

    if options.include_background {
        let _ = canvas_background(&mut document, root, &canvas, &mut resources);
    }

    let render_options = RenderOptions {
        embed_images: options.embed_images,
    };
    let mut cx = RenderContext::new(registry, &mut resources, content, render_options);
    cx.render_children(&mut document, root, &design.layers);
    let layers = cx.finish();

    emit_definitions(&mut document, defs, &resources);
    debug!(
        target: "lumen::export",
        layers = layers.len(),
        resources = resources.len(),
        "exported design"
    );

    SvgExport {
        markup: document.to_markup(),
        width: canvas.width,
        height: canvas.height,
        resource_count: resources.len(),
        layers,
    }
}
