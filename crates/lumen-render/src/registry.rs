//! Renderer registry and layer dispatcher.
//!
//! The registry maps each [`LayerType`] to exactly one [`TypeRenderer`].
//! The dispatcher walks layers in paint order, wraps each rendered layer in
//! a transform-bearing group, attaches effects, and records what it built
//! so the interactive target can patch layers in place later.

use std::collections::HashMap;
use std::fmt::Write;

use lumen_model::{Layer, LayerType, paint_order};
use lumen_style::{ResolvedLayer, ResolvedTransform, normalize_layer};
use serde::Serialize;
use tracing::debug;

use crate::builder::{ElementKind, NodeBuilder, NodeBuilderExt, NodeRef};
use crate::filter::FilterChain;
use crate::geometry::fmt_num;
use crate::loader::ContentSource;
use crate::renderers;
use crate::resources::{ResourceCollection, ResourceDefinition, ResourceId};

/// Registration failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Another renderer already handles the type.
    #[error("layer type '{layer_type}' is already handled by '{existing}'")]
    Duplicate {
        /// The contested type.
        layer_type: String,
        /// Name of the renderer that claimed it first.
        existing: &'static str,
    },
    /// The renderer declared no types.
    #[error("renderer '{0}' supports no layer types")]
    NoTypes(&'static str),
}

/// A layer as seen by a type renderer: the raw record and its resolved
/// properties.
#[derive(Debug, Clone, Copy)]
pub struct LayerInput<'a> {
    /// Raw layer, including children.
    pub layer: &'a Layer,
    /// Normalized properties.
    pub resolved: &'a ResolvedLayer,
}

impl LayerInput<'_> {
    /// Layer id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.resolved.id
    }

    /// Resolved width.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.resolved.transform.width
    }

    /// Resolved height.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.resolved.transform.height
    }
}

/// Content key for anything serializable: 16 hex digits of its BLAKE3
/// hash.
#[must_use]
pub fn content_key<T: Serialize + ?Sized>(value: &T) -> String {
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    blake3::hash(&bytes).to_hex().as_str()[..16].to_string()
}

/// Renders the content of one or more layer types.
///
/// Implementations draw in layer-local coordinates (origin at the top-left
/// of the layer box) and never see the output format.
pub trait TypeRenderer: Send + Sync {
    /// Name for diagnostics.
    fn name(&self) -> &'static str;

    /// The layer types this renderer handles.
    fn supported_types(&self) -> Vec<LayerType>;

    /// Build the layer content as a detached node.
    fn render_content(
        &self,
        input: &LayerInput<'_>,
        builder: &mut dyn NodeBuilder,
        cx: &mut RenderContext<'_>,
    ) -> NodeRef;

    /// Key over every input that [`TypeRenderer::patch_content`] cannot
    /// apply in place. When the key changes the layer is rebuilt.
    fn structure_key(&self, input: &LayerInput<'_>) -> String {
        content_key(&(
            &input.resolved.properties,
            input.width(),
            input.height(),
            &input.layer.children,
        ))
    }

    /// Update existing content in place. Only called when the structure key
    /// is unchanged. Returns `false` to request a rebuild.
    fn patch_content(
        &self,
        input: &LayerInput<'_>,
        builder: &mut dyn NodeBuilder,
        content: NodeRef,
        cx: &mut RenderContext<'_>,
    ) -> bool {
        let _ = (input, builder, content, cx);
        true
    }
}

/// Per-pass rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Inline fetched images as `data:` URIs instead of linking the source.
    pub embed_images: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { embed_images: true }
    }
}

/// What the dispatcher built for one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLayer {
    /// Layer id.
    pub layer_id: String,
    /// Layer type.
    pub layer_type: LayerType,
    /// Id of the enclosing group layer, if any.
    pub parent: Option<String>,
    /// Transform wrapper.
    pub wrapper: NodeRef,
    /// Content node inside the wrapper.
    pub content: NodeRef,
    /// Structure key at build time.
    pub structure_key: String,
    /// Sources this layer is waiting on.
    pub pending: Vec<String>,
}

struct Frame {
    layer_id: String,
    pending: Vec<String>,
}

/// State threaded through one render pass.
pub struct RenderContext<'a> {
    registry: &'a RendererRegistry,
    /// Pass-scoped resource definitions.
    pub resources: &'a mut ResourceCollection,
    /// Where external content comes from.
    pub content: &'a dyn ContentSource,
    /// Options.
    pub options: RenderOptions,
    records: Vec<RenderedLayer>,
    frames: Vec<Frame>,
}

impl<'a> RenderContext<'a> {
    /// Start a pass.
    pub fn new(
        registry: &'a RendererRegistry,
        resources: &'a mut ResourceCollection,
        content: &'a dyn ContentSource,
        options: RenderOptions,
    ) -> Self {
        Self {
            registry,
            resources,
            content,
            options,
            records: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Note that the layer being rendered waits on `src`.
    pub fn wait_for(&mut self, src: &str) {
        if let Some(frame) = self.frames.last_mut() {
            if !frame.pending.iter().any(|s| s == src) {
                frame.pending.push(src.to_string());
            }
        }
    }

    /// Intern a resource definition.
    pub fn intern(&mut self, definition: ResourceDefinition) -> ResourceId {
        self.resources.intern(definition)
    }

    /// Render `layers` in paint order and append them to `parent`.
    pub fn render_children(
        &mut self,
        builder: &mut dyn NodeBuilder,
        parent: NodeRef,
        layers: &[Layer],
    ) {
        let registry = self.registry;
        registry.render_layers(builder, parent, layers, self);
    }

    /// Records for every layer rendered so far, children before parents.
    #[must_use]
    pub fn records(&self) -> &[RenderedLayer] {
        &self.records
    }

    /// End the pass and take the records.
    #[must_use]
    pub fn finish(self) -> Vec<RenderedLayer> {
        self.records
    }
}

/// The wrapper transform: `translate(x y)`, then `rotate(r cx cy)` about the
/// layer center when rotated, then `scale(sx sy)` when scaled.
#[must_use]
pub fn transform_attr(t: &ResolvedTransform) -> String {
    let mut out = format!("translate({} {})", fmt_num(t.x), fmt_num(t.y));
    if t.rotation != 0.0 {
        let _ = write!(
            out,
            " rotate({} {} {})",
            fmt_num(t.rotation),
            fmt_num(t.width / 2.0),
            fmt_num(t.height / 2.0)
        );
    }
    if t.scale_x != 1.0 || t.scale_y != 1.0 {
        let _ = write!(out, " scale({} {})", fmt_num(t.scale_x), fmt_num(t.scale_y));
    }
    out
}

fn apply_wrapper(builder: &mut dyn NodeBuilder, wrapper: NodeRef, resolved: &ResolvedLayer) {
    builder.set(wrapper, "transform", transform_attr(&resolved.transform));
    if resolved.transform.opacity < 1.0 {
        builder.set(wrapper, "opacity", resolved.transform.opacity);
    } else {
        builder.remove_attr(wrapper, "opacity");
    }
}

fn apply_effects(
    builder: &mut dyn NodeBuilder,
    content: NodeRef,
    resolved: &ResolvedLayer,
    resources: &mut ResourceCollection,
) {
    match FilterChain::from_effects(&resolved.effects) {
        Some(chain) => {
            let id = resources.intern(ResourceDefinition::Filter(chain));
            builder.set(content, "filter", id.url());
        }
        None => builder.remove_attr(content, "filter"),
    }
}

/// Type → renderer map.
#[derive(Default)]
pub struct RendererRegistry {
    renderers: Vec<Box<dyn TypeRenderer>>,
    by_type: HashMap<LayerType, usize>,
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field(
                "renderers",
                &self.renderers.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl RendererRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in renderer for every layer type.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for renderer in renderers::defaults() {
            // Built-in type sets are disjoint.
            let _ = registry.register(renderer);
        }
        registry
    }

    /// Register a renderer for the types it declares.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Duplicate`] when a declared type already has a
    /// renderer; nothing is registered in that case.
    pub fn register(&mut self, renderer: Box<dyn TypeRenderer>) -> Result<(), RegistryError> {
        let types = renderer.supported_types();
        if types.is_empty() {
            return Err(RegistryError::NoTypes(renderer.name()));
        }
        if let Some((layer_type, &index)) = types
            .iter()
            .find_map(|t| self.by_type.get(t).map(|index| (t, index)))
        {
            return Err(RegistryError::Duplicate {
                layer_type: layer_type.name().to_string(),
                existing: self.renderers[index].name(),
            });
        }
        let index = self.renderers.len();
        debug!(target: "lumen::registry", renderer = renderer.name(), ?types, "registered");
        for layer_type in types {
            let _ = self.by_type.insert(layer_type, index);
        }
        self.renderers.push(renderer);
        Ok(())
    }

    /// The renderer for a type.
    #[must_use]
    pub fn renderer_for(&self, layer_type: &LayerType) -> Option<&dyn TypeRenderer> {
        self.by_type
            .get(layer_type)
            .map(|&index| self.renderers[index].as_ref())
    }

    /// Build one layer as a detached wrapper. `None` when the layer is hidden
    /// or no renderer handles its type.
    pub fn build_layer(
        &self,
        builder: &mut dyn NodeBuilder,
        layer: &Layer,
        cx: &mut RenderContext<'_>,
    ) -> Option<NodeRef> {
        if !layer.visible {
            debug!(target: "lumen::registry", layer = %layer.id, "skipping hidden layer");
            return None;
        }
        let Some(renderer) = self.renderer_for(&layer.layer_type) else {
            debug!(
                target: "lumen::registry",
                layer = %layer.id,
                layer_type = layer.layer_type.name(),
                "no renderer for layer type"
            );
            return None;
        };

        let resolved = normalize_layer(layer);
        let input = LayerInput {
            layer,
            resolved: &resolved,
        };
        let wrapper = builder.create(ElementKind::Group);
        builder.set(wrapper, "data-layer-id", layer.id.as_str());
        builder.set(wrapper, "data-layer-type", layer.layer_type.name());
        apply_wrapper(builder, wrapper, &resolved);

        cx.frames.push(Frame {
            layer_id: layer.id.clone(),
            pending: Vec::new(),
        });
        let content = renderer.render_content(&input, builder, cx);
        let pending = cx.frames.pop().map(|f| f.pending).unwrap_or_default();

        apply_effects(builder, content, &resolved, cx.resources);
        builder.append(wrapper, content);

        cx.records.push(RenderedLayer {
            layer_id: layer.id.clone(),
            layer_type: layer.layer_type.clone(),
            parent: cx.frames.last().map(|f| f.layer_id.clone()),
            wrapper,
            content,
            structure_key: renderer.structure_key(&input),
            pending,
        });
        Some(wrapper)
    }

    /// Build one layer and append it to `parent`.
    pub fn render_layer(
        &self,
        builder: &mut dyn NodeBuilder,
        parent: NodeRef,
        layer: &Layer,
        cx: &mut RenderContext<'_>,
    ) -> Option<NodeRef> {
        let wrapper = self.build_layer(builder, layer, cx)?;
        builder.append(parent, wrapper);
        Some(wrapper)
    }

    /// Render `layers` in paint order under `parent`.
    pub fn render_layers(
        &self,
        builder: &mut dyn NodeBuilder,
        parent: NodeRef,
        layers: &[Layer],
        cx: &mut RenderContext<'_>,
    ) {
        for layer in paint_order(layers) {
            let _ = self.render_layer(builder, parent, layer, cx);
        }
    }

    /// Apply a changed layer to what was built for it. Returns `false` when
    /// the layer must be rebuilt instead.
    pub fn patch_layer(
        &self,
        builder: &mut dyn NodeBuilder,
        record: &mut RenderedLayer,
        layer: &Layer,
        cx: &mut RenderContext<'_>,
    ) -> bool {
        if !layer.visible || layer.layer_type != record.layer_type {
            return false;
        }
        let Some(renderer) = self.renderer_for(&layer.layer_type) else {
            return false;
        };
        let resolved = normalize_layer(layer);
        let input = LayerInput {
            layer,
            resolved: &resolved,
        };
        if renderer.structure_key(&input) != record.structure_key {
            debug!(target: "lumen::registry", layer = %layer.id, "structure changed");
            return false;
        }

        cx.frames.push(Frame {
            layer_id: layer.id.clone(),
            pending: Vec::new(),
        });
        let patched = renderer.patch_content(&input, builder, record.content, cx);
        let pending = cx.frames.pop().map(|f| f.pending).unwrap_or_default();
        if !patched {
            return false;
        }
        apply_wrapper(builder, record.wrapper, &resolved);
        apply_effects(builder, record.content, &resolved, cx.resources);
        record.pending = pending;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_model::Transform;

    #[test]
    fn test_transform_attr() {
        let mut raw = Transform::from_rect(10.0, 20.0, 100.0, 50.0);
        let t = ResolvedTransform::from_raw(&raw);
        assert_eq!(transform_attr(&t), "translate(10 20)");
        raw.rotation = Some(45.0);
        raw.scale_x = Some(2.0);
        let t = ResolvedTransform::from_raw(&raw);
        assert_eq!(transform_attr(&t), "translate(10 20) rotate(45 50 25) scale(2 1)");
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = RendererRegistry::with_defaults();
        let again = renderers::defaults().into_iter().next();
        let err = registry.register(again.unwrap()).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { .. }));
    }
}
