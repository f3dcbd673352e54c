//! The interactive stage: one mounted design, kept live.
//!
//! The stage renders a [`Design`] into a [`SceneGraph`] through the same
//! registry the exporter uses, then keeps every rendered layer addressable
//! by id so single layers can be patched, rebuilt, moved, or removed
//! without touching the rest of the scene.
//!
//! # Update paths
//!
//! - **Patch**: the layer's structure key is unchanged, so its renderer
//!   updates paint and wrapper attributes on the existing nodes.
//! - **Rebuild**: the key changed (new geometry, new source, different
//!   children), so the layer's subtree is built again and swapped in at the
//!   same position.
//! - **Remount**: stacking order changed, or a layer that had no nodes
//!   (hidden, unknown type) needs some; the whole scene is rendered again.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use lumen_common::FetchOptions;
use lumen_model::{Design, Layer, LayerProperties, LayerType, Transform, paint_order};
use lumen_render::{
    AttrValue, ContentSource, ContentState, ElementInfo, ElementKind, LoadError, NodeBuilder,
    NodeBuilderExt, NodeRef, Point, RenderContext, RenderOptions, RenderedLayer,
    RendererRegistry, ResourceCollection, canvas_background, emit_definitions, transform_attr,
    url_references,
};
use lumen_style::{ResolvedTransform, normalize_canvas};
use serde_json::Value;
use tracing::debug;

use crate::events::{EventBus, EventKind, SceneEvent, SubscriptionId};
use crate::graph::{SceneGraph, SceneSnapshot};
use crate::hit;
use crate::loader::{Completion, DeferredContent};

/// Longest wait [`Stage::wait_for_loads`] honors.
const MAX_WAIT: Duration = Duration::from_secs(24 * 60 * 60);

/// Errors from stage operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    /// No layer with this id in the mounted design.
    #[error("no layer with id '{0}'")]
    NotFound(String),
    /// The layer is locked against interactive edits.
    #[error("layer '{0}' is locked")]
    Locked(String),
    /// The layer exists but has no nodes (hidden or unknown type).
    #[error("layer '{0}' is not rendered")]
    NotRendered(String),
    /// The operation needs a vector-source layer.
    #[error("layer '{id}' is a {actual} layer, not a vector-source layer")]
    NotVector {
        /// Layer id.
        id: String,
        /// Its actual type name.
        actual: String,
    },
    /// The layer's content has not arrived yet.
    #[error("content for layer '{0}' is still loading")]
    Loading(String),
    /// The layer's content failed to load.
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Stage configuration.
#[derive(Debug, Clone)]
pub struct StageOptions {
    /// How external content is fetched.
    pub fetch: FetchOptions,
    /// Inline images as `data:` URIs instead of linking the source.
    pub embed_images: bool,
    /// Paint the canvas background behind the layers.
    pub include_background: bool,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            fetch: FetchOptions::default(),
            embed_images: true,
            include_background: true,
        }
    }
}

/// How [`Stage::update`] applied a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePath {
    /// Attributes changed in place.
    Patched,
    /// The layer's subtree was rebuilt.
    Rebuilt,
    /// The whole scene was rendered again.
    Remounted,
}

/// A mounted design and its live scene.
#[derive(Debug)]
pub struct Stage {
    options: StageOptions,
    registry: RendererRegistry,
    content: DeferredContent,
    graph: SceneGraph,
    defs: NodeRef,
    resources: ResourceCollection,
    design: Design,
    records: HashMap<String, RenderedLayer>,
    selected: Option<String>,
    events: EventBus,
}

impl Stage {
    /// An empty stage with the default renderers.
    #[must_use]
    pub fn new(options: StageOptions) -> Self {
        Self::with_registry(options, RendererRegistry::with_defaults())
    }

    /// An empty stage with a caller-supplied registry.
    #[must_use]
    pub fn with_registry(options: StageOptions, registry: RendererRegistry) -> Self {
        let content = DeferredContent::new(options.fetch.clone());
        let mut stage = Self {
            options,
            registry,
            content,
            graph: SceneGraph::new(),
            defs: NodeRef(0),
            resources: ResourceCollection::new(),
            design: Design::default(),
            records: HashMap::new(),
            selected: None,
            events: EventBus::default(),
        };
        stage.render_all();
        stage
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// The scene graph.
    #[must_use]
    pub const fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// The mounted design, with every applied edit.
    #[must_use]
    pub const fn design(&self) -> &Design {
        &self.design
    }

    /// The shared `<defs>` group in the scene.
    #[must_use]
    pub const fn defs(&self) -> NodeRef {
        self.defs
    }

    /// What was rendered for a layer.
    #[must_use]
    pub fn record(&self, layer_id: &str) -> Option<&RenderedLayer> {
        self.records.get(layer_id)
    }

    /// Every rendered layer, in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &RenderedLayer> {
        self.records.values()
    }

    /// The selected layer id.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Background fetches not yet applied.
    #[must_use]
    pub fn pending_loads(&self) -> usize {
        self.content.pending()
    }

    /// Copy of the whole scene.
    #[must_use]
    pub fn snapshot(&self) -> Option<SceneSnapshot> {
        self.graph.snapshot(self.graph.root())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────

    /// Call `handler` for events of one kind, or for all events when
    /// `filter` is `None`.
    pub fn subscribe<F>(&mut self, filter: Option<EventKind>, handler: F) -> SubscriptionId
    where
        F: FnMut(&SceneEvent) + 'static,
    {
        self.events.subscribe(filter, handler)
    }

    /// Remove a subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    fn emit(&mut self, event: SceneEvent) {
        let kind = event.kind();
        let name: &str = kind.as_ref();
        debug!(target: "lumen::scene", event = name, layer = event.layer_id(), "event");
        self.events.emit(&event);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────

    /// Replace the scene with a new design. A selection that no longer
    /// exists is released.
    pub fn mount(&mut self, design: Design) {
        self.design = design;
        self.render_all();
        if let Some(selected) = self.selected.clone() {
            if !self.records.contains_key(&selected) {
                self.selected = None;
                self.emit(SceneEvent::Deselect {
                    layer_id: selected,
                });
            }
        }
    }

    const fn render_options(&self) -> RenderOptions {
        RenderOptions {
            embed_images: self.options.embed_images,
        }
    }

    fn render_all(&mut self) {
        let options = self.render_options();
        self.graph = SceneGraph::new();
        self.resources = ResourceCollection::new();
        self.records.clear();

        let root = self.graph.root();
        self.defs = self.graph.child(root, ElementKind::Defs, &[]);
        if self.options.include_background {
            let canvas = normalize_canvas(&self.design);
            let _ = canvas_background(&mut self.graph, root, &canvas, &mut self.resources);
        }

        let mut cx =
            RenderContext::new(&self.registry, &mut self.resources, &self.content, options);
        cx.render_children(&mut self.graph, root, &self.design.layers);
        let records = cx.finish();
        debug!(target: "lumen::scene", layers = records.len(), "mounted");
        self.records = records
            .into_iter()
            .map(|r| (r.layer_id.clone(), r))
            .collect();
        self.refresh_defs();
    }

    /// Drop definitions no attached node refers to any more, then emit the
    /// rest into the shared `<defs>`.
    fn refresh_defs(&mut self) {
        let used = referenced_ids(&self.graph, self.defs);
        let _ = self.resources.retain_used(&used);
        self.graph.clear_children(self.defs);
        emit_definitions(&mut self.graph, self.defs, &self.resources);
    }

    /// Whether `layer_id` is `ancestor` or rendered inside it.
    fn descends_from(&self, layer_id: &str, ancestor: &str) -> bool {
        let mut current = Some(layer_id);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.records.get(id).and_then(|r| r.parent.as_deref());
        }
        false
    }

    fn drop_records(&mut self, layer_id: &str) {
        let doomed: Vec<String> = self
            .records
            .keys()
            .filter(|id| self.descends_from(id, layer_id))
            .cloned()
            .collect();
        for id in doomed {
            let _ = self.records.remove(&id);
        }
    }

    /// Build a layer's subtree again and swap it in.
    fn rebuild(&mut self, layer_id: &str) -> UpdatePath {
        let Some(record) = self.records.get(layer_id) else {
            self.render_all();
            return UpdatePath::Remounted;
        };
        let old_wrapper = record.wrapper;
        let parent = record.parent.clone();
        let Some(layer) = find_layer(&self.design.layers, layer_id).cloned() else {
            let _ = self.graph.remove(old_wrapper);
            self.drop_records(layer_id);
            return UpdatePath::Rebuilt;
        };

        let options = self.render_options();
        let mut cx =
            RenderContext::new(&self.registry, &mut self.resources, &self.content, options);
        let wrapper = self.registry.build_layer(&mut self.graph, &layer, &mut cx);
        let fresh = cx.finish();

        self.drop_records(layer_id);
        match wrapper {
            Some(wrapper) => {
                let _ = self.graph.replace(old_wrapper, wrapper);
            }
            None => {
                let _ = self.graph.remove(old_wrapper);
            }
        }
        for mut record in fresh {
            if record.layer_id == layer_id {
                record.parent.clone_from(&parent);
            }
            let _ = self.records.insert(record.layer_id.clone(), record);
        }
        self.refresh_defs();
        UpdatePath::Rebuilt
    }

    // ─────────────────────────────────────────────────────────────────────
    // Edits
    // ─────────────────────────────────────────────────────────────────────

    /// Apply a changed layer (matched by id), patching in place when its
    /// structure is unchanged.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotFound`] when no layer has this id.
    pub fn update(&mut self, layer: Layer) -> Result<UpdatePath, SceneError> {
        let id = layer.id.clone();
        let Some(slot) = find_layer_mut(&mut self.design.layers, &id) else {
            return Err(SceneError::NotFound(id));
        };
        let reordered = slot.z_index != layer.z_index;
        *slot = layer.clone();

        let path = if reordered {
            self.render_all();
            UpdatePath::Remounted
        } else if let Some(mut record) = self.records.remove(&id) {
            let options = self.render_options();
            let mut cx =
                RenderContext::new(&self.registry, &mut self.resources, &self.content, options);
            let patched = self
                .registry
                .patch_layer(&mut self.graph, &mut record, &layer, &mut cx);
            let _ = self.records.insert(id.clone(), record);
            if patched {
                self.refresh_defs();
                UpdatePath::Patched
            } else {
                self.rebuild(&id)
            }
        } else {
            self.render_all();
            UpdatePath::Remounted
        };

        debug!(target: "lumen::scene", layer = %id, ?path, "updated");
        self.emit(SceneEvent::Update {
            layer_id: id,
            rebuilt: path != UpdatePath::Patched,
        });
        Ok(path)
    }

    /// Remove a layer and everything inside it.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotFound`] when no layer has this id.
    pub fn remove_layer(&mut self, layer_id: &str) -> Result<(), SceneError> {
        if take_layer(&mut self.design.layers, layer_id).is_none() {
            return Err(SceneError::NotFound(layer_id.to_string()));
        }
        if let Some(record) = self.records.get(layer_id) {
            let _ = self.graph.remove(record.wrapper);
        }
        let selection_removed = self
            .selected
            .as_deref()
            .is_some_and(|selected| self.descends_from(selected, layer_id));
        self.drop_records(layer_id);
        if selection_removed {
            let _ = self.deselect();
        }
        self.emit(SceneEvent::Remove {
            layer_id: layer_id.to_string(),
        });
        Ok(())
    }

    /// Select a rendered layer. Locked layers can be selected.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotFound`] or [`SceneError::NotRendered`].
    pub fn select(&mut self, layer_id: &str) -> Result<(), SceneError> {
        if find_layer(&self.design.layers, layer_id).is_none() {
            return Err(SceneError::NotFound(layer_id.to_string()));
        }
        if !self.records.contains_key(layer_id) {
            return Err(SceneError::NotRendered(layer_id.to_string()));
        }
        if self.selected.as_deref() == Some(layer_id) {
            return Ok(());
        }
        let _ = self.deselect();
        self.selected = Some(layer_id.to_string());
        self.emit(SceneEvent::Select {
            layer_id: layer_id.to_string(),
        });
        Ok(())
    }

    /// Release the selection, returning the layer that was selected.
    pub fn deselect(&mut self) -> Option<String> {
        let previous = self.selected.take()?;
        self.emit(SceneEvent::Deselect {
            layer_id: previous.clone(),
        });
        Some(previous)
    }

    fn editable_layer(&mut self, layer_id: &str) -> Result<&mut Layer, SceneError> {
        let layer = find_layer_mut(&mut self.design.layers, layer_id)
            .ok_or_else(|| SceneError::NotFound(layer_id.to_string()))?;
        if layer.locked {
            return Err(SceneError::Locked(layer_id.to_string()));
        }
        Ok(layer)
    }

    /// Move a layer's top-left corner, updating only its wrapper transform.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotFound`] or [`SceneError::Locked`].
    pub fn move_layer(&mut self, layer_id: &str, x: f64, y: f64) -> Result<(), SceneError> {
        let layer = self.editable_layer(layer_id)?;
        layer.transform.x = Some(x);
        layer.transform.y = Some(y);
        let resolved = ResolvedTransform::from_raw(&layer.transform);

        if let Some(record) = self.records.get(layer_id) {
            self.graph
                .set(record.wrapper, "transform", transform_attr(&resolved));
        }
        self.emit(SceneEvent::PositionChange {
            layer_id: layer_id.to_string(),
            x: resolved.x,
            y: resolved.y,
        });
        Ok(())
    }

    /// Replace a layer's transform. Size changes rebuild the layer.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotFound`] or [`SceneError::Locked`].
    pub fn transform_layer(
        &mut self,
        layer_id: &str,
        transform: Transform,
    ) -> Result<UpdatePath, SceneError> {
        let mut layer = self.editable_layer(layer_id)?.clone();
        layer.transform = transform.clone();
        let path = self.update(layer)?;
        self.emit(SceneEvent::TransformChange {
            layer_id: layer_id.to_string(),
            transform,
        });
        Ok(path)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    /// The topmost rendered layer under a canvas point. Inside a group the
    /// deepest child wins; the group itself answers for its empty area.
    #[must_use]
    pub fn hit_test(&self, x: f64, y: f64) -> Option<String> {
        self.hit(&self.design.layers, Point::new(x, y))
    }

    fn hit(&self, layers: &[Layer], point: Point) -> Option<String> {
        for layer in paint_order(layers).into_iter().rev() {
            if !self.records.contains_key(&layer.id) {
                continue;
            }
            let transform = ResolvedTransform::from_raw(&layer.transform);
            let Some(local) = hit::to_local(&transform, point) else {
                continue;
            };
            if layer.layer_type == LayerType::Group {
                if let Some(child) = self.hit(&layer.children, local) {
                    return Some(child);
                }
            }
            if hit::inside(&transform, local) {
                return Some(layer.id.clone());
            }
        }
        None
    }

    /// The parsed elements of a vector-source layer's document.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotFound`], [`SceneError::NotVector`],
    /// [`SceneError::Loading`], or [`SceneError::Load`].
    pub fn vector_elements(&self, layer_id: &str) -> Result<Vec<ElementInfo>, SceneError> {
        let layer = find_layer(&self.design.layers, layer_id)
            .ok_or_else(|| SceneError::NotFound(layer_id.to_string()))?;
        let LayerProperties::VectorSource(properties) = &layer.properties else {
            return Err(SceneError::NotVector {
                id: layer_id.to_string(),
                actual: layer.layer_type.name().to_string(),
            });
        };
        let Some(src) = properties.src.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Ok(Vec::new());
        };
        match self.content.vector(src) {
            ContentState::Ready(document) => Ok(document.elements()),
            ContentState::Loading => Err(SceneError::Loading(layer_id.to_string())),
            ContentState::Failed(error) => Err(SceneError::Load(error)),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Content
    // ─────────────────────────────────────────────────────────────────────

    /// Apply finished background fetches. Returns the number of layers
    /// rebuilt.
    pub fn poll_loads(&mut self) -> usize {
        let done = self.content.poll();
        self.apply_completions(done)
    }

    /// Apply fetches as they finish until none are pending or `timeout`
    /// passes. Returns `true` when everything settled.
    pub fn wait_for_loads(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout.min(MAX_WAIT);
        loop {
            let _ = self.poll_loads();
            if self.content.pending() == 0 {
                return true;
            }
            let done = self.content.wait_until(deadline);
            if done.is_empty() {
                return self.content.pending() == 0;
            }
            let _ = self.apply_completions(done);
        }
    }

    fn apply_completions(&mut self, done: Vec<Completion>) -> usize {
        let mut rebuilt: Vec<String> = Vec::new();
        for completion in done {
            let waiting: Vec<String> = self
                .records
                .values()
                .filter(|r| r.pending.contains(&completion.src))
                .map(|r| r.layer_id.clone())
                .collect();
            if waiting.is_empty() {
                debug!(
                    target: "lumen::scene",
                    src = %completion.src,
                    "no layer waiting, discarded"
                );
                continue;
            }
            for layer_id in waiting {
                let covered = rebuilt
                    .iter()
                    .any(|prior| prior != &layer_id && self.descends_from(&layer_id, prior));
                if covered || !self.records.contains_key(&layer_id) {
                    continue;
                }
                let _ = self.rebuild(&layer_id);
                let event = match &completion.error {
                    None => SceneEvent::ContentLoad {
                        layer_id: layer_id.clone(),
                        src: completion.src.clone(),
                    },
                    Some(error) => SceneEvent::ContentError {
                        layer_id: layer_id.clone(),
                        src: completion.src.clone(),
                        message: error.to_string(),
                    },
                };
                self.emit(event);
                rebuilt.push(layer_id);
            }
        }
        rebuilt.len()
    }

    /// Drop a source from the caches and rebuild every layer that uses it,
    /// which starts a fresh fetch. Returns the number of layers rebuilt.
    pub fn reload_source(&mut self, src: &str) -> usize {
        let _ = self.content.invalidate(src);
        let mut users = Vec::new();
        collect_users(&self.design.layers, src, &mut users);
        let mut count = 0;
        for layer_id in users {
            if self.records.contains_key(&layer_id) {
                let _ = self.rebuild(&layer_id);
                count += 1;
            }
        }
        count
    }
}

/// Ids referenced through `url(#id)` by attached nodes outside `defs`.
fn referenced_ids(graph: &SceneGraph, defs: NodeRef) -> HashSet<&str> {
    let mut used = HashSet::new();
    let mut stack = vec![graph.root()];
    while let Some(node) = stack.pop() {
        if node == defs {
            continue;
        }
        if let Some(n) = graph.node(node) {
            for (_, value) in &n.attrs {
                if let AttrValue::Str(text) = value {
                    used.extend(url_references(text));
                }
            }
        }
        stack.extend_from_slice(graph.children(node));
    }
    used
}

fn find_layer<'a>(layers: &'a [Layer], id: &str) -> Option<&'a Layer> {
    layers.iter().find_map(|layer| layer.find(id))
}

fn find_layer_mut<'a>(layers: &'a mut [Layer], id: &str) -> Option<&'a mut Layer> {
    for layer in layers {
        if layer.id == id {
            return Some(layer);
        }
        if let Some(found) = find_layer_mut(&mut layer.children, id) {
            return Some(found);
        }
    }
    None
}

fn take_layer(layers: &mut Vec<Layer>, id: &str) -> Option<Layer> {
    if let Some(position) = layers.iter().position(|layer| layer.id == id) {
        return Some(layers.remove(position));
    }
    layers
        .iter_mut()
        .find_map(|layer| take_layer(&mut layer.children, id))
}

/// Ids of layers whose own properties mention `src`, outermost first.
fn collect_users(layers: &[Layer], src: &str, out: &mut Vec<String>) {
    for layer in layers {
        if mentions(&layer.properties.to_value(), src) {
            out.push(layer.id.clone());
        }
        collect_users(&layer.children, src, out);
    }
}

fn mentions(value: &Value, src: &str) -> bool {
    match value {
        Value::String(s) => s == src,
        Value::Array(items) => items.iter().any(|v| mentions(v, src)),
        Value::Object(map) => map.values().any(|v| mentions(v, src)),
        _ => false,
    }
}
