//! Interactive render target for Lumen.
//!
//! A [`Stage`] mounts a design into a live [`SceneGraph`] built by the same
//! renderers as the static exporter, then applies edits incrementally:
//! paint-only changes patch existing nodes, structural changes rebuild one
//! layer, and moves touch only the layer's wrapper transform.
//!
//! External content never blocks a render. Layers whose content is still
//! being fetched show a loading placeholder; [`Stage::poll_loads`] swaps in
//! the real content once the background fetch finishes.
//!
//! The host hears about changes through [`SceneEvent`]s delivered to
//! closures registered with [`Stage::subscribe`].

pub mod events;
pub mod graph;
pub mod hit;
pub mod loader;
pub mod stage;

pub use events::{EventBus, EventKind, SceneEvent, SubscriptionId};
pub use graph::{SceneGraph, SceneNode, SceneSnapshot};
pub use loader::{Completion, ContentKind, DeferredContent};
pub use stage::{SceneError, Stage, StageOptions, UpdatePath};
