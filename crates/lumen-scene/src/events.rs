//! Events the stage reports back to its host.

use lumen_model::Transform;
use serde::Serialize;
use strum_macros::{AsRefStr, EnumString};

/// Event names, as the host sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr)]
pub enum EventKind {
    /// A layer became the selection.
    #[strum(serialize = "layer:select")]
    Select,
    /// The selected layer was released.
    #[strum(serialize = "layer:deselect")]
    Deselect,
    /// A layer was moved.
    #[strum(serialize = "layer:positionchange")]
    PositionChange,
    /// A layer's transform was replaced.
    #[strum(serialize = "layer:transformchange")]
    TransformChange,
    /// A layer was updated in place or rebuilt.
    #[strum(serialize = "layer:update")]
    Update,
    /// A layer was removed.
    #[strum(serialize = "layer:remove")]
    Remove,
    /// External content for a layer finished loading.
    #[strum(serialize = "layer:contentload")]
    ContentLoad,
    /// External content for a layer failed to load.
    #[strum(serialize = "layer:contenterror")]
    ContentError,
}

/// An event with its payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all_fields = "camelCase")]
pub enum SceneEvent {
    /// See [`EventKind::Select`].
    #[serde(rename = "layer:select")]
    Select {
        /// Layer id.
        layer_id: String,
    },
    /// See [`EventKind::Deselect`].
    #[serde(rename = "layer:deselect")]
    Deselect {
        /// Layer id.
        layer_id: String,
    },
    /// See [`EventKind::PositionChange`].
    #[serde(rename = "layer:positionchange")]
    PositionChange {
        /// Layer id.
        layer_id: String,
        /// New left edge.
        x: f64,
        /// New top edge.
        y: f64,
    },
    /// See [`EventKind::TransformChange`].
    #[serde(rename = "layer:transformchange")]
    TransformChange {
        /// Layer id.
        layer_id: String,
        /// The new raw transform.
        transform: Transform,
    },
    /// See [`EventKind::Update`].
    #[serde(rename = "layer:update")]
    Update {
        /// Layer id.
        layer_id: String,
        /// Whether the layer was rebuilt rather than patched.
        rebuilt: bool,
    },
    /// See [`EventKind::Remove`].
    #[serde(rename = "layer:remove")]
    Remove {
        /// Layer id.
        layer_id: String,
    },
    /// See [`EventKind::ContentLoad`].
    #[serde(rename = "layer:contentload")]
    ContentLoad {
        /// Layer id.
        layer_id: String,
        /// The source that loaded.
        src: String,
    },
    /// See [`EventKind::ContentError`].
    #[serde(rename = "layer:contenterror")]
    ContentError {
        /// Layer id.
        layer_id: String,
        /// The source that failed.
        src: String,
        /// Why.
        message: String,
    },
}

impl SceneEvent {
    /// The event name.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Select { .. } => EventKind::Select,
            Self::Deselect { .. } => EventKind::Deselect,
            Self::PositionChange { .. } => EventKind::PositionChange,
            Self::TransformChange { .. } => EventKind::TransformChange,
            Self::Update { .. } => EventKind::Update,
            Self::Remove { .. } => EventKind::Remove,
            Self::ContentLoad { .. } => EventKind::ContentLoad,
            Self::ContentError { .. } => EventKind::ContentError,
        }
    }

    /// The layer the event is about.
    #[must_use]
    pub fn layer_id(&self) -> &str {
        match self {
            Self::Select { layer_id }
            | Self::Deselect { layer_id }
            | Self::PositionChange { layer_id, .. }
            | Self::TransformChange { layer_id, .. }
            | Self::Update { layer_id, .. }
            | Self::Remove { layer_id }
            | Self::ContentLoad { layer_id, .. }
            | Self::ContentError { layer_id, .. } => layer_id,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&SceneEvent)>;

struct Subscriber {
    id: SubscriptionId,
    filter: Option<EventKind>,
    handler: Handler,
}

/// Subscriber list. Handlers run synchronously, in subscription order.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    /// Call `handler` for events of `filter`'s kind, or for every event when
    /// `filter` is `None`.
    pub fn subscribe<F>(&mut self, filter: Option<EventKind>, handler: F) -> SubscriptionId
    where
        F: FnMut(&SceneEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            filter,
            handler: Box::new(handler),
        });
        id
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Deliver an event.
    pub fn emit(&mut self, event: &SceneEvent) {
        let kind = event.kind();
        for subscriber in &mut self.subscribers {
            if subscriber.filter.is_none_or(|f| f == kind) {
                (subscriber.handler)(event);
            }
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// No subscriptions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_event_names() {
        let event = SceneEvent::PositionChange {
            layer_id: "a".into(),
            x: 1.0,
            y: 2.0,
        };
        assert_eq!(event.kind().as_ref(), "layer:positionchange");
        assert_eq!("layer:contenterror".parse::<EventKind>(), Ok(EventKind::ContentError));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "layer:positionchange");
        assert_eq!(json["layerId"], "a");
    }

    #[test]
    fn test_filtered_subscription_and_unsubscribe() {
        let mut bus = EventBus::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let all = {
            let seen = Rc::clone(&seen);
            bus.subscribe(None, move |e| seen.borrow_mut().push(format!("all {}", e.layer_id())))
        };
        let _selects = {
            let seen = Rc::clone(&seen);
            bus.subscribe(Some(EventKind::Select), move |e| {
                seen.borrow_mut().push(format!("select {}", e.layer_id()));
            })
        };
        bus.emit(&SceneEvent::Select { layer_id: "a".into() });
        bus.emit(&SceneEvent::Remove { layer_id: "b".into() });
        assert!(bus.unsubscribe(all));
        assert!(!bus.unsubscribe(all));
        bus.emit(&SceneEvent::Select { layer_id: "c".into() });
        assert_eq!(*seen.borrow(), ["all a", "select a", "all b", "select c"]);
    }
}
