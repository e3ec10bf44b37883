//! Event and listener types.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::HandlerId;

use super::Target;

// ============================================================================
// Well-known Event Names
// ============================================================================

/// Event names the crate and [`MemoryDocument`](super::MemoryDocument) emit.
pub mod events {
    /// Window: document and subresources fully loaded.
    pub const LOAD: &str = "load";
    /// Document: markup parsed.
    pub const DOM_CONTENT_LOADED: &str = "DOMContentLoaded";
    /// Document: `readyState` changed.
    pub const READY_STATE_CHANGE: &str = "readystatechange";
    /// Element clicked.
    pub const CLICK: &str = "click";
    /// Element gained focus.
    pub const FOCUS: &str = "focus";
    /// Element lost focus.
    pub const BLUR: &str = "blur";
    /// Form submitted.
    pub const SUBMIT: &str = "submit";
    /// Form control value committed.
    pub const CHANGE: &str = "change";
}

// ============================================================================
// Event
// ============================================================================

/// A DOM event as delivered to listeners.
///
/// # Format
///
/// ```json
/// {
///   "name": "click",
///   "detail": null,
///   "target": { "kind": "element", "id": "..." }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type, e.g. `click`.
    pub name: String,

    /// Custom payload (`CustomEvent.detail`).
    #[serde(default)]
    pub detail: Value,

    /// Dispatch target, filled in by the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
}

impl Event {
    /// Creates an event with no payload.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: Value::Null,
            target: None,
        }
    }

    /// Attaches a payload.
    #[inline]
    #[must_use]
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }

    /// Returns a copy addressed to `target`.
    #[must_use]
    pub fn targeted(&self, target: &Target) -> Self {
        Self {
            target: Some(target.clone()),
            ..self.clone()
        }
    }
}

// ============================================================================
// Listener
// ============================================================================

/// Listener callback type.
pub type ListenerFn = Arc<dyn Fn(&Event) + Send + Sync>;

/// A registered event listener.
///
/// `id` is the identity used for de-duplication and removal.
#[derive(Clone)]
pub struct Listener {
    /// Identity for removal.
    pub id: HandlerId,
    /// Invoked on every matching event.
    pub callback: ListenerFn,
}

impl Listener {
    /// Creates a listener.
    pub fn new(id: HandlerId, callback: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        Self {
            id,
            callback: Arc::new(callback),
        }
    }

    /// Invokes the callback.
    #[inline]
    pub fn call(&self, event: &Event) {
        (self.callback)(event);
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::identifiers::NodeId;

    #[test]
    fn test_event_deserialize_defaults() {
        let event: Event = serde_json::from_value(json!({"name": "click"})).unwrap();
        assert_eq!(event.name, "click");
        assert!(event.detail.is_null());
        assert!(event.target.is_none());
    }

    #[test]
    fn test_targeted_keeps_detail() {
        let event = Event::new("custom").with_detail(json!({"n": 1}));
        let target = Target::Element(NodeId::new("a"));
        let addressed = event.targeted(&target);
        assert_eq!(addressed.detail, json!({"n": 1}));
        assert_eq!(addressed.target, Some(target));
    }

    #[test]
    fn test_listener_call() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let listener = Listener::new(HandlerId::generate(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        listener.call(&Event::new("x"));
        listener.clone().call(&Event::new("x"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
