//! Host DOM contract.
//!
//! Collections never touch a DOM directly. Every query, mutation and event
//! goes through the [`Host`] trait, which a browser bridge or a headless tree
//! implements.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `event` | [`Event`], [`Listener`] and well-known event names |
//! | `memory` | [`MemoryDocument`], an in-process host |

// ============================================================================
// Submodules
// ============================================================================

mod event;

/// In-memory DOM host.
pub mod memory;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::identifiers::{HandlerId, NodeId};

// ============================================================================
// Re-exports
// ============================================================================

pub use event::{Event, Listener, ListenerFn, events};
pub use memory::MemoryDocument;

// ============================================================================
// Root / Target
// ============================================================================

/// The two top-level host objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Root {
    /// The top-level window.
    Window,
    /// The document.
    Document,
}

/// Anything a collection can hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Target {
    /// The top-level window.
    Window,
    /// The document.
    Document,
    /// A node inside the document.
    Element(NodeId),
}

impl Target {
    /// Returns the node ID when this is an element.
    #[inline]
    #[must_use]
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            Self::Element(id) => Some(id),
            Self::Window | Self::Document => None,
        }
    }

    /// Returns `true` for the window or document.
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        !matches!(self, Self::Element(_))
    }
}

impl From<Root> for Target {
    fn from(root: Root) -> Self {
        match root {
            Root::Window => Self::Window,
            Root::Document => Self::Document,
        }
    }
}

impl From<NodeId> for Target {
    fn from(id: NodeId) -> Self {
        Self::Element(id)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Window => f.write_str("window"),
            Self::Document => f.write_str("document"),
            Self::Element(id) => write!(f, "element:{id}"),
        }
    }
}

// ============================================================================
// ReadyState
// ============================================================================

/// Document loading state, mirroring `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    /// Still parsing.
    Loading,
    /// Parsed; `DOMContentLoaded` has fired.
    Interactive,
    /// Fully loaded; window `load` has fired.
    Complete,
}

impl ReadyState {
    /// Returns the DOM string form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Interactive => "interactive",
            Self::Complete => "complete",
        }
    }
}

// ============================================================================
// NodeList
// ============================================================================

/// A live host node list.
///
/// Collections take a snapshot of [`NodeList::items`] when built, so later
/// changes to the list do not leak into them.
pub trait NodeList: Send + Sync {
    /// Current members in document order.
    fn items(&self) -> Vec<NodeId>;
}

// ============================================================================
// Host
// ============================================================================

/// The DOM operations a collection needs.
///
/// Implementations must invoke listeners outside of any internal lock so
/// callbacks can call back into the host.
#[async_trait]
pub trait Host: Send + Sync + 'static {
    /// Runs `selector` against the document, or against descendants of
    /// `scope` when given. Results are in document order.
    async fn query_all(&self, scope: Option<&NodeId>, selector: &str) -> Result<Vec<NodeId>>;

    /// Immediate element children of `parent`. For the window or document
    /// these are the document's top-level elements.
    async fn children(&self, parent: &Target) -> Result<Vec<NodeId>>;

    /// Every child node of `parent` in order, text nodes included. For the
    /// window or document these are the document's top-level nodes.
    async fn child_nodes(&self, parent: &Target) -> Result<Vec<NodeId>>;

    /// Parent of `node`: another element, the document, or nothing when
    /// detached.
    async fn parent(&self, node: &NodeId) -> Result<Option<Target>>;

    /// Lower-case tag name of an element.
    async fn tag_name(&self, node: &NodeId) -> Result<String>;

    /// Creates a detached element.
    async fn create_element(&self, tag: &str) -> Result<NodeId>;

    /// Creates a detached text node.
    async fn create_text(&self, text: &str) -> Result<NodeId>;

    /// Detaches `node` from its parent. No-op when already detached.
    async fn detach(&self, node: &NodeId) -> Result<()>;

    /// Removes every child of `node`.
    async fn clear_children(&self, node: &NodeId) -> Result<()>;

    /// Appends `child` as the last child of `parent`, moving it if attached
    /// elsewhere.
    async fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<()>;

    /// Reads `target[name]`.
    async fn get_property(&self, target: &Target, name: &str) -> Result<Value>;

    /// Writes `target[name] = value`.
    async fn set_property(&self, target: &Target, name: &str, value: Value) -> Result<()>;

    /// Reads an attribute through the attribute interface.
    async fn get_attribute(&self, node: &NodeId, name: &str) -> Result<Option<String>>;

    /// Writes an attribute through the attribute interface.
    async fn set_attribute(&self, node: &NodeId, name: &str, value: &str) -> Result<()>;

    /// Registers `listener` for `event` on `target`.
    async fn add_listener(&self, target: &Target, event: &str, listener: Listener) -> Result<()>;

    /// Unregisters the listener with `id`. Returns whether one was removed.
    async fn remove_listener(&self, target: &Target, event: &str, id: HandlerId) -> Result<bool>;

    /// Dispatches a synthetic event to `target`.
    async fn dispatch(&self, target: &Target, event: &Event) -> Result<()>;

    /// Runs the native action `name` (e.g. `click`) on `target`.
    ///
    /// Returns `false` without side effects when the target has no such
    /// action.
    async fn invoke_action(&self, target: &Target, name: &str) -> Result<bool>;

    /// Current document ready state.
    async fn ready_state(&self) -> Result<ReadyState>;
}

// ============================================================================
// Helpers
// ============================================================================

/// String form used when a JSON value lands in an attribute or text slot.
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_serde_shape() {
        let json = serde_json::to_value(Target::Element(NodeId::new("a"))).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "element", "id": "a"}));

        let json = serde_json::to_value(Target::Document).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "document"}));
    }

    #[test]
    fn test_root_into_target() {
        assert_eq!(Target::from(Root::Window), Target::Window);
        assert!(Target::from(Root::Document).is_root());
        assert!(!Target::Element(NodeId::new("x")).is_root());
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&Value::Null), "");
        assert_eq!(stringify(&serde_json::json!("a")), "a");
        assert_eq!(stringify(&serde_json::json!(12)), "12");
        assert_eq!(stringify(&serde_json::json!(true)), "true");
    }

    #[test]
    fn test_ready_state_order() {
        assert!(ReadyState::Loading < ReadyState::Interactive);
        assert!(ReadyState::Interactive < ReadyState::Complete);
        assert_eq!(ReadyState::Complete.as_str(), "complete");
    }
}
