//! Construction inputs for [`Collection`].
//!
//! # Dynamic Shape
//!
//! [`Source::try_from`] accepts a JSON value:
//!
//! | Value | Source |
//! |-------|--------|
//! | `"ul > li"` | [`Source::Selector`] |
//! | `{"elementId": "..."}` | [`Source::Element`] |
//! | `{"root": "window"}` | [`Source::Root`] |
//! | `[{"elementId": "..."}, ...]` | [`Source::List`] |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::host::{NodeList, Root};
use crate::identifiers::NodeId;

use super::Collection;

// ============================================================================
// Source
// ============================================================================

/// What a collection can be built from.
#[derive(Clone)]
pub enum Source {
    /// Returned unchanged (same instance).
    Existing(Collection),
    /// The window or document.
    Root(Root),
    /// A single element.
    Element(NodeId),
    /// Elements in the given order.
    List(Vec<NodeId>),
    /// A live list, snapshotted at construction.
    NodeList(Arc<dyn NodeList>),
    /// A selector, resolved immediately.
    Selector(String),
    /// A selector, stored but not resolved.
    Lazy(String),
}

impl Source {
    /// Short name of the variant, for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Existing(_) => "existing",
            Self::Root(_) => "root",
            Self::Element(_) => "element",
            Self::List(_) => "list",
            Self::NodeList(_) => "node_list",
            Self::Selector(_) => "selector",
            Self::Lazy(_) => "lazy",
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Existing(c) => f.debug_tuple("Existing").field(c).finish(),
            Self::Root(r) => f.debug_tuple("Root").field(r).finish(),
            Self::Element(id) => f.debug_tuple("Element").field(id).finish(),
            Self::List(ids) => f.debug_tuple("List").field(ids).finish(),
            Self::NodeList(_) => f.write_str("NodeList(..)"),
            Self::Selector(s) => f.debug_tuple("Selector").field(s).finish(),
            Self::Lazy(s) => f.debug_tuple("Lazy").field(s).finish(),
        }
    }
}

// ============================================================================
// From implementations for ergonomics
// ============================================================================

impl From<Collection> for Source {
    fn from(collection: Collection) -> Self {
        Self::Existing(collection)
    }
}

impl From<&Collection> for Source {
    fn from(collection: &Collection) -> Self {
        Self::Existing(collection.clone())
    }
}

impl From<Root> for Source {
    fn from(root: Root) -> Self {
        Self::Root(root)
    }
}

impl From<NodeId> for Source {
    fn from(id: NodeId) -> Self {
        Self::Element(id)
    }
}

impl From<Vec<NodeId>> for Source {
    fn from(ids: Vec<NodeId>) -> Self {
        Self::List(ids)
    }
}

impl From<&[NodeId]> for Source {
    fn from(ids: &[NodeId]) -> Self {
        Self::List(ids.to_vec())
    }
}

impl<L: NodeList + 'static> From<Arc<L>> for Source {
    fn from(list: Arc<L>) -> Self {
        Self::NodeList(list)
    }
}

impl From<&str> for Source {
    /// Converts a string to a selector resolved on construction.
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for Source {
    /// Converts a string to a selector resolved on construction.
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

// ============================================================================
// Dynamic Values
// ============================================================================

impl TryFrom<&Value> for Source {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(selector) => Ok(Self::Selector(selector.clone())),
            Value::Object(_) => {
                if let Some(id) = element_ref(value) {
                    return Ok(Self::Element(id));
                }
                match value.get("root").and_then(Value::as_str) {
                    Some("window") => Ok(Self::Root(Root::Window)),
                    Some("document") => Ok(Self::Root(Root::Document)),
                    _ => Err(Error::invalid_argument(format!(
                        "object is neither an element nor a root reference: {value}"
                    ))),
                }
            }
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    element_ref(item).ok_or_else(|| {
                        Error::invalid_argument(format!("array entry is not an element: {item}"))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::List),
            Value::Null | Value::Bool(_) | Value::Number(_) => Err(Error::invalid_argument(
                format!("cannot build a collection from {value}"),
            )),
        }
    }
}

impl TryFrom<Value> for Source {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::try_from(&value)
    }
}

fn element_ref(value: &Value) -> Option<NodeId> {
    value
        .get("elementId")
        .and_then(Value::as_str)
        .map(NodeId::new)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_string_is_selector() {
        let source = Source::try_from(&json!("div.card")).unwrap();
        assert!(matches!(source, Source::Selector(s) if s == "div.card"));
    }

    #[test]
    fn test_element_and_root_refs() {
        let source = Source::try_from(&json!({"elementId": "n1"})).unwrap();
        assert!(matches!(source, Source::Element(id) if id.as_str() == "n1"));

        let source = Source::try_from(&json!({"root": "document"})).unwrap();
        assert!(matches!(source, Source::Root(Root::Document)));
    }

    #[test]
    fn test_array_keeps_order() {
        let source = Source::try_from(&json!([{"elementId": "b"}, {"elementId": "a"}])).unwrap();
        let Source::List(ids) = source else {
            panic!("expected list");
        };
        assert_eq!(ids, vec![NodeId::new("b"), NodeId::new("a")]);
    }

    #[test]
    fn test_unsupported_values_fail() {
        for value in [
            json!(42),
            json!(1.5),
            json!(true),
            json!(null),
            json!({"foo": 1}),
            json!({"root": "frame"}),
            json!([{"elementId": "a"}, 3]),
        ] {
            let err = Source::try_from(&value).unwrap_err();
            assert!(
                matches!(err, Error::InvalidArgument { .. }),
                "expected InvalidArgument for {value}"
            );
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Source::from("p").kind(), "selector");
        assert_eq!(Source::from(Root::Window).kind(), "root");
        assert_eq!(Source::Lazy("p".into()).kind(), "lazy");
    }
}
