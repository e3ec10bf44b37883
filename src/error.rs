//! Error types for domq.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use domq::{Result, Error};
//!
//! async fn example(dom: &Dom) -> Result<()> {
//!     let buttons = dom.select("button.primary").await?;
//!     buttons.get(Some(0))?.click().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::Runtime`] |
//! | Argument | [`Error::InvalidArgument`], [`Error::UnknownField`], [`Error::InvalidSelector`] |
//! | Collection | [`Error::IndexOutOfBounds`], [`Error::EmptyCollection`], [`Error::NoSelector`] |
//! | Element | [`Error::NodeNotFound`], [`Error::NotAnElement`], [`Error::Hierarchy`] |
//! | External | [`Error::Host`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::NodeId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when [`crate::DomBuilder`] validation fails.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// No async runtime available for a background task.
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the runtime error.
        message: String,
    },

    // ========================================================================
    // Argument Errors
    // ========================================================================
    /// Invalid argument.
    ///
    /// Returned when a collection is constructed from an unsupported value.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Semantic field name is not in the field table.
    #[error("Unknown field: {name}")]
    UnknownField {
        /// The unrecognized name.
        name: String,
    },

    /// Selector rejected by the host query engine.
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector {
        /// The rejected selector.
        selector: String,
        /// Why it was rejected.
        message: String,
    },

    // ========================================================================
    // Collection Errors
    // ========================================================================
    /// Index past the end of a collection.
    #[error("Index {index} out of bounds for collection of length {len}")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Collection length at the time of the call.
        len: usize,
    },

    /// Element-only operation on an empty collection.
    #[error("Cannot {operation} on an empty collection")]
    EmptyCollection {
        /// The attempted operation.
        operation: String,
    },

    /// Operation needs a stored selector but the collection has none.
    #[error("Cannot {operation}: collection has no selector")]
    NoSelector {
        /// The attempted operation.
        operation: String,
    },

    // ========================================================================
    // Element Errors
    // ========================================================================
    /// Node id unknown to the host.
    ///
    /// Returned when a node reference is stale or was never issued.
    #[error("Node not found: {node_id}")]
    NodeNotFound {
        /// The missing node's ID.
        node_id: NodeId,
    },

    /// Element-only operation on the window, the document or a text node.
    #[error("Cannot {operation}: target is not an element")]
    NotAnElement {
        /// The attempted operation.
        operation: String,
    },

    /// Tree mutation would create a cycle.
    #[error("Hierarchy error: {message}")]
    Hierarchy {
        /// Description of the violation.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// Failure reported by a host implementation.
    #[error("Host error: {message}")]
    Host {
        /// Message from the host.
        message: String,
    },
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a runtime error.
    #[inline]
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an unknown field error.
    #[inline]
    pub fn unknown_field(name: impl Into<String>) -> Self {
        Self::UnknownField { name: name.into() }
    }

    /// Creates an invalid selector error.
    #[inline]
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Creates an index out of bounds error.
    #[inline]
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }

    /// Creates an empty collection error.
    #[inline]
    pub fn empty_collection(operation: impl Into<String>) -> Self {
        Self::EmptyCollection {
            operation: operation.into(),
        }
    }

    /// Creates a missing selector error.
    #[inline]
    pub fn no_selector(operation: impl Into<String>) -> Self {
        Self::NoSelector {
            operation: operation.into(),
        }
    }

    /// Creates a node not found error.
    #[inline]
    pub fn node_not_found(node_id: NodeId) -> Self {
        Self::NodeNotFound { node_id }
    }

    /// Creates a not-an-element error.
    #[inline]
    pub fn not_an_element(operation: impl Into<String>) -> Self {
        Self::NotAnElement {
            operation: operation.into(),
        }
    }

    /// Creates a hierarchy error.
    #[inline]
    pub fn hierarchy(message: impl Into<String>) -> Self {
        Self::Hierarchy {
            message: message.into(),
        }
    }

    /// Creates a host error.
    #[inline]
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error concerns a specific element or root target.
    #[inline]
    #[must_use]
    pub fn is_element_error(&self) -> bool {
        matches!(
            self,
            Self::NodeNotFound { .. } | Self::NotAnElement { .. } | Self::Hierarchy { .. }
        )
    }

    /// Returns `true` if the caller passed something the crate cannot use.
    #[inline]
    #[must_use]
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. }
                | Self::UnknownField { .. }
                | Self::InvalidSelector { .. }
                | Self::IndexOutOfBounds { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
