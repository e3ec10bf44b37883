//! domq - Chainable element collections over an async DOM host.
//!
//! This library wraps DOM nodes in jQuery-style [`Collection`]s: select,
//! traverse, mutate, read and write fields, bind events, and wait for the
//! document to become ready.
//!
//! # Architecture
//!
//! Collections never touch a DOM directly:
//!
//! - **Host**: the [`Host`](host::Host) trait is the only door to the DOM. A
//!   browser bridge or the bundled [`MemoryDocument`](host::MemoryDocument)
//!   implements it.
//! - **Collection**: an ordered list of targets plus an optional selector
//!   that can be re-resolved later.
//! - **Factory**: [`Dom`] turns selectors, handles and lists into collections.
//!
//! Key design principles:
//!
//! - Clones of a collection share state; traversal returns new collections
//! - Readiness waiters fire at most once and can be cancelled
//! - Property and attribute access goes through the explicit [`Field`] table
//!
//! # Quick Start
//!
//! ```no_run
//! use domq::host::MemoryDocument;
//! use domq::{Dom, Field, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let doc = MemoryDocument::loading();
//!     let list = doc.insert(None, "ul", &[("id", "menu")])?;
//!     doc.insert(Some(&list), "li", &[("class", "item")])?;
//!
//!     let dom = Dom::builder().host(doc).build()?;
//!
//!     let items = dom.select("#menu > li").await?;
//!     items.set_field(Field::Title, "entry").await?;
//!
//!     dom.document()
//!         .on_ready(|_| println!("DOM ready"))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`collection`] | [`Collection`] and its operations |
//! | [`dom`] | [`Dom`] factory and configuration |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`host`] | Host contract and the in-memory host |
//! | [`identifiers`] | Type-safe ID wrappers |

// ============================================================================
// Modules
// ============================================================================

/// Chainable element collections.
///
/// - [`Collection`] - Targets plus optional selector
/// - [`Source`] - What a collection is built from
/// - [`Field`] - Property/attribute table
pub mod collection;

/// Collection factory and configuration.
///
/// Use [`Dom::builder()`] to create a configured factory.
pub mod dom;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Host DOM contract and the in-memory host.
pub mod host;

/// Type-safe identifiers.
///
/// Newtype wrappers keep node and handler IDs apart at compile time.
pub mod identifiers;

// ============================================================================
// Re-exports
// ============================================================================

// Collection types
pub use collection::{
    Access, Child, Collection, EventNames, Field, Handler, HandlerFn, ReadyHandle, ReadyStatus,
    Source, Trigger,
};

// Factory types
pub use dom::{DEFAULT_POLL_INTERVAL, Dom, DomBuilder, Options};

// Error types
pub use error::{Error, Result};

// Host types
pub use host::{Event, Host, MemoryDocument, ReadyState, Root, Target};

// Identifier types
pub use identifiers::{HandlerId, NodeId};
