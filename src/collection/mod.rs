//! Chainable element collections.
//!
//! A [`Collection`] is an ordered list of host targets plus an optional
//! selector. Collections built from a selector can be re-resolved with
//! [`Collection::load`] or waited on with [`Collection::on_ready`].
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | [`Collection`] struct, accessors, indexing, `map`, `for_each` |
//! | `source` | [`Source`] construction inputs |
//! | `field` | [`Field`] table and [`Access`] kinds |
//! | `traversal` | `parent`, `find`, `children` |
//! | `mutation` | `remove`, `set_children`, `load`, `fetch`, `create` |
//! | `events` | `bind`, `unbind`, `trigger` and element actions |
//! | `fields` | Field reads and writes, class lists |
//! | `ready` | Readiness waiting and [`ReadyHandle`] |
//!
//! # Example
//!
//! ```ignore
//! use domq::{Dom, Field, host::MemoryDocument};
//!
//! let dom = Dom::new(MemoryDocument::new());
//! let items = dom.select("ul > li").await?;
//!
//! items.set_field(Field::Title, "entry").await?;
//! let titles = items.get_field(Field::Title).await?;
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod core;
mod events;
mod field;
mod fields;
mod mutation;
mod ready;
mod source;
mod traversal;

// ============================================================================
// Re-exports
// ============================================================================

pub use core::Collection;
pub use events::{EventNames, Handler, HandlerFn, Trigger};
pub use field::{Access, Field};
pub use mutation::Child;
pub use ready::{ReadyHandle, ReadyStatus};
pub use source::Source;
