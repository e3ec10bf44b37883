//! Collection factory and configuration.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | [`Dom`] factory |
//! | `builder` | [`DomBuilder`] with validation |
//! | `options` | [`Options`] for polling behaviour |
//!
//! # Example
//!
//! ```ignore
//! use domq::{Dom, host::MemoryDocument};
//!
//! let dom = Dom::new(MemoryDocument::new());
//! let body = dom.select("body").await?;
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod builder;
mod core;
mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::DomBuilder;
pub use core::Dom;
pub use options::{DEFAULT_POLL_INTERVAL, Options};
