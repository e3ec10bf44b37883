//! Builder pattern for [`Dom`] configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use domq::{Dom, host::MemoryDocument};
//!
//! let dom = Dom::builder()
//!     .host(MemoryDocument::new())
//!     .poll_interval(Duration::from_millis(10))
//!     .build()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::host::Host;

use super::core::Dom;
use super::options::Options;

// ============================================================================
// DomBuilder
// ============================================================================

/// Builder for configuring a [`Dom`] instance.
///
/// Use [`Dom::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct DomBuilder {
    /// Host the collections operate on.
    host: Option<Arc<dyn Host>>,
    /// Collection options.
    options: Options,
}

impl fmt::Debug for DomBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomBuilder")
            .field("has_host", &self.host.is_some())
            .field("options", &self.options)
            .finish()
    }
}

// ============================================================================
// DomBuilder Implementation
// ============================================================================

impl DomBuilder {
    /// Creates a new builder with no host and default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host.
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl Host) -> Self {
        self.host = Some(Arc::new(host));
        self
    }

    /// Sets an already shared host.
    #[inline]
    #[must_use]
    pub fn shared_host(mut self, host: Arc<dyn Host>) -> Self {
        self.host = Some(host);
        self
    }

    /// Replaces all options at once.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Sets the readiness poll interval.
    #[inline]
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.options.poll_interval = interval;
        self
    }

    /// Sets the readiness poll timeout.
    #[inline]
    #[must_use]
    pub fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.options.ready_timeout = Some(timeout);
        self
    }

    /// Builds the [`Dom`] with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no host was set
    /// - [`Error::Config`] if the poll interval or timeout is zero
    pub fn build(self) -> Result<Dom> {
        let host = self.host.clone().ok_or_else(|| {
            Error::config(
                "A host is required. Use .host() to set it.\n\
                 Example: Dom::builder().host(MemoryDocument::new())",
            )
        })?;
        self.validate_options()?;

        Ok(Dom::with_options(host, self.options))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl DomBuilder {
    fn validate_options(&self) -> Result<()> {
        if self.options.poll_interval.is_zero() {
            return Err(Error::config("poll interval must be greater than zero"));
        }
        if self.options.ready_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::config("ready timeout must be greater than zero"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
