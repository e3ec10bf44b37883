//! Collection behaviour options.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use domq::Options;
//!
//! let options = Options::new()
//!     .with_poll_interval(Duration::from_millis(20))
//!     .with_ready_timeout(Duration::from_secs(5));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Default interval between readiness polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// Options
// ============================================================================

/// Options shared by every collection a [`Dom`](super::Dom) creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Interval between readiness polls for unresolved selectors.
    pub poll_interval: Duration,

    /// Give up polling after this long. `None` polls until cancelled.
    pub ready_timeout: Option<Duration>,
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl Options {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            ready_timeout: None,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl Options {
    /// Sets the readiness poll interval.
    #[inline]
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets a timeout after which readiness polling stops.
    #[inline]
    #[must_use]
    pub const fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = Some(timeout);
        self
    }

    /// Polls until explicitly cancelled.
    #[inline]
    #[must_use]
    pub const fn without_ready_timeout(mut self) -> Self {
        self.ready_timeout = None;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.poll_interval, DEFAULT_POLL_INTERVAL);
        assert!(options.ready_timeout.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let options = Options::new()
            .with_poll_interval(Duration::from_millis(5))
            .with_ready_timeout(Duration::from_secs(1));
        assert_eq!(options.poll_interval, Duration::from_millis(5));
        assert_eq!(options.ready_timeout, Some(Duration::from_secs(1)));
        assert!(options.without_ready_timeout().ready_timeout.is_none());
    }
}
