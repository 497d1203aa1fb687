//! Hooks for monitoring store activity.
//!
//! Implement [`SyncMetrics`] to forward store events to a metrics backend:
//!
//! ```
//! use dynasty_admin::observability::SyncMetrics;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::time::Duration;
//!
//! #[derive(Default)]
//! struct FallbackCounter(AtomicU64);
//!
//! impl SyncMetrics for FallbackCounter {
//!     fn record_fallback(&self, _resource: &str, _error: &str) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//! ```
//!
//! Methods not overridden log through the `log` crate. [`NoOpMetrics`]
//! discards everything.

use std::time::Duration;

/// Store lifecycle events.
pub trait SyncMetrics: Send + Sync {
    /// A list fetch completed.
    fn record_fetch(&self, resource: &str, items: usize, duration: Duration) {
        debug!("FETCH {}: {} items in {:?}", resource, items, duration);
    }

    /// A failed read was answered with fallback data.
    fn record_fallback(&self, resource: &str, error: &str) {
        warn!("FALLBACK {}: {}", resource, error);
    }

    /// A response arrived after a newer fetch was issued and was dropped.
    fn record_stale(&self, resource: &str, generation: u64) {
        debug!("STALE {}: dropped response of fetch #{}", resource, generation);
    }

    /// A create, update, delete or status change completed.
    fn record_write(&self, resource: &str, operation: &str, duration: Duration) {
        debug!("WRITE {} {} took {:?}", operation, resource, duration);
    }

    /// An optimistic change was reverted.
    fn record_rollback(&self, resource: &str, key: &str, error: &str) {
        warn!("ROLLBACK {} {}: {}", resource, key, error);
    }

    /// Any operation failed.
    fn record_error(&self, resource: &str, error: &str) {
        warn!("ERROR {}: {}", resource, error);
    }
}

/// Metrics sink that records nothing.
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl SyncMetrics for NoOpMetrics {
    fn record_fetch(&self, _resource: &str, _items: usize, _duration: Duration) {}
    fn record_fallback(&self, _resource: &str, _error: &str) {}
    fn record_stale(&self, _resource: &str, _generation: u64) {}
    fn record_write(&self, _resource: &str, _operation: &str, _duration: Duration) {}
    fn record_rollback(&self, _resource: &str, _key: &str, _error: &str) {}
    fn record_error(&self, _resource: &str, _error: &str) {}
}

/// Metrics that only log. Used when none are configured.
#[derive(Clone, Default)]
pub struct LogMetrics;

impl SyncMetrics for LogMetrics {}
