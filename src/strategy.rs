//! Read failure strategies and where a store's data came from.
//!
//! A list fetch that fails leaves the store with a choice: keep what it had,
//! or substitute the fallback dataset so a listing page never renders empty.
//!
//! ```
//! use dynasty_admin::strategy::ReadStrategy;
//!
//! // Serve seed/local data when the backend fails (default)
//! let _s = ReadStrategy::Fallback;
//!
//! // Keep the previous items and only record the error
//! let _s = ReadStrategy::Strict;
//! ```
//!
//! | Strategy | Success | Failure |
//! |----------|---------|---------|
//! | **Fallback** | Items replaced | Error recorded, fallback items served |
//! | **Strict** | Items replaced | Error recorded, previous items kept |
//!
//! Writes never fall back: their errors always reach the caller.

use std::fmt;

/// What a store does when a read fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReadStrategy {
    /// Record the error and keep the previous items.
    Strict,

    /// Record the error, log it, and serve the fallback dataset.
    #[default]
    Fallback,
}

impl fmt::Display for ReadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadStrategy::Strict => write!(f, "Strict"),
            ReadStrategy::Fallback => write!(f, "Fallback"),
        }
    }
}

/// Origin of the items currently held by a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DataOrigin {
    /// Nothing loaded yet.
    #[default]
    Empty,
    /// Served by the configured data source.
    Remote,
    /// Substituted after a failed read.
    Fallback,
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataOrigin::Empty => write!(f, "Empty"),
            DataOrigin::Remote => write!(f, "Remote"),
            DataOrigin::Fallback => write!(f, "Fallback"),
        }
    }
}
