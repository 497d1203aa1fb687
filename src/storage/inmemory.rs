//! In-memory local storage (default when no storage directory is configured).
//!
//! Uses DashMap for concurrent access with per-key sharding.

use super::LocalStore;
use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe in-memory key/value store.
///
/// Cloning shares the underlying map.
///
/// # Example
///
/// ```
/// use dynasty_admin::storage::{InMemoryStore, LocalStore};
///
/// let store = InMemoryStore::new();
/// store.set("customers", "[]".to_string()).unwrap();
/// assert_eq!(store.get("customers").unwrap().as_deref(), Some("[]"));
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<DashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size statistics.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            total_keys: self.entries.len(),
            total_bytes: self.entries.iter().map(|e| e.value().len()).sum(),
        }
    }
}

impl LocalStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.entries.get(key).map(|e| e.value().clone());
        debug!(
            "InMemory GET {} -> {}",
            key,
            if value.is_some() { "HIT" } else { "MISS" }
        );
        Ok(value)
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        debug!("InMemory SET {} ({} bytes)", key, value.len());
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        debug!("InMemory REMOVE {}", key);
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.entries.contains_key(key))
    }

    fn clear(&self) -> Result<()> {
        self.entries.clear();
        warn!("InMemory CLEAR executed - all local data removed");
        Ok(())
    }
}

/// Storage statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreStats {
    pub total_keys: usize,
    pub total_bytes: usize,
}
