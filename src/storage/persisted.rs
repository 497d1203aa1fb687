//! Typed, lazily-initialized view over one storage key.

use super::LocalStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, RwLock};

/// A value mirrored to local storage.
///
/// The first read loads the stored JSON, falling back to the default when the
/// key is absent or unreadable. Every write updates the in-memory copy and is
/// mirrored to storage; storage failures are logged and ignored, so the
/// in-memory value stays authoritative for this process.
///
/// Cloning shares the cached value.
pub struct Persisted<T> {
    store: Arc<dyn LocalStore>,
    key: String,
    default: Arc<dyn Fn() -> T + Send + Sync>,
    cached: Arc<RwLock<Option<T>>>,
}

impl<T> Clone for Persisted<T> {
    fn clone(&self) -> Self {
        Persisted {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
            default: Arc::clone(&self.default),
            cached: Arc::clone(&self.cached),
        }
    }
}

impl<T> Persisted<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new<F>(store: Arc<dyn LocalStore>, key: impl Into<String>, default: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Persisted {
            store,
            key: key.into(),
            default: Arc::new(default),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current value, loading from storage on first access.
    pub fn get(&self) -> T {
        if let Some(value) = self.read_cache() {
            return value;
        }

        let loaded = self.load();
        let mut guard = self.cached.write().unwrap_or_else(|e| e.into_inner());
        guard.get_or_insert(loaded).clone()
    }

    /// Replace the value and mirror it to storage.
    pub fn set(&self, value: T) {
        self.mirror(&value);
        let mut guard = self.cached.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(value);
    }

    /// Apply `f` to the current value, store the result and return it.
    pub fn update<F>(&self, f: F) -> T
    where
        F: FnOnce(&mut T),
    {
        let mut value = self.get();
        f(&mut value);
        self.set(value.clone());
        value
    }

    /// Drop the stored value; the next read starts from the default again.
    pub fn reset(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            warn!("Failed to remove local key {}: {}", self.key, e);
        }
        let mut guard = self.cached.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    fn read_cache(&self) -> Option<T> {
        self.cached
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn load(&self) -> T {
        match self.store.get(&self.key) {
            Ok(Some(text)) => match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Discarding unreadable local value for {}: {}", self.key, e);
                    (self.default)()
                }
            },
            Ok(None) => (self.default)(),
            Err(e) => {
                warn!("Local storage read failed for {}: {}", self.key, e);
                (self.default)()
            }
        }
    }

    fn mirror(&self, value: &T) {
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to serialize local value for {}: {}", self.key, e);
                return;
            }
        };
        if let Err(e) = self.store.set(&self.key, text) {
            warn!("Local storage write failed for {}: {}", self.key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::storage::InMemoryStore;

    struct FailingStore;

    impl LocalStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Storage("unavailable".to_string()))
        }
        fn set(&self, _key: &str, _value: String) -> Result<()> {
            Err(Error::Storage("quota exceeded".to_string()))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::Storage("unavailable".to_string()))
        }
        fn clear(&self) -> Result<()> {
            Err(Error::Storage("unavailable".to_string()))
        }
    }

    #[test]
    fn test_default_until_written() {
        let store = Arc::new(InMemoryStore::new());
        let value = Persisted::new(store.clone(), "wallet", || vec![1, 2, 3]);

        assert_eq!(value.get(), vec![1, 2, 3]);
        // Lazy default is not written back.
        assert!(!store.contains("wallet").unwrap());

        value.set(vec![4]);
        assert_eq!(store.get("wallet").unwrap().as_deref(), Some("[4]"));
    }

    #[test]
    fn test_loads_existing_value() {
        let store = Arc::new(InMemoryStore::new());
        store.set("branches", "[\"main\"]".to_string()).unwrap();

        let value = Persisted::new(store, "branches", Vec::<String>::new);
        assert_eq!(value.get(), vec!["main".to_string()]);
    }

    #[test]
    fn test_corrupt_value_falls_back_to_default() {
        let store = Arc::new(InMemoryStore::new());
        store.set("users", "{not json".to_string()).unwrap();

        let value = Persisted::new(store, "users", || vec![7u32]);
        assert_eq!(value.get(), vec![7]);
    }

    #[test]
    fn test_storage_failures_are_ignored() {
        let value = Persisted::new(Arc::new(FailingStore), "orders", || 0u32);
        assert_eq!(value.get(), 0);

        value.set(5);
        assert_eq!(value.get(), 5);
        assert_eq!(value.update(|v| *v += 1), 6);
        value.reset();
        assert_eq!(value.get(), 0);
    }

    #[test]
    fn test_clones_share_value() {
        let store = Arc::new(InMemoryStore::new());
        let a = Persisted::new(store, "membership", || 1u8);
        let b = a.clone();
        a.set(9);
        assert_eq!(b.get(), 9);
    }
}
