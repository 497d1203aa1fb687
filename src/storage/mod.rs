//! Local persistent storage used as the fallback data source.
//!
//! The dashboard keeps one JSON document per key (a list of records, an object
//! of settings, the auth token). Backends are synchronous key/value stores of
//! JSON text; [`Persisted`] layers typed, lazily-initialized access on top.

use crate::error::Result;

#[cfg(feature = "file-store")]
pub mod file;
pub mod inmemory;
pub mod persisted;

#[cfg(feature = "file-store")]
pub use file::FileStore;
pub use inmemory::InMemoryStore;
pub use persisted::Persisted;

/// Fixed storage keys, one per resource plus the auth pair.
pub mod keys {
    pub const PRODUCTS: &str = "products";
    pub const ORDERS: &str = "orders";
    pub const CUSTOMERS: &str = "customers";
    pub const BRANCHES: &str = "branches";
    pub const CATEGORIES: &str = "categories";
    pub const DELIVERY_STAFF: &str = "deliveryStaff";
    pub const USERS: &str = "users";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const WALLET: &str = "wallet";
    pub const MEMBERSHIP: &str = "membership";
    pub const HOMEPAGE_SETTINGS: &str = "homepageSettings";
    pub const HOMEPAGE_BANNERS: &str = "homepageBanners";
    pub const PUSH_NOTIFICATIONS: &str = "pushNotifications";

    pub const AUTH_TOKEN: &str = "authToken";
    pub const AUTH_USER: &str = "authUser";
}

/// Trait for local storage backends.
///
/// All methods take `&self`; implementations use interior mutability so a
/// single store can be shared as `Arc<dyn LocalStore>` by every resource.
/// There is no cross-process locking: two processes writing the same key
/// race, last write wins.
pub trait LocalStore: Send + Sync {
    /// Read the raw JSON text stored under `key`.
    ///
    /// # Errors
    /// Returns `Err` if the backend is unavailable.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    /// Returns `Err` if the backend is unavailable or out of space.
    fn set(&self, key: &str, value: String) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    /// Returns `Err` if the backend is unavailable.
    fn remove(&self, key: &str) -> Result<()>;

    /// Check if key is present.
    ///
    /// # Errors
    /// Returns `Err` if the backend is unavailable.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Remove every key.
    ///
    /// # Errors
    /// Returns `Err` if the backend is unavailable.
    fn clear(&self) -> Result<()>;
}
