//! Data source traits and the local implementation.
//!
//! [`ResourceService`] is the seam between stores and wherever records live.
//! The REST services in [`crate::services`] implement it against the backend;
//! [`LocalRepository`] implements it over local storage and is the complete
//! data source when the backend is disabled. [`Source`] picks one at runtime.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use dynasty_admin::repository::{LocalRepository, ResourceService};
//! use dynasty_admin::storage::InMemoryStore;
//! use dynasty_admin::{Filters, model::Branch};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let repo = LocalRepository::<Branch>::new(Arc::new(InMemoryStore::new()), Vec::new());
//! let page = repo.list(&Filters::new()).await.unwrap();
//! assert!(page.items.is_empty());
//! # }
//! ```

use crate::entity::{Resource, Toggleable};
use crate::envelope::ListPage;
use crate::error::{Error, Result};
use crate::filter::Filters;
use crate::model::Status;
use crate::storage::{LocalStore, Persisted};
use serde_json::Value;
use std::sync::Arc;

/// CRUD access to one resource.
///
/// `create` and `update` return the stored record when the source reports
/// it; backends that answer with a bare acknowledgement yield `None`.
#[allow(async_fn_in_trait)]
pub trait ResourceService<T: Resource>: Send + Sync {
    /// One page of records matching `filters`.
    ///
    /// # Errors
    /// Returns `Err` if the source is unavailable or the response is invalid.
    async fn list(&self, filters: &Filters) -> Result<ListPage<T>>;

    /// # Errors
    /// Returns `Err` if the record does not exist or the source fails.
    async fn get(&self, key: &T::Key) -> Result<T>;

    /// # Errors
    /// Returns `Err` if the draft is rejected or the source fails.
    async fn create(&self, draft: &T::Draft) -> Result<Option<T>>;

    /// # Errors
    /// Returns `Err` if the record does not exist, the draft is rejected, or
    /// the source fails.
    async fn update(&self, key: &T::Key, draft: &T::Draft) -> Result<Option<T>>;

    /// # Errors
    /// Returns `Err` if the record does not exist or the source fails.
    async fn delete(&self, key: &T::Key) -> Result<()>;
}

/// Sources that can flip a record's two-state status.
#[allow(async_fn_in_trait)]
pub trait ToggleService<T: Toggleable>: ResourceService<T> {
    /// # Errors
    /// Returns `Err` if the record does not exist or the source fails.
    async fn set_status(&self, key: &T::Key, status: Status) -> Result<()>;
}

// ============================================================================
// Local repository
// ============================================================================

/// Filter keys that control paging and never match record fields.
const PAGING_KEYS: [&str; 4] = ["page", "limit", "sort", "order"];

/// Record fields searched by the `search` filter.
const SEARCH_FIELDS: [&str; 7] = [
    "name",
    "dishName",
    "title",
    "code",
    "email",
    "phone",
    "customerName",
];

/// Resource collection kept in local storage under `T::storage_key()`.
///
/// Seeded lazily with the given records the first time the key is read.
pub struct LocalRepository<T: Resource> {
    items: Persisted<Vec<T>>,
}

impl<T: Resource> Clone for LocalRepository<T> {
    fn clone(&self) -> Self {
        LocalRepository {
            items: self.items.clone(),
        }
    }
}

impl<T: Resource> LocalRepository<T> {
    pub fn new(store: Arc<dyn LocalStore>, seed: Vec<T>) -> Self {
        LocalRepository {
            items: Persisted::new(store, T::storage_key(), move || seed.clone()),
        }
    }

    /// Every stored record, unfiltered.
    pub fn all(&self) -> Vec<T> {
        self.items.get()
    }

    pub fn len(&self) -> usize {
        self.items.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget local changes; the next read starts from the seed again.
    pub fn reset(&self) {
        self.items.reset();
    }

    /// Insert a fully-formed record, assigning an id if it has none.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the record is invalid.
    pub fn insert(&self, mut record: T) -> Result<T> {
        let mut existing = self.items.get();
        record.assign_key(&existing);
        record.validate()?;
        existing.push(record.clone());
        self.items.set(existing);
        debug!("Stored {} {} locally", T::resource_name(), record.key());
        Ok(record)
    }

    /// Apply `f` to the record with `key`.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if no record has `key`.
    pub fn modify<F>(&self, key: &T::Key, f: F) -> Result<T>
    where
        F: FnOnce(&mut T),
    {
        let mut items = self.items.get();
        let record = items
            .iter_mut()
            .find(|r| r.key() == *key)
            .ok_or_else(|| not_found::<T>(key))?;
        f(record);
        let updated = record.clone();
        self.items.set(items);
        Ok(updated)
    }

    fn matching(&self, filters: &Filters) -> ListPage<T> {
        let cleaned = filters.cleaned();
        let mut matched: Vec<T> = self
            .items
            .get()
            .into_iter()
            .filter(|record| matches_filters(record, &cleaned))
            .collect();
        let total = matched.len() as u64;

        if let Some(limit) = cleaned.get("limit").and_then(as_count).filter(|l| *l > 0) {
            let page = cleaned.get("page").and_then(as_count).unwrap_or(1).max(1);
            matched = matched
                .into_iter()
                .skip(page.saturating_sub(1).saturating_mul(limit))
                .take(limit)
                .collect();
        }

        ListPage {
            items: matched,
            total,
        }
    }
}

impl<T: Resource> ResourceService<T> for LocalRepository<T> {
    async fn list(&self, filters: &Filters) -> Result<ListPage<T>> {
        Ok(self.matching(filters))
    }

    async fn get(&self, key: &T::Key) -> Result<T> {
        self.items
            .get()
            .into_iter()
            .find(|r| r.key() == *key)
            .ok_or_else(|| not_found::<T>(key))
    }

    async fn create(&self, draft: &T::Draft) -> Result<Option<T>> {
        let record = T::from_draft(draft.clone(), None);
        self.insert(record).map(Some)
    }

    async fn update(&self, key: &T::Key, draft: &T::Draft) -> Result<Option<T>> {
        let replacement = T::from_draft(draft.clone(), Some(key.clone()));
        replacement.validate()?;
        self.modify(key, |record| *record = replacement).map(Some)
    }

    async fn delete(&self, key: &T::Key) -> Result<()> {
        let mut items = self.items.get();
        let before = items.len();
        items.retain(|r| r.key() != *key);
        if items.len() == before {
            return Err(not_found::<T>(key));
        }
        self.items.set(items);
        Ok(())
    }
}

impl<T: Toggleable> ToggleService<T> for LocalRepository<T> {
    async fn set_status(&self, key: &T::Key, status: Status) -> Result<()> {
        self.modify(key, |record| record.set_status(status))?;
        Ok(())
    }
}

fn not_found<T: Resource>(key: &T::Key) -> Error {
    Error::NotFound(format!("{} {}", T::resource_name(), key))
}

fn as_count(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Whether `record` satisfies every cleaned filter.
///
/// `search` matches a case-insensitive substring of the name-like fields.
/// Other keys compare against the record field of the same name: strings
/// case-insensitively, other values exactly. Keys the record does not have
/// are ignored.
fn matches_filters<T: Resource>(record: &T, filters: &Filters) -> bool {
    if filters.is_empty() {
        return true;
    }
    let Ok(Value::Object(fields)) = serde_json::to_value(record) else {
        return true;
    };

    filters.iter().all(|(key, wanted)| {
        if PAGING_KEYS.contains(&key.as_str()) {
            return true;
        }
        if key == "search" {
            let needle = match wanted {
                Value::String(s) => s.to_lowercase(),
                other => other.to_string(),
            };
            return SEARCH_FIELDS.iter().any(|f| {
                fields
                    .get(*f)
                    .and_then(Value::as_str)
                    .is_some_and(|v| v.to_lowercase().contains(&needle))
            });
        }
        match fields.get(key) {
            Some(actual) => values_match(actual, wanted),
            None => true,
        }
    })
}

fn values_match(actual: &Value, wanted: &Value) -> bool {
    match (actual, wanted) {
        (Value::String(a), Value::String(w)) => a.eq_ignore_ascii_case(w),
        (Value::Bool(a), Value::String(w)) => w.parse::<bool>().is_ok_and(|w| w == *a),
        (Value::Number(a), Value::String(w)) => w.parse::<f64>().ok() == a.as_f64(),
        (a, Value::Array(options)) => options.iter().any(|o| values_match(a, o)),
        (a, w) => a == w,
    }
}

// ============================================================================
// Source selection
// ============================================================================

/// Either the backend or the local repository, chosen once at startup.
pub enum Source<R, L> {
    Remote(R),
    Local(L),
}

impl<R, L> Source<R, L> {
    pub fn is_remote(&self) -> bool {
        matches!(self, Source::Remote(_))
    }
}

impl<T, R, L> ResourceService<T> for Source<R, L>
where
    T: Resource,
    R: ResourceService<T>,
    L: ResourceService<T>,
{
    async fn list(&self, filters: &Filters) -> Result<ListPage<T>> {
        match self {
            Source::Remote(r) => r.list(filters).await,
            Source::Local(l) => l.list(filters).await,
        }
    }

    async fn get(&self, key: &T::Key) -> Result<T> {
        match self {
            Source::Remote(r) => r.get(key).await,
            Source::Local(l) => l.get(key).await,
        }
    }

    async fn create(&self, draft: &T::Draft) -> Result<Option<T>> {
        match self {
            Source::Remote(r) => r.create(draft).await,
            Source::Local(l) => l.create(draft).await,
        }
    }

    async fn update(&self, key: &T::Key, draft: &T::Draft) -> Result<Option<T>> {
        match self {
            Source::Remote(r) => r.update(key, draft).await,
            Source::Local(l) => l.update(key, draft).await,
        }
    }

    async fn delete(&self, key: &T::Key) -> Result<()> {
        match self {
            Source::Remote(r) => r.delete(key).await,
            Source::Local(l) => l.delete(key).await,
        }
    }
}

impl<T, R, L> ToggleService<T> for Source<R, L>
where
    T: Toggleable,
    R: ToggleService<T>,
    L: ToggleService<T>,
{
    async fn set_status(&self, key: &T::Key, status: Status) -> Result<()> {
        match self {
            Source::Remote(r) => r.set_status(key, status).await,
            Source::Local(l) => l.set_status(key, status).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Customer, Order};
    use crate::storage::InMemoryStore;
    use serde_json::json;

    fn customers() -> Vec<Customer> {
        vec![
            serde_json::from_value(json!({
                "id": "c1", "name": "Asha Verma", "email": "asha@example.com",
                "status": "active", "membership": "Gold"
            }))
            .unwrap(),
            serde_json::from_value(json!({
                "id": "c2", "name": "Kiran Rao", "email": "kiran@example.com",
                "status": "inactive", "membership": "Silver"
            }))
            .unwrap(),
            serde_json::from_value(json!({
                "id": "c3", "name": "Ashok Iyer", "email": "ashok@example.com",
                "status": "Active", "membership": "gold"
            }))
            .unwrap(),
        ]
    }

    fn repo() -> LocalRepository<Customer> {
        LocalRepository::new(Arc::new(InMemoryStore::new()), customers())
    }

    #[tokio::test]
    async fn test_list_filters_case_insensitively() {
        let repo = repo();
        let page = repo
            .list(&Filters::new().with("membership", "GOLD").with("status", "all"))
            .await
            .unwrap();
        let ids: Vec<_> = page.items.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c3"]);
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_search_and_paging() {
        let repo = repo();
        let page = repo
            .list(&Filters::new().with("search", "ash").with("limit", 1).with("page", 2))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "c3");
    }

    #[tokio::test]
    async fn test_oversized_page_is_empty() {
        let repo = repo();
        let page = repo
            .list(
                &Filters::new()
                    .with("page", "18446744073709551615")
                    .with("limit", 2),
            )
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);

        let page = repo
            .list(&Filters::new().with("page", u64::MAX).with("limit", u64::MAX))
            .await
            .unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_persists() {
        let store = Arc::new(InMemoryStore::new());
        let repo = LocalRepository::<Customer>::new(store.clone(), customers());
        let mut draft = customers().remove(0);
        draft.id = String::new();
        draft.name = "Meera Shah".to_string();

        let created = repo.create(&draft).await.unwrap().unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(repo.len(), 4);

        // A second repository over the same store sees the write.
        let reopened = LocalRepository::<Customer>::new(store, Vec::new());
        assert_eq!(reopened.get(&created.id).await.unwrap().name, "Meera Shah");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid() {
        let repo = repo();
        let mut draft = customers().remove(0);
        draft.name = " ".to_string();
        assert!(matches!(repo.create(&draft).await, Err(Error::Validation(_))));
        assert_eq!(repo.len(), 3);
    }

    #[tokio::test]
    async fn test_update_delete_and_missing_keys() {
        let repo = repo();
        let mut draft = repo.get(&"c2".to_string()).await.unwrap();
        draft.phone = "98450 00000".to_string();
        repo.update(&"c2".to_string(), &draft).await.unwrap();
        assert_eq!(repo.get(&"c2".to_string()).await.unwrap().phone, "98450 00000");

        repo.delete(&"c2".to_string()).await.unwrap();
        assert!(matches!(
            repo.get(&"c2".to_string()).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            repo.delete(&"c2".to_string()).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_set_status() {
        let repo = repo();
        repo.set_status(&"c1".to_string(), Status::Inactive).await.unwrap();
        assert_eq!(repo.get(&"c1".to_string()).await.unwrap().status, Status::Inactive);
    }

    #[tokio::test]
    async fn test_orders_get_sequential_ids() {
        let repo = LocalRepository::<Order>::new(Arc::new(InMemoryStore::new()), Vec::new());
        let draft: Order = serde_json::from_value(json!({
            "customerId": "c1",
            "items": [{"productId": "p1", "quantity": 2, "price": 34}]
        }))
        .unwrap();

        let first = repo.create(&draft).await.unwrap().unwrap();
        let second = repo.create(&draft).await.unwrap().unwrap();
        assert_eq!(first.id, "ORD-1234");
        assert_eq!(second.id, "ORD-1235");
        assert_eq!(first.total, 68.0);
    }

    #[tokio::test]
    async fn test_source_delegates() {
        let source: Source<LocalRepository<Customer>, LocalRepository<Customer>> =
            Source::Local(repo());
        assert!(!source.is_remote());
        assert_eq!(source.list(&Filters::new()).await.unwrap().total, 3);
    }
}
