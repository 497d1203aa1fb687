//! Per-resource client-side state.
//!
//! A [`ResourceStore`] owns what a listing page shows for one resource: the
//! items, a loading flag, the last error, the backend's total, and where the
//! items came from. It is generic over the record type and over the
//! [`ResourceService`] that feeds it, so every resource shares one
//! implementation of fetch, filter tracking, write-then-refetch and
//! optimistic status changes.
//!
//! # Read path
//!
//! ```text
//! fetch(filters)
//!   ├─ generation += 1, loading = true
//!   ├─ service.list(cleaned filters)
//!   ├─ newer fetch issued meanwhile? → drop response
//!   ├─ Ok(page)  → items/total replaced, origin = Remote
//!   └─ Err(e)    → error recorded; Fallback: fallback items, Strict: keep
//! ```
//!
//! # Write path
//!
//! `create`, `update` and `delete` call the service and then refetch the
//! whole list. Their errors are recorded and returned to the caller; writes
//! never fall back.
//!
//! # Optimistic changes
//!
//! `toggle_status` and `mutate_optimistic` write to local state before the
//! service call is awaited and follow the [`crate::optimistic`] policy:
//! rollback on failure, no resync on success. Applying one also invalidates
//! fetches still in flight so their older data cannot overwrite it.

use crate::entity::{Resource, Toggleable};
use crate::error::{Error, Result};
use crate::filter::Filters;
use crate::model::Status;
use crate::observability::{LogMetrics, SyncMetrics};
use crate::optimistic::{Lens, OptimisticMutation, Settled};
use crate::repository::{ResourceService, ToggleService};
use crate::strategy::{DataOrigin, ReadStrategy};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Snapshot of a store.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub total: u64,
    pub origin: DataOrigin,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        StoreState {
            items: Vec::new(),
            loading: false,
            error: None,
            total: 0,
            origin: DataOrigin::Empty,
        }
    }
}

struct Inner<T> {
    state: StoreState<T>,
    filters: Filters,
    fingerprint: Option<String>,
    generation: u64,
}

type Fallback<T> = Arc<dyn Fn() -> Vec<T> + Send + Sync>;

/// Client-side cache of one resource's list.
pub struct ResourceStore<T: Resource, S> {
    service: Arc<S>,
    inner: Arc<RwLock<Inner<T>>>,
    fallback: Fallback<T>,
    strategy: ReadStrategy,
    metrics: Arc<dyn SyncMetrics>,
}

impl<T: Resource, S> Clone for ResourceStore<T, S> {
    fn clone(&self) -> Self {
        ResourceStore {
            service: Arc::clone(&self.service),
            inner: Arc::clone(&self.inner),
            fallback: Arc::clone(&self.fallback),
            strategy: self.strategy,
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<T, S> ResourceStore<T, S>
where
    T: Resource,
    S: ResourceService<T>,
{
    /// Create a store with no fallback data.
    pub fn new(service: S) -> Self {
        ResourceStore {
            service: Arc::new(service),
            inner: Arc::new(RwLock::new(Inner {
                state: StoreState::default(),
                filters: Filters::new(),
                fingerprint: None,
                generation: 0,
            })),
            fallback: Arc::new(Vec::new),
            strategy: ReadStrategy::default(),
            metrics: Arc::new(LogMetrics),
        }
    }

    /// Dataset served when a read fails under [`ReadStrategy::Fallback`].
    pub fn with_fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn() -> Vec<T> + Send + Sync + 'static,
    {
        self.fallback = Arc::new(fallback);
        self
    }

    pub fn with_strategy(mut self, strategy: ReadStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn SyncMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn strategy(&self) -> ReadStrategy {
        self.strategy
    }

    pub async fn snapshot(&self) -> StoreState<T> {
        self.inner.read().await.state.clone()
    }

    pub async fn items(&self) -> Vec<T> {
        self.inner.read().await.state.items.clone()
    }

    /// Local copy of the record with `key`, if loaded.
    pub async fn find(&self, key: &T::Key) -> Option<T> {
        self.inner
            .read()
            .await
            .state
            .items
            .iter()
            .find(|r| r.key() == *key)
            .cloned()
    }

    /// Filters used by the last fetch.
    pub async fn filters(&self) -> Filters {
        self.inner.read().await.filters.clone()
    }

    /// Load the list for `filters`. Never fails; failures land in `error`.
    pub async fn fetch(&self, filters: Filters) -> StoreState<T> {
        let generation = {
            let mut inner = self.inner.write().await;
            inner.generation += 1;
            inner.fingerprint = Some(filters.fingerprint());
            inner.filters = filters.clone();
            inner.state.loading = true;
            inner.generation
        };

        debug!(
            "» Fetching {} (#{}, strategy: {})",
            T::collection_key(),
            generation,
            self.strategy
        );

        let timer = Instant::now();
        let result = self.service.list(&filters.cleaned()).await;

        let mut inner = self.inner.write().await;
        if inner.generation != generation {
            self.metrics.record_stale(T::resource_name(), generation);
            return inner.state.clone();
        }

        inner.state.loading = false;
        match result {
            Ok(page) => {
                self.metrics
                    .record_fetch(T::resource_name(), page.items.len(), timer.elapsed());
                inner.state.items = page.items;
                inner.state.total = page.total;
                inner.state.error = None;
                inner.state.origin = DataOrigin::Remote;
            }
            Err(e) => {
                let message = e.to_string();
                inner.state.error = Some(message.clone());
                match self.strategy {
                    ReadStrategy::Fallback => {
                        self.metrics.record_fallback(T::resource_name(), &message);
                        let items = (self.fallback)();
                        inner.state.total = items.len() as u64;
                        inner.state.items = items;
                        inner.state.origin = DataOrigin::Fallback;
                    }
                    ReadStrategy::Strict => {
                        self.metrics.record_error(T::resource_name(), &message);
                    }
                }
            }
        }
        inner.state.clone()
    }

    /// Fetch only if the cleaned filters differ from the last fetch's.
    pub async fn set_filters(&self, filters: Filters) -> StoreState<T> {
        let unchanged = {
            let inner = self.inner.read().await;
            inner.fingerprint.as_deref() == Some(filters.fingerprint().as_str())
        };
        if unchanged {
            debug!("{} filters unchanged; not refetching", T::collection_key());
            return self.snapshot().await;
        }
        self.fetch(filters).await
    }

    /// Fetch again with the last filters.
    pub async fn refetch(&self) -> StoreState<T> {
        let filters = self.filters().await;
        self.fetch(filters).await
    }

    /// Create a record, then refetch.
    ///
    /// # Errors
    /// Returns the service error, which is also recorded in `error`.
    pub async fn create(&self, draft: &T::Draft) -> Result<Option<T>> {
        let timer = Instant::now();
        let result = self.service.create(draft).await;
        self.finish_write("create", timer, result).await
    }

    /// Update a record, then refetch.
    ///
    /// # Errors
    /// Returns the service error, which is also recorded in `error`.
    pub async fn update(&self, key: &T::Key, draft: &T::Draft) -> Result<Option<T>> {
        let timer = Instant::now();
        let result = self.service.update(key, draft).await;
        self.finish_write("update", timer, result).await
    }

    /// Delete a record, then refetch.
    ///
    /// # Errors
    /// Returns the service error, which is also recorded in `error`.
    pub async fn delete(&self, key: &T::Key) -> Result<()> {
        let timer = Instant::now();
        let result = self.service.delete(key).await;
        self.finish_write("delete", timer, result).await
    }

    async fn finish_write<R>(&self, operation: &str, timer: Instant, result: Result<R>) -> Result<R> {
        match result {
            Ok(value) => {
                self.metrics
                    .record_write(T::resource_name(), operation, timer.elapsed());
                self.refetch().await;
                Ok(value)
            }
            Err(e) => {
                self.metrics.record_error(T::resource_name(), &e.to_string());
                self.inner.write().await.state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Apply `next` to one field of the record with `key`, then run `confirm`.
    ///
    /// The field changes before `confirm` is awaited. If `confirm` fails, the
    /// previous value is restored unless the field changed again meanwhile.
    /// On success the applied value is kept and nothing is read back.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if the record is not loaded, otherwise the
    /// error returned by `confirm`.
    pub async fn mutate_optimistic<V, F, Fut>(
        &self,
        key: &T::Key,
        lens: Lens<T, V>,
        next: V,
        confirm: F,
    ) -> Result<()>
    where
        V: Clone + PartialEq,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mutation = {
            let mut inner = self.inner.write().await;
            let record = find_mut(&mut inner.state.items, key)?;
            let mutation = OptimisticMutation::apply(lens(record), next);
            self.invalidate_in_flight(&mut inner);
            mutation
        };

        let timer = Instant::now();
        let outcome = confirm().await;

        let mut inner = self.inner.write().await;
        let target = inner
            .state
            .items
            .iter_mut()
            .find(|r| r.key() == *key)
            .map(lens);
        let settled = mutation.settle(target, &outcome);
        self.finish_optimistic(&mut inner, key, settled, timer, outcome)
    }

    /// Drop responses of fetches issued before this point.
    fn invalidate_in_flight(&self, inner: &mut Inner<T>) {
        if inner.state.loading {
            debug!(
                "Optimistic change on {}; discarding in-flight fetch #{}",
                T::collection_key(),
                inner.generation
            );
        }
        inner.generation += 1;
        inner.state.loading = false;
    }

    fn finish_optimistic(
        &self,
        inner: &mut Inner<T>,
        key: &T::Key,
        settled: Settled,
        timer: Instant,
        outcome: Result<()>,
    ) -> Result<()> {
        match outcome {
            Ok(()) => {
                self.metrics
                    .record_write(T::resource_name(), "optimistic", timer.elapsed());
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                if settled == Settled::RolledBack {
                    self.metrics
                        .record_rollback(T::resource_name(), &key.to_string(), &message);
                } else {
                    debug!(
                        "{} {} changed again before failure; not rolling back",
                        T::resource_name(),
                        key
                    );
                }
                inner.state.error = Some(message);
                Err(e)
            }
        }
    }
}

impl<T, S> ResourceStore<T, S>
where
    T: Toggleable,
    S: ToggleService<T>,
{
    /// Flip the status of the record with `key` optimistically.
    ///
    /// The local status changes before the service call is awaited. A failed
    /// call reverts it; a successful one leaves the toggled value in place
    /// whatever the response says.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if the record is not loaded, otherwise the
    /// service error.
    pub async fn toggle_status(&self, key: &T::Key) -> Result<Status> {
        let (mutation, next) = {
            let mut inner = self.inner.write().await;
            let record = find_mut(&mut inner.state.items, key)?;
            let mut status = record.status();
            let next = status.toggled();
            let mutation = OptimisticMutation::apply(&mut status, next);
            record.set_status(status);
            self.invalidate_in_flight(&mut inner);
            (mutation, next)
        };

        debug!("» Toggling {} {} to {}", T::resource_name(), key, next);

        let timer = Instant::now();
        let outcome = self.service.set_status(key, next).await;

        let mut inner = self.inner.write().await;
        let settled = match inner.state.items.iter_mut().find(|r| r.key() == *key) {
            Some(record) => {
                let mut status = record.status();
                let settled = mutation.settle(Some(&mut status), &outcome);
                record.set_status(status);
                settled
            }
            None => mutation.settle(None, &outcome),
        };
        self.finish_optimistic(&mut inner, key, settled, timer, outcome)?;
        Ok(next)
    }
}

fn find_mut<'a, T: Resource>(items: &'a mut [T], key: &T::Key) -> Result<&'a mut T> {
    items
        .iter_mut()
        .find(|r| r.key() == *key)
        .ok_or_else(|| Error::NotFound(format!("{} {} is not loaded", T::resource_name(), key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::ListPage;
    use crate::model::Customer;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    fn customer(id: &str, status: &str) -> Customer {
        serde_json::from_value(json!({"id": id, "name": format!("Customer {}", id), "status": status}))
            .unwrap()
    }

    /// Service answering from scripted queues, optionally gated.
    #[derive(Default)]
    struct ScriptedService {
        pages: Mutex<VecDeque<Result<ListPage<Customer>>>>,
        list_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
        status_results: Mutex<VecDeque<Result<()>>>,
        status_gate: Mutex<Option<oneshot::Receiver<()>>>,
        list_calls: AtomicUsize,
        writes: Mutex<Vec<String>>,
    }

    impl ScriptedService {
        fn page(self, items: Vec<Customer>) -> Self {
            self.pages.lock().unwrap().push_back(Ok(ListPage::new(items)));
            self
        }

        fn failing_page(self, error: Error) -> Self {
            self.pages.lock().unwrap().push_back(Err(error));
            self
        }

        fn status_result(self, result: Result<()>) -> Self {
            self.status_results.lock().unwrap().push_back(result);
            self
        }
    }

    impl ResourceService<Customer> for ScriptedService {
        async fn list(&self, _filters: &Filters) -> Result<ListPage<Customer>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let page = self
                .pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ListPage::new(Vec::new())));
            let gate = self.list_gates.lock().unwrap().pop_front();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            page
        }

        async fn get(&self, key: &String) -> Result<Customer> {
            Err(Error::NotFound(key.clone()))
        }

        async fn create(&self, draft: &Customer) -> Result<Option<Customer>> {
            if draft.name.is_empty() {
                return Err(Error::Http {
                    status: 422,
                    message: "name required".to_string(),
                });
            }
            self.writes.lock().unwrap().push(format!("create {}", draft.id));
            Ok(None)
        }

        async fn update(&self, key: &String, _draft: &Customer) -> Result<Option<Customer>> {
            self.writes.lock().unwrap().push(format!("update {}", key));
            Ok(None)
        }

        async fn delete(&self, key: &String) -> Result<()> {
            self.writes.lock().unwrap().push(format!("delete {}", key));
            Ok(())
        }
    }

    impl ToggleService<Customer> for ScriptedService {
        async fn set_status(&self, key: &String, status: Status) -> Result<()> {
            self.writes
                .lock()
                .unwrap()
                .push(format!("status {} {}", key, status));
            let gate = self.status_gate.lock().unwrap().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.status_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let service = ScriptedService::default().page(vec![customer("c1", "active")]);
        let store = ResourceStore::<Customer, _>::new(service);

        let state = store.fetch(Filters::new()).await;
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.total, 1);
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(state.origin, DataOrigin::Remote);
    }

    #[tokio::test]
    async fn test_fetch_failure_serves_fallback() {
        let service = ScriptedService::default().failing_page(Error::Network("refused".into()));
        let store = ResourceStore::<Customer, _>::new(service)
            .with_fallback(|| vec![customer("seed-1", "active"), customer("seed-2", "inactive")]);

        let state = store.fetch(Filters::new()).await;
        assert_eq!(state.origin, DataOrigin::Fallback);
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.total, 2);
        assert!(state.error.unwrap().contains("refused"));
    }

    #[tokio::test]
    async fn test_strict_failure_keeps_items() {
        let service = ScriptedService::default()
            .page(vec![customer("c1", "active")])
            .failing_page(Error::Http {
                status: 500,
                message: "boom".into(),
            });
        let store = ResourceStore::<Customer, _>::new(service)
            .with_strategy(ReadStrategy::Strict)
            .with_fallback(|| vec![customer("seed", "active")]);

        store.fetch(Filters::new()).await;
        let state = store.refetch().await;
        assert_eq!(state.items[0].id, "c1");
        assert_eq!(state.origin, DataOrigin::Remote);
        assert_eq!(state.error.as_deref(), Some("HTTP 500: boom"));
    }

    #[tokio::test]
    async fn test_set_filters_skips_equivalent_filters() {
        let store = ResourceStore::<Customer, _>::new(ScriptedService::default());

        store.set_filters(Filters::new().with("status", "active")).await;
        store
            .set_filters(Filters::new().with("status", "active").with("search", ""))
            .await;
        assert_eq!(store.service().list_calls.load(Ordering::SeqCst), 1);

        store.set_filters(Filters::new().with("status", "inactive")).await;
        assert_eq!(store.service().list_calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            store.filters().await.get("status"),
            Some(&json!("inactive"))
        );
    }

    #[tokio::test]
    async fn test_writes_refetch_and_propagate_errors() {
        let store = ResourceStore::<Customer, _>::new(ScriptedService::default());
        store.fetch(Filters::new()).await;

        store.create(&customer("c9", "active")).await.unwrap();
        store.delete(&"c9".to_string()).await.unwrap();
        assert_eq!(store.service().list_calls.load(Ordering::SeqCst), 3);

        let mut invalid = customer("c10", "active");
        invalid.name.clear();
        let err = store.create(&invalid).await.unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert_eq!(store.service().list_calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            store.snapshot().await.error.as_deref(),
            Some("HTTP 422: name required")
        );
    }

    #[tokio::test]
    async fn test_toggle_applies_before_call_and_rolls_back_on_failure() {
        let (release, gate) = oneshot::channel();
        let service = ScriptedService::default()
            .page(vec![customer("c1", "active")])
            .status_result(Err(Error::Http {
                status: 500,
                message: "boom".into(),
            }));
        *service.status_gate.lock().unwrap() = Some(gate);
        let store = ResourceStore::<Customer, _>::new(service);
        store.fetch(Filters::new()).await;

        let key = "c1".to_string();
        let (result, seen_while_pending) = tokio::join!(store.toggle_status(&key), async {
            let seen = store.find(&key).await.map(|c| c.status);
            release.send(()).unwrap();
            seen
        });

        assert_eq!(seen_while_pending, Some(Status::Inactive));
        assert!(result.is_err());
        assert_eq!(store.find(&key).await.map(|c| c.status), Some(Status::Active));
    }

    #[tokio::test]
    async fn test_toggle_success_is_not_resynced() {
        let service = ScriptedService::default().page(vec![customer("c1", "inactive")]);
        let store = ResourceStore::<Customer, _>::new(service);
        store.fetch(Filters::new()).await;

        let next = store.toggle_status(&"c1".to_string()).await.unwrap();
        assert_eq!(next, Status::Active);
        assert_eq!(
            store.find(&"c1".to_string()).await.map(|c| c.status),
            Some(Status::Active)
        );
        assert_eq!(store.service().list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *store.service().writes.lock().unwrap(),
            vec!["status c1 active".to_string()]
        );
    }

    #[tokio::test]
    async fn test_toggle_unknown_record() {
        let store = ResourceStore::<Customer, _>::new(ScriptedService::default());
        let err = store.toggle_status(&"ghost".to_string()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let (release_first, first_gate) = oneshot::channel();
        let (release_second, second_gate) = oneshot::channel();
        let service = ScriptedService::default()
            .page(vec![customer("old", "active")])
            .page(vec![customer("new", "active")]);
        {
            let mut gates = service.list_gates.lock().unwrap();
            gates.push_back(first_gate);
            gates.push_back(second_gate);
        }
        let store = ResourceStore::<Customer, _>::new(service);

        tokio::join!(
            store.fetch(Filters::new().with("search", "o")),
            store.fetch(Filters::new().with("search", "n")),
            async {
                release_second.send(()).unwrap();
                tokio::task::yield_now().await;
                release_first.send(()).unwrap();
            }
        );

        let state = store.snapshot().await;
        assert_eq!(state.items[0].id, "new");
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_mutate_optimistic_with_lens() {
        let service = ScriptedService::default().page(vec![customer("c1", "active")]);
        let store = ResourceStore::<Customer, _>::new(service);
        store.fetch(Filters::new()).await;

        let lens: Lens<Customer, String> = |c| &mut c.phone;
        let err = store
            .mutate_optimistic(&"c1".to_string(), lens, "99000 11111".to_string(), || async {
                Err(Error::Network("offline".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert_eq!(store.find(&"c1".to_string()).await.unwrap().phone, "");

        store
            .mutate_optimistic(&"c1".to_string(), lens, "99000 11111".to_string(), || async {
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(
            store.find(&"c1".to_string()).await.unwrap().phone,
            "99000 11111"
        );
    }
}
