//! Everything a dashboard session needs, wired from one [`ClientConfig`].
//!
//! With the backend enabled, each store reads through its REST service and
//! falls back to locally persisted data when a read fails. With the backend
//! disabled, each store reads and writes local storage only; the network is
//! never touched.
//!
//! ```no_run
//! use std::sync::Arc;
//! use dynasty_admin::{ClientConfig, Dashboard, Filters, Navigator};
//!
//! struct Router;
//! impl Navigator for Router {
//!     fn redirect(&self, path: &str) {
//!         println!("navigate to {}", path);
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> dynasty_admin::Result<()> {
//! let dashboard = Dashboard::new(ClientConfig::from_env()?)?;
//! let _guard = dashboard.guard_session(Arc::new(Router));
//!
//! dashboard.login("owner@dynastydairy.in", "secret").await?;
//! let state = dashboard.customers.set_filters(Filters::new().with("status", "active")).await;
//! println!("{} customers", state.total);
//! # Ok(())
//! # }
//! ```

use crate::auth::{AdminUser, AuthStore, Navigator, SessionGuard};
use crate::config::ClientConfig;
use crate::entity::{generate_id, Resource};
use crate::error::Result;
use crate::filter::Filters;
use crate::http::ApiClient;
use crate::model::{
    Banner, Branch, Category, Customer, DeliveryStaff, Discount, HomepageSettings, MembershipPlan,
    Notification, NotificationDraft, Order, OrderStatus, OverviewReport, Product, StaffPerformance,
    User,
};
use crate::optimistic::Lens;
use crate::repository::{LocalRepository, ResourceService, Source};
use crate::seed;
use crate::services::{
    AuthService, BranchService, CategoryService, CustomerService, DeliveryStaffService,
    HomepageService, MembershipService, NotificationService, OrderService, ProductService,
    ReportService, RestEndpoints, RestService, UserService, WalletService,
};
use crate::storage::{keys, InMemoryStore, LocalStore, Persisted};
use crate::store::ResourceStore;
use crate::strategy::DataOrigin;
use crate::envelope::ListPage;
use crate::observability::{LogMetrics, SyncMetrics};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Store over the backend service `R`, or local storage in demo mode.
pub type Store<T, R> = ResourceStore<T, Source<R, LocalRepository<T>>>;

pub struct Dashboard {
    config: ClientConfig,
    storage: Arc<dyn LocalStore>,
    client: ApiClient,
    auth: AuthService,
    reports: ReportService,
    homepage: HomepageService,
    homepage_local: Persisted<HomepageSettings>,

    pub customers: Store<Customer, CustomerService>,
    pub products: Store<Product, ProductService>,
    pub orders: Store<Order, OrderService>,
    pub delivery_staff: Store<DeliveryStaff, DeliveryStaffService>,
    pub discounts: Store<Discount, WalletService>,
    pub memberships: Store<MembershipPlan, MembershipService>,
    pub branches: Store<Branch, BranchService>,
    pub categories: Store<Category, CategoryService>,
    pub users: Store<User, UserService>,
    pub notifications: Store<Notification, NotificationService>,
    pub banners: Store<Banner, RestService<Banner>>,
}

impl Dashboard {
    /// Build a dashboard from `config`.
    ///
    /// Called inside a tokio runtime, this also spawns a guard that clears
    /// the persisted session on every 401. Redirecting to the login entry
    /// point additionally needs [`Dashboard::guard_session`].
    ///
    /// # Errors
    /// Returns `Err` if the storage directory cannot be opened or the HTTP
    /// client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_metrics(config, Arc::new(LogMetrics))
    }

    /// # Errors
    /// See [`Dashboard::new`].
    pub fn with_metrics(config: ClientConfig, metrics: Arc<dyn SyncMetrics>) -> Result<Self> {
        let storage = open_storage(&config)?;
        Self::with_storage(config, storage, metrics)
    }

    /// Build over an explicit storage backend. Session handling is as for
    /// [`Dashboard::new`].
    ///
    /// # Errors
    /// Returns `Err` if the HTTP client cannot be built.
    pub fn with_storage(
        config: ClientConfig,
        storage: Arc<dyn LocalStore>,
        metrics: Arc<dyn SyncMetrics>,
    ) -> Result<Self> {
        let auth_store = AuthStore::new(Arc::clone(&storage));
        let client = ApiClient::new(&config, auth_store)?;

        if tokio::runtime::Handle::try_current().is_ok() {
            SessionGuard::clearing(client.auth().clone()).spawn(client.subscribe());
        } else {
            debug!("No runtime; 401 responses clear the session only once guard_session runs");
        }

        info!(
            "Dashboard starting in {} mode",
            if config.use_backend { "backend" } else { "demo" }
        );

        let wiring = Wiring {
            storage: &storage,
            use_backend: config.use_backend,
            metrics: &metrics,
        };

        Ok(Dashboard {
            customers: wiring.store(CustomerService::customers(client.clone()), seed::customers()),
            products: wiring.store(ProductService::new(client.clone()), seed::products()),
            orders: wiring.store(OrderService::orders(client.clone()), seed::orders()),
            delivery_staff: wiring.store(
                DeliveryStaffService::delivery_staff(client.clone()),
                seed::delivery_staff(),
            ),
            discounts: wiring.store(WalletService::wallet(client.clone()), seed::discounts()),
            memberships: wiring.store(
                MembershipService::memberships(client.clone()),
                seed::memberships(),
            ),
            branches: wiring.store(BranchService::branches(client.clone()), seed::branches()),
            categories: wiring.store(
                CategoryService::categories(client.clone()),
                seed::categories(),
            ),
            users: wiring.store(UserService::users(client.clone()), seed::users()),
            notifications: wiring.store(
                NotificationService::notifications(client.clone()),
                seed::notifications(),
            ),
            banners: wiring.store(
                RestService::new(client.clone(), RestEndpoints::BANNERS),
                seed::banners(),
            ),
            homepage_local: Persisted::new(
                Arc::clone(&storage),
                keys::HOMEPAGE_SETTINGS,
                seed::homepage_settings,
            ),
            auth: AuthService::new(client.clone()),
            reports: ReportService::new(client.clone()),
            homepage: HomepageService::new(client.clone()),
            client,
            storage,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn LocalStore> {
        &self.storage
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Spawn the listener that ends the session on 401 and logout and
    /// redirects to `config.login_path`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn guard_session(&self, navigator: Arc<dyn Navigator>) -> JoinHandle<()> {
        let guard = SessionGuard::new(
            self.client.auth().clone(),
            navigator,
            self.config.login_path.clone(),
        );
        guard.spawn(self.client.subscribe())
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Sign in. In demo mode any credentials are accepted and a local session
    /// is created.
    ///
    /// # Errors
    /// Returns the backend's error, or a storage error if the session cannot
    /// be persisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser> {
        if self.config.use_backend {
            return self.auth.login(email, password).await;
        }
        let user = AdminUser::synthesized(email);
        self.client
            .auth()
            .persist(&format!("demo-{}", generate_id()), &user)?;
        info!("Signed in to demo mode as {}", email);
        Ok(user)
    }

    /// Sign out. In demo mode the backend is not called.
    pub async fn logout(&self) {
        if self.config.use_backend {
            self.auth.logout().await;
        } else {
            self.auth.end_local_session();
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.auth().is_authenticated()
    }

    pub fn current_user(&self) -> Option<AdminUser> {
        self.client.auth().user()
    }

    // ------------------------------------------------------------------
    // Refresh
    // ------------------------------------------------------------------

    /// Refetch every list with its current filters.
    pub async fn refresh_all(&self) {
        futures::join!(
            self.customers.refetch(),
            self.products.refetch(),
            self.orders.refetch(),
            self.delivery_staff.refetch(),
            self.discounts.refetch(),
            self.memberships.refetch(),
            self.branches.refetch(),
            self.categories.refetch(),
            self.users.refetch(),
            self.notifications.refetch(),
            self.banners.refetch(),
        );
    }

    // ------------------------------------------------------------------
    // Resource-specific actions
    // ------------------------------------------------------------------

    /// Show or hide a product, optimistically.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if the product is not loaded, otherwise the
    /// failure that caused the rollback.
    pub async fn toggle_product_availability(&self, product_id: &str) -> Result<bool> {
        let key = product_id.to_string();
        let current = self
            .products
            .find(&key)
            .await
            .map(|p| p.is_available)
            .unwrap_or(true);
        let next = !current;
        let lens: Lens<Product, bool> = |p| &mut p.is_available;

        let service = self.products.service();
        let key_ref = &key;
        self.products
            .mutate_optimistic(&key, lens, next, move || async move {
                match service {
                    Source::Remote(service) => service.set_availability(product_id, next).await,
                    Source::Local(repo) => {
                        repo.modify(key_ref, |p| p.is_available = next)?;
                        Ok(())
                    }
                }
            })
            .await?;
        Ok(next)
    }

    /// Move an order to `status`, then refetch orders.
    pub async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> Result<()> {
        match self.orders.service() {
            Source::Remote(service) => {
                service.update_status(order_id, status).await?;
            }
            Source::Local(repo) => {
                repo.modify(&order_id.to_string(), |o| o.status = status)?;
            }
        }
        self.orders.refetch().await;
        Ok(())
    }

    /// Order history of one customer.
    pub async fn customer_orders(&self, customer_id: &str) -> Result<ListPage<Order>> {
        let filters = Filters::new().with("customerId", customer_id);
        match self.customers.service() {
            Source::Remote(service) => service.orders(customer_id, &Filters::new()).await,
            Source::Local(_) => match self.orders.service() {
                Source::Local(orders) => orders.list(&filters).await,
                Source::Remote(orders) => orders.list(&filters).await,
            },
        }
    }

    /// Delivery metrics for one staff member.
    pub async fn staff_performance(&self, staff_id: &str) -> Result<StaffPerformance> {
        match self.delivery_staff.service() {
            Source::Remote(service) => service.performance(staff_id).await,
            Source::Local(repo) => Ok(repo.get(&staff_id.to_string()).await?.performance),
        }
    }

    /// Send a notification, then refetch notifications.
    pub async fn send_notification(&self, draft: &NotificationDraft) -> Result<Option<Notification>> {
        draft.validate()?;
        let sent = match self.notifications.service() {
            Source::Remote(service) => service.send(draft).await?,
            Source::Local(repo) => repo.create(draft).await?,
        };
        self.notifications.refetch().await;
        Ok(sent)
    }

    /// Mark a notification read, optimistically.
    pub async fn mark_notification_read(&self, notification_id: &str) -> Result<()> {
        let key = notification_id.to_string();
        let lens: Lens<Notification, bool> = |n| &mut n.read;
        let service = self.notifications.service();
        let key_ref = &key;
        self.notifications
            .mutate_optimistic(&key, lens, true, move || async move {
                match service {
                    Source::Remote(service) => service.mark_read(notification_id).await,
                    Source::Local(repo) => {
                        repo.modify(key_ref, |n| n.read = true)?;
                        Ok(())
                    }
                }
            })
            .await
    }

    // ------------------------------------------------------------------
    // Homepage and reports
    // ------------------------------------------------------------------

    /// Homepage settings, falling back to the local copy on failure.
    pub async fn homepage_settings(&self) -> (HomepageSettings, DataOrigin) {
        if !self.config.use_backend {
            return (self.homepage_local.get(), DataOrigin::Remote);
        }
        match self.homepage.settings().await {
            Ok(settings) => {
                self.homepage_local.set(settings.clone());
                (settings, DataOrigin::Remote)
            }
            Err(e) => {
                warn!("Homepage settings unavailable, using local copy: {}", e);
                (self.homepage_local.get(), DataOrigin::Fallback)
            }
        }
    }

    /// Save homepage settings.
    ///
    /// # Errors
    /// Returns the backend error; the local copy is only updated on success.
    pub async fn update_homepage_settings(&self, settings: &HomepageSettings) -> Result<HomepageSettings> {
        let stored = if self.config.use_backend {
            self.homepage.update_settings(settings).await?
        } else {
            settings.clone()
        };
        self.homepage_local.set(stored.clone());
        Ok(stored)
    }

    /// Sales, customer and product reports together.
    ///
    /// The three backend requests run concurrently; if any fails, the whole
    /// overview is replaced by the seed overview.
    pub async fn overview(&self, filters: &Filters) -> (OverviewReport, DataOrigin) {
        if !self.config.use_backend {
            return (seed::overview_report(), DataOrigin::Remote);
        }
        match self.reports.overview(filters).await {
            Ok(report) => (report, DataOrigin::Remote),
            Err(e) => {
                warn!("Overview report unavailable, using sample data: {}", e);
                (seed::overview_report(), DataOrigin::Fallback)
            }
        }
    }

    pub fn reports(&self) -> &ReportService {
        &self.reports
    }
}

/// Shared inputs for building stores.
struct Wiring<'a> {
    storage: &'a Arc<dyn LocalStore>,
    use_backend: bool,
    metrics: &'a Arc<dyn SyncMetrics>,
}

impl Wiring<'_> {
    fn store<T, R>(&self, remote: R, seed: Vec<T>) -> Store<T, R>
    where
        T: Resource,
        R: ResourceService<T>,
    {
        let local = LocalRepository::new(Arc::clone(self.storage), seed);
        let fallback = local.clone();
        let source = if self.use_backend {
            Source::Remote(remote)
        } else {
            Source::Local(local)
        };
        ResourceStore::new(source)
            .with_fallback(move || fallback.all())
            .with_metrics(Arc::clone(self.metrics))
    }
}

#[cfg(feature = "file-store")]
fn open_storage(config: &ClientConfig) -> Result<Arc<dyn LocalStore>> {
    match &config.storage_dir {
        Some(dir) => Ok(Arc::new(crate::storage::FileStore::open(dir)?)),
        None => Ok(Arc::new(InMemoryStore::new())),
    }
}

#[cfg(not(feature = "file-store"))]
fn open_storage(config: &ClientConfig) -> Result<Arc<dyn LocalStore>> {
    if config.storage_dir.is_some() {
        warn!("Built without file-store; keeping local data in memory");
    }
    Ok(Arc::new(InMemoryStore::new()))
}
