//! # dynasty-admin
//!
//! Data-sync layer for the Dynasty Dairy admin dashboard.
//!
//! ## Features
//!
//! - **REST client:** bearer auth, per-request timeout, tolerant envelope
//!   decoding and a single 401 policy point ([`auth::SessionGuard`])
//! - **Endpoint registry:** every route in one place ([`endpoint`])
//! - **Resource stores:** list state with filter tracking, stale-response
//!   protection and optimistic toggles ([`ResourceStore`])
//! - **Offline fallback:** seed data persisted locally, served when the
//!   backend is unreachable or disabled ([`LocalRepository`])
//! - **Multipart products:** stable field contract for products with
//!   variants and per-variant images ([`form`])
//!
//! ## Quick Start
//!
//! ```no_run
//! use dynasty_admin::{ClientConfig, Dashboard, Filters};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> dynasty_admin::Result<()> {
//! let dashboard = Dashboard::new(ClientConfig::new("https://api.dynastydairy.in"))?;
//! dashboard.login("owner@dynastydairy.in", "secret").await?;
//!
//! let orders = dashboard
//!     .orders
//!     .set_filters(Filters::new().with("status", "pending"))
//!     .await;
//! for order in &orders.items {
//!     println!("{} {} {}", order.id, order.customer_name, order.total);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Building blocks
//!
//! The facade is optional. A single store can be wired by hand:
//!
//! ```no_run
//! use std::sync::Arc;
//! use dynasty_admin::auth::AuthStore;
//! use dynasty_admin::model::Customer;
//! use dynasty_admin::services::CustomerService;
//! use dynasty_admin::storage::InMemoryStore;
//! use dynasty_admin::{ApiClient, ClientConfig, ResourceStore};
//!
//! # fn main() -> dynasty_admin::Result<()> {
//! let storage = Arc::new(InMemoryStore::new());
//! let client = ApiClient::new(&ClientConfig::default(), AuthStore::new(storage))?;
//! let customers = ResourceStore::<Customer, _>::new(CustomerService::customers(client));
//! # let _ = customers;
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate log;

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod endpoint;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod form;
pub mod http;
pub mod image;
pub mod model;
pub mod observability;
pub mod optimistic;
pub mod order_id;
pub mod repository;
pub mod seed;
pub mod services;
pub mod storage;
pub mod store;
pub mod strategy;

// Re-exports for convenience
pub use auth::{AdminUser, Navigator, SessionEvent};
pub use config::ClientConfig;
pub use dashboard::Dashboard;
pub use entity::{Resource, Toggleable};
pub use envelope::ListPage;
pub use error::{Error, Result};
pub use filter::Filters;
pub use http::ApiClient;
pub use model::{Status, StatusCasing};
pub use repository::{LocalRepository, ResourceService, Source, ToggleService};
pub use store::{ResourceStore, StoreState};
pub use strategy::{DataOrigin, ReadStrategy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
