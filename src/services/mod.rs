//! Backend services, one per resource.
//!
//! Most resources are plain CRUD over a collection route and an item route,
//! served by the generic [`RestService`]. Resource-specific calls (customer
//! order history, staff performance, notification sending, ...) are inherent
//! methods on the concrete `RestService<T>` aliases. Products, auth, homepage
//! content and reports have their own service types.

pub mod auth;
pub mod customer;
pub mod homepage;
pub mod notification;
pub mod order;
pub mod product;
pub mod report;
pub mod staff;
pub mod wallet;

pub use auth::AuthService;
pub use homepage::HomepageService;
pub use product::ProductService;
pub use report::ReportService;

use crate::endpoint::Endpoint;
use crate::entity::{Resource, Toggleable};
use crate::envelope::{decode_record, ListPage};
use crate::error::Result;
use crate::filter::Filters;
use crate::http::ApiClient;
use crate::model::{
    Branch, Category, Customer, DeliveryStaff, Discount, MembershipPlan, Notification, Order, User,
};
use crate::model::Status;
use crate::repository::{ResourceService, ToggleService};
use serde_json::{json, Value};
use std::marker::PhantomData;

/// Routes backing one resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestEndpoints {
    pub collection: Endpoint,
    pub item: Endpoint,
    /// Dedicated status route. Without one, status changes PATCH the item.
    pub status: Option<Endpoint>,
    /// Key a single record may be wrapped in (`{ "customer": {...} }`).
    pub record: &'static str,
}

impl RestEndpoints {
    pub const CUSTOMERS: RestEndpoints = RestEndpoints {
        collection: Endpoint::Customers,
        item: Endpoint::Customer,
        status: Some(Endpoint::CustomerStatus),
        record: "customer",
    };

    pub const ORDERS: RestEndpoints = RestEndpoints {
        collection: Endpoint::Orders,
        item: Endpoint::Order,
        status: Some(Endpoint::OrderStatus),
        record: "order",
    };

    pub const DELIVERY_STAFF: RestEndpoints = RestEndpoints {
        collection: Endpoint::DeliveryStaff,
        item: Endpoint::DeliveryStaffMember,
        status: Some(Endpoint::DeliveryStaffStatus),
        record: "staff",
    };

    pub const BRANCHES: RestEndpoints = RestEndpoints {
        collection: Endpoint::Branches,
        item: Endpoint::Branch,
        status: None,
        record: "branch",
    };

    pub const CATEGORIES: RestEndpoints = RestEndpoints {
        collection: Endpoint::Categories,
        item: Endpoint::Category,
        status: None,
        record: "category",
    };

    pub const NOTIFICATIONS: RestEndpoints = RestEndpoints {
        collection: Endpoint::Notifications,
        item: Endpoint::Notification,
        status: None,
        record: "notification",
    };

    pub const DISCOUNTS: RestEndpoints = RestEndpoints {
        collection: Endpoint::WalletDiscounts,
        item: Endpoint::WalletDiscount,
        status: Some(Endpoint::WalletDiscountStatus),
        record: "discount",
    };

    pub const MEMBERSHIPS: RestEndpoints = RestEndpoints {
        collection: Endpoint::Memberships,
        item: Endpoint::Membership,
        status: Some(Endpoint::MembershipStatus),
        record: "membership",
    };

    pub const USERS: RestEndpoints = RestEndpoints {
        collection: Endpoint::Users,
        item: Endpoint::User,
        status: Some(Endpoint::UserStatus),
        record: "user",
    };

    pub const PRODUCTS: RestEndpoints = RestEndpoints {
        collection: Endpoint::Products,
        item: Endpoint::Product,
        status: None,
        record: "product",
    };

    pub const BANNERS: RestEndpoints = RestEndpoints {
        collection: Endpoint::HomepageBanners,
        item: Endpoint::HomepageBanner,
        status: None,
        record: "banner",
    };
}

/// Generic CRUD service over a [`RestEndpoints`] description.
pub struct RestService<T> {
    client: ApiClient,
    endpoints: RestEndpoints,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for RestService<T> {
    fn clone(&self) -> Self {
        RestService {
            client: self.client.clone(),
            endpoints: self.endpoints,
            _marker: PhantomData,
        }
    }
}

impl<T: Resource> RestService<T> {
    pub fn new(client: ApiClient, endpoints: RestEndpoints) -> Self {
        RestService {
            client,
            endpoints,
            _marker: PhantomData,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn endpoints(&self) -> &RestEndpoints {
        &self.endpoints
    }

    fn item_path(&self, key: &T::Key) -> String {
        self.endpoints.item.with_id(key)
    }

    /// Decode a list response into normalized records.
    pub(crate) fn decode_page(&self, value: Value) -> Result<ListPage<T>> {
        let ctx = self.client.normalize_context();
        let page = ListPage::<T>::from_value(value, T::collection_key())?;
        Ok(page.map(|record| record.normalize(&ctx)))
    }

    /// Decode a single-record response into a normalized record.
    pub(crate) fn decode_one(&self, value: Value) -> Result<T> {
        let record: T = decode_record(value, self.endpoints.record)?;
        Ok(record.normalize(&self.client.normalize_context()))
    }

    /// Decode a write response; acknowledgements without a record yield
    /// `None`.
    pub(crate) fn decode_written(&self, value: Value) -> Result<Option<T>> {
        let value = crate::envelope::unwrap_envelope(value)?;
        if value.is_null() {
            return Ok(None);
        }
        match self.decode_one(value) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                debug!(
                    "{} write answered without a record ({}); will refetch",
                    T::resource_name(),
                    e
                );
                Ok(None)
            }
        }
    }
}

impl<T: Resource> ResourceService<T> for RestService<T> {
    async fn list(&self, filters: &Filters) -> Result<ListPage<T>> {
        let value = self
            .client
            .get(self.endpoints.collection.template(), filters)
            .await?;
        self.decode_page(value)
    }

    async fn get(&self, key: &T::Key) -> Result<T> {
        let value = self.client.get(&self.item_path(key), &Filters::new()).await?;
        self.decode_one(value)
    }

    async fn create(&self, draft: &T::Draft) -> Result<Option<T>> {
        let value = self
            .client
            .post(self.endpoints.collection.template(), draft)
            .await?;
        self.decode_written(value)
    }

    async fn update(&self, key: &T::Key, draft: &T::Draft) -> Result<Option<T>> {
        let value = self.client.put(&self.item_path(key), draft).await?;
        self.decode_written(value)
    }

    async fn delete(&self, key: &T::Key) -> Result<()> {
        let value = self.client.delete(&self.item_path(key)).await?;
        crate::envelope::unwrap_envelope(value)?;
        Ok(())
    }
}

impl<T: Toggleable> ToggleService<T> for RestService<T> {
    async fn set_status(&self, key: &T::Key, status: Status) -> Result<()> {
        let body = json!({ "status": status.as_wire(T::STATUS_CASING) });
        let path = match self.endpoints.status {
            Some(endpoint) => endpoint.with_id(key),
            None => self.item_path(key),
        };
        let value = self.client.patch(&path, &body).await?;
        crate::envelope::unwrap_envelope(value)?;
        Ok(())
    }
}

pub type CustomerService = RestService<Customer>;
pub type OrderService = RestService<Order>;
pub type DeliveryStaffService = RestService<DeliveryStaff>;
pub type WalletService = RestService<Discount>;
pub type NotificationService = RestService<Notification>;
pub type MembershipService = RestService<MembershipPlan>;
pub type BranchService = RestService<Branch>;
pub type CategoryService = RestService<Category>;
pub type UserService = RestService<User>;

/// Constructors for the plain REST services.
impl RestService<MembershipPlan> {
    pub fn memberships(client: ApiClient) -> Self {
        RestService::new(client, RestEndpoints::MEMBERSHIPS)
    }
}

impl RestService<Branch> {
    pub fn branches(client: ApiClient) -> Self {
        RestService::new(client, RestEndpoints::BRANCHES)
    }
}

impl RestService<Category> {
    pub fn categories(client: ApiClient) -> Self {
        RestService::new(client, RestEndpoints::CATEGORIES)
    }
}

impl RestService<User> {
    pub fn users(client: ApiClient) -> Self {
        RestService::new(client, RestEndpoints::USERS)
    }
}
