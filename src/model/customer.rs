//! Customer records.

use super::{lenient_f64, lenient_u32, Status, StatusCasing};
use crate::entity::{generate_id, Resource, Toggleable};
use crate::error::{Error, Result};
use crate::storage::keys;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "CustomerWire")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: Status,
    pub membership: Option<String>,
    pub join_date: Option<String>,
    pub total_orders: u32,
    pub total_spent: f64,
}

/// Backend shape: `_id` or `id`, and either `name` or `firstName`/`lastName`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerWire {
    #[serde(alias = "_id", default)]
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    status: Status,
    #[serde(default, alias = "membershipTier")]
    membership: Option<String>,
    #[serde(default, alias = "createdAt")]
    join_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    total_orders: u32,
    #[serde(default, alias = "totalSpend", deserialize_with = "lenient_f64")]
    total_spent: f64,
}

impl From<CustomerWire> for Customer {
    fn from(wire: CustomerWire) -> Self {
        let name = match wire.name.filter(|n| !n.trim().is_empty()) {
            Some(name) => name,
            None => compose_name(wire.first_name.as_deref(), wire.last_name.as_deref()),
        };

        Customer {
            id: wire.id,
            name,
            email: wire.email,
            phone: wire.phone,
            status: wire.status,
            membership: wire.membership,
            join_date: wire.join_date,
            total_orders: wire.total_orders,
            total_spent: wire.total_spent,
        }
    }
}

fn compose_name(first: Option<&str>, last: Option<&str>) -> String {
    [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Resource for Customer {
    type Key = String;
    type Draft = Customer;

    fn key(&self) -> Self::Key {
        self.id.clone()
    }

    fn resource_name() -> &'static str {
        "customer"
    }

    fn collection_key() -> &'static str {
        "customers"
    }

    fn storage_key() -> &'static str {
        keys::CUSTOMERS
    }

    fn from_draft(draft: Customer, key: Option<String>) -> Customer {
        Customer {
            id: key.unwrap_or(draft.id.clone()),
            ..draft
        }
    }

    fn assign_key(&mut self, _existing: &[Self]) {
        if self.id.is_empty() {
            self.id = generate_id();
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("customer name is required".to_string()));
        }
        Ok(())
    }
}

impl Toggleable for Customer {
    const STATUS_CASING: StatusCasing = StatusCasing::Lower;

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}
