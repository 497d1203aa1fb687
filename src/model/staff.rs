//! Delivery staff profiles.

use super::{lenient_f64, lenient_u32, Status, StatusCasing};
use crate::entity::{generate_id, NormalizeContext, Resource, Toggleable};
use crate::error::{Error, Result};
use crate::image::resolve_in_place;
use crate::storage::keys;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStaff {
    #[serde(alias = "_id", default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default, alias = "branch")]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub vehicle: Option<String>,
    #[serde(default, alias = "photo")]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub performance: StaffPerformance,
}

/// Delivery metrics, embedded in staff records and served on their own by
/// the performance endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffPerformance {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rating: f64,
    #[serde(default, alias = "totalDeliveries", deserialize_with = "lenient_u32")]
    pub completed_orders: u32,
    /// Minutes.
    #[serde(default, alias = "avgDeliveryTime", deserialize_with = "lenient_f64")]
    pub average_delivery_time: f64,
}

impl Resource for DeliveryStaff {
    type Key = String;
    type Draft = DeliveryStaff;

    fn key(&self) -> Self::Key {
        self.id.clone()
    }

    fn resource_name() -> &'static str {
        "delivery staff member"
    }

    fn collection_key() -> &'static str {
        "deliveryStaff"
    }

    fn storage_key() -> &'static str {
        keys::DELIVERY_STAFF
    }

    fn from_draft(draft: DeliveryStaff, key: Option<String>) -> DeliveryStaff {
        DeliveryStaff {
            id: key.unwrap_or(draft.id.clone()),
            ..draft
        }
    }

    fn assign_key(&mut self, _existing: &[Self]) {
        if self.id.is_empty() {
            self.id = generate_id();
        }
    }

    fn normalize(mut self, ctx: &NormalizeContext) -> Self {
        resolve_in_place(&mut self.avatar, &ctx.backend_origin);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("staff name is required".to_string()));
        }
        Ok(())
    }
}

impl Toggleable for DeliveryStaff {
    // The staff routes expect "Active"/"Inactive".
    const STATUS_CASING: StatusCasing = StatusCasing::Title;

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}
