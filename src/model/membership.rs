//! Membership plans.

use super::{lenient_f64, lenient_u32, Status, StatusCasing};
use crate::entity::{generate_id, Resource, Toggleable};
use crate::error::{Error, Result};
use crate::storage::keys;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPlan {
    #[serde(alias = "_id", default)]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: f64,
    /// Validity in days.
    #[serde(default, alias = "durationDays", deserialize_with = "lenient_u32")]
    pub duration: u32,
    #[serde(default, alias = "discount", deserialize_with = "lenient_f64")]
    pub discount_percent: f64,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub member_count: u32,
}

impl Resource for MembershipPlan {
    type Key = String;
    type Draft = MembershipPlan;

    fn key(&self) -> Self::Key {
        self.id.clone()
    }

    fn resource_name() -> &'static str {
        "membership plan"
    }

    fn collection_key() -> &'static str {
        "memberships"
    }

    fn storage_key() -> &'static str {
        keys::MEMBERSHIP
    }

    fn from_draft(draft: MembershipPlan, key: Option<String>) -> MembershipPlan {
        MembershipPlan {
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
            return Err(Error::Validation("plan name is required".to_string()));
        }
        if self.price < 0.0 {
            return Err(Error::Validation("plan price cannot be negative".to_string()));
        }
        Ok(())
    }
}

impl Toggleable for MembershipPlan {
    const STATUS_CASING: StatusCasing = StatusCasing::Lower;

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}
