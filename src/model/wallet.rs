//! Wallet discount codes.

use super::{lenient_f64, lenient_u32, Status, StatusCasing};
use crate::entity::{generate_id, Resource, Toggleable};
use crate::error::{Error, Result};
use crate::storage::keys;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    #[default]
    #[serde(alias = "Percentage", alias = "percent")]
    Percentage,
    #[serde(alias = "Fixed", alias = "flat")]
    Fixed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    #[serde(alias = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", alias = "kind", default)]
    pub kind: DiscountKind,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: f64,
    #[serde(default, alias = "minOrderValue", deserialize_with = "lenient_f64")]
    pub min_order: f64,
    #[serde(default)]
    pub max_uses: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub used_count: u32,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub valid_from: Option<String>,
    #[serde(default)]
    pub valid_until: Option<String>,
}

impl Discount {
    /// Whether the code can still be redeemed.
    pub fn is_redeemable(&self) -> bool {
        self.status.is_active() && self.max_uses.map_or(true, |max| self.used_count < max)
    }

    /// Amount taken off `subtotal`; zero when not redeemable or below the
    /// minimum order, never more than `subtotal`.
    pub fn amount_for(&self, subtotal: f64) -> f64 {
        if !self.is_redeemable() || subtotal < self.min_order || subtotal <= 0.0 {
            return 0.0;
        }
        let amount = match self.kind {
            DiscountKind::Percentage => subtotal * self.value.clamp(0.0, 100.0) / 100.0,
            DiscountKind::Fixed => self.value.max(0.0),
        };
        amount.min(subtotal)
    }
}

impl Resource for Discount {
    type Key = String;
    type Draft = Discount;

    fn key(&self) -> Self::Key {
        self.id.clone()
    }

    fn resource_name() -> &'static str {
        "discount"
    }

    fn collection_key() -> &'static str {
        "discounts"
    }

    fn storage_key() -> &'static str {
        keys::WALLET
    }

    fn from_draft(draft: Discount, key: Option<String>) -> Discount {
        Discount {
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
        if self.code.trim().is_empty() {
            return Err(Error::Validation("discount code is required".to_string()));
        }
        if self.kind == DiscountKind::Percentage && !(0.0..=100.0).contains(&self.value) {
            return Err(Error::Validation(format!(
                "percentage discount out of range: {}",
                self.value
            )));
        }
        Ok(())
    }
}

impl Toggleable for Discount {
    const STATUS_CASING: StatusCasing = StatusCasing::Lower;

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixed(value: f64, min_order: f64) -> Discount {
        serde_json::from_value(json!({
            "_id": "w1",
            "code": "FLAT50",
            "type": "fixed",
            "value": value,
            "minOrder": min_order
        }))
        .unwrap()
    }

    #[test]
    fn test_minimum_order_respected() {
        let d = fixed(50.0, 200.0);
        assert_eq!(d.amount_for(199.0), 0.0);
        assert_eq!(d.amount_for(200.0), 50.0);
    }

    #[test]
    fn test_inactive_or_exhausted_codes_give_nothing() {
        let mut d = fixed(50.0, 0.0);
        d.status = Status::Inactive;
        assert_eq!(d.amount_for(300.0), 0.0);

        let mut d = fixed(50.0, 0.0);
        d.max_uses = Some(10);
        d.used_count = 10;
        assert_eq!(d.amount_for(300.0), 0.0);
    }

    #[test]
    fn test_reads_kind_aliases() {
        let d: Discount =
            serde_json::from_value(json!({"code": "TEN", "type": "Percentage", "value": "10"}))
                .unwrap();
        assert_eq!(d.kind, DiscountKind::Percentage);
        assert_eq!(d.amount_for(80.0), 8.0);
    }

    #[test]
    fn test_percentage_range_validated() {
        let mut d = fixed(10.0, 0.0);
        d.kind = DiscountKind::Percentage;
        d.value = 120.0;
        assert!(d.validate().is_err());
    }
}
