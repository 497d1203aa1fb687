//! Records exchanged with the backend and stored locally.
//!
//! Field names follow the backend's camelCase JSON. Backend quirks (`_id`,
//! `dishName`, composed customer names, mixed status casing) are absorbed by
//! serde attributes so the rest of the crate sees one shape.

pub mod branch;
pub mod customer;
pub mod homepage;
pub mod membership;
pub mod notification;
pub mod order;
pub mod product;
pub mod report;
pub mod staff;
pub mod user;
pub mod wallet;

pub use branch::{Branch, Category};
pub use customer::Customer;
pub use homepage::{Banner, HomepageSettings};
pub use membership::MembershipPlan;
pub use notification::{Audience, Notification, NotificationDraft};
pub use order::{Order, OrderItem, OrderStatus, OrderTotals, PaymentStatus};
pub use product::{FileUpload, ImageSource, Product, ProductInput, Variant, VariantInput};
pub use report::{
    CustomerReport, DailySales, OverviewReport, ProductReport, ProductSales, SalesReport,
};
pub use staff::{DeliveryStaff, StaffPerformance};
pub use user::User;
pub use wallet::{Discount, DiscountKind};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Two-state record status.
///
/// Reads accept any casing (`"active"`, `"Active"`, `"ACTIVE"`). Writes use
/// the casing of the resource being written, see [`StatusCasing`]. Plain
/// serialization (local storage) is lower-case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl Status {
    pub fn toggled(self) -> Status {
        match self {
            Status::Active => Status::Inactive,
            Status::Inactive => Status::Active,
        }
    }

    pub fn is_active(self) -> bool {
        self == Status::Active
    }

    /// Wire text in the given casing.
    pub fn as_wire(self, casing: StatusCasing) -> &'static str {
        match (self, casing) {
            (Status::Active, StatusCasing::Lower) => "active",
            (Status::Inactive, StatusCasing::Lower) => "inactive",
            (Status::Active, StatusCasing::Title) => "Active",
            (Status::Inactive, StatusCasing::Title) => "Inactive",
        }
    }

    /// Parse ignoring case and surrounding whitespace.
    pub fn parse(text: &str) -> Option<Status> {
        match text.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Status::Active),
            "inactive" => Some(Status::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire(StatusCasing::Lower))
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire(StatusCasing::Lower))
    }
}

/// Null, unknown or non-string values read as the default status.
impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let status = match &value {
            serde_json::Value::Null => None,
            serde_json::Value::String(text) => Status::parse(text),
            _ => None,
        };
        Ok(status.unwrap_or_else(|| {
            if !value.is_null() {
                warn!("Unknown status {}; reading as {}", value, Status::default());
            }
            Status::default()
        }))
    }
}

/// Casing a resource's status is written in.
///
/// Customers, discounts, plans, branches and users are written lower-case;
/// delivery staff are written title-case. Reads never depend on this.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusCasing {
    Lower,
    Title,
}

/// Deserialize a number that may arrive as a JSON string.
pub(crate) fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrText {
        Num(f64),
        Text(String),
        Null,
    }

    match NumOrText::deserialize(deserializer)? {
        NumOrText::Num(n) => Ok(n),
        NumOrText::Text(s) if s.trim().is_empty() => Ok(0.0),
        NumOrText::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("not a number: {:?}", s))),
        NumOrText::Null => Ok(0.0),
    }
}

/// Integer variant of [`lenient_f64`]; fractional values are truncated.
pub(crate) fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let n = lenient_f64(deserializer)?;
    if n < 0.0 {
        return Err(serde::de::Error::custom(format!("negative count: {}", n)));
    }
    Ok(n as u32)
}

/// Deserialize a reference to another record: its id as a string, a number,
/// or a populated object carrying `_id`/`id`. Anything else reads as empty.
pub(crate) fn record_ref<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    use serde_json::Value;

    let value = Value::deserialize(deserializer)?;
    let id = match &value {
        Value::String(id) => Some(id.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map
            .get("_id")
            .or_else(|| map.get("id"))
            .and_then(|id| match id {
                Value::String(id) => Some(id.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }),
        _ => None,
    };
    Ok(id.unwrap_or_else(|| {
        if !value.is_null() {
            warn!("Unreadable record reference {}", value);
        }
        String::new()
    }))
}
