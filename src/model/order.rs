//! Orders, line items and totals.

use super::{lenient_f64, lenient_u32, record_ref, Discount};
use crate::entity::Resource;
use crate::error::{Error, Result};
use crate::order_id::{next_order_id, ORDER_ID_FLOOR};
use crate::storage::keys;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Completed", alias = "delivered", alias = "Delivered")]
    Completed,
    #[serde(alias = "Cancelled", alias = "canceled")]
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    #[serde(alias = "Pending", alias = "unpaid")]
    Pending,
    #[serde(alias = "Paid")]
    Paid,
    #[serde(alias = "Failed")]
    Failed,
    #[serde(alias = "Refunded")]
    Refunded,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(alias = "product", deserialize_with = "record_ref")]
    pub product_id: String,
    #[serde(default, alias = "dishName")]
    pub product_name: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: f64,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Computed money fields of an order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
}

impl OrderTotals {
    /// Subtotal of `items`, the discount it earns, and the resulting total.
    ///
    /// The discount never exceeds the subtotal and is only applied when the
    /// discount is active and the order meets its minimum.
    pub fn compute(items: &[OrderItem], discount: Option<&Discount>) -> OrderTotals {
        let subtotal = round_money(items.iter().map(OrderItem::line_total).sum());
        let discount = discount.map_or(0.0, |d| round_money(d.amount_for(subtotal)));
        OrderTotals {
            subtotal,
            discount,
            total: round_money(subtotal - discount),
        }
    }
}

fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id", alias = "orderId", default)]
    pub id: String,
    #[serde(default, alias = "customer", deserialize_with = "record_ref")]
    pub customer_id: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub subtotal: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub discount: f64,
    #[serde(default, alias = "totalAmount", deserialize_with = "lenient_f64")]
    pub total: f64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default, alias = "branch")]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub delivery_instructions: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Recompute subtotal/discount/total from the line items.
    pub fn apply_totals(&mut self, discount: Option<&Discount>) {
        let totals = OrderTotals::compute(&self.items, discount);
        self.subtotal = totals.subtotal;
        self.discount = totals.discount;
        self.total = totals.total;
    }
}

impl Resource for Order {
    type Key = String;
    type Draft = Order;

    fn key(&self) -> Self::Key {
        self.id.clone()
    }

    fn resource_name() -> &'static str {
        "order"
    }

    fn collection_key() -> &'static str {
        "orders"
    }

    fn storage_key() -> &'static str {
        keys::ORDERS
    }

    fn from_draft(draft: Order, key: Option<String>) -> Order {
        Order {
            id: key.unwrap_or(draft.id.clone()),
            ..draft
        }
    }

    fn assign_key(&mut self, existing: &[Self]) {
        if self.id.is_empty() {
            self.id = next_order_id(existing.iter().map(|o| o.id.as_str()), ORDER_ID_FLOOR);
        }
        if self.created_at.is_none() {
            self.created_at = Some(Utc::now());
        }
        if self.total == 0.0 && !self.items.is_empty() {
            self.apply_totals(None);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(Error::Validation("an order needs at least one item".to_string()));
        }
        if self.items.iter().any(|i| i.quantity == 0) {
            return Err(Error::Validation("item quantities must be positive".to_string()));
        }
        Ok(())
    }
}
