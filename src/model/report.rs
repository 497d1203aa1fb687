//! Read-only report payloads.

use super::{lenient_f64, lenient_u32};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    #[serde(alias = "_id")]
    pub date: String,
    #[serde(default, alias = "sales", deserialize_with = "lenient_f64")]
    pub revenue: f64,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub orders: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    #[serde(default, alias = "totalSales", deserialize_with = "lenient_f64")]
    pub total_revenue: f64,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub total_orders: u32,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average_order_value: f64,
    #[serde(default, alias = "dailySales")]
    pub daily: Vec<DailySales>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReport {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub total_customers: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub new_customers: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub active_customers: u32,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub retention_rate: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    #[serde(default, alias = "_id", alias = "productId")]
    pub product_id: String,
    #[serde(default, alias = "dishName")]
    pub name: String,
    #[serde(default, alias = "quantitySold", deserialize_with = "lenient_u32")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub revenue: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReport {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub total_products: u32,
    #[serde(default, alias = "lowStockCount", deserialize_with = "lenient_u32")]
    pub low_stock: u32,
    #[serde(default, alias = "topSelling")]
    pub top_products: Vec<ProductSales>,
}

/// Sales, customer and product reports fetched together.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewReport {
    pub sales: SalesReport,
    pub customers: CustomerReport,
    pub products: ProductReport,
}
