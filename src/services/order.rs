//! Order calls beyond CRUD.

use super::{RestEndpoints, RestService};
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::http::ApiClient;
use crate::model::{Order, OrderStatus};
use serde_json::json;

impl RestService<Order> {
    pub fn orders(client: ApiClient) -> Self {
        RestService::new(client, RestEndpoints::ORDERS)
    }

    /// Move an order to `status`. Returns the updated order when the backend
    /// sends one back.
    pub async fn update_status(&self, order_id: &str, status: OrderStatus) -> Result<Option<Order>> {
        let path = Endpoint::OrderStatus.with_id(&order_id);
        let value = self
            .client()
            .patch(&path, &json!({ "status": status.to_string() }))
            .await?;
        self.decode_written(value)
    }
}
