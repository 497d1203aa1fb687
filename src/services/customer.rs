//! Customer calls beyond CRUD.

use super::{RestEndpoints, RestService};
use crate::endpoint::Endpoint;
use crate::envelope::ListPage;
use crate::error::Result;
use crate::filter::Filters;
use crate::http::ApiClient;
use crate::model::{Customer, Order};

impl RestService<Customer> {
    pub fn customers(client: ApiClient) -> Self {
        RestService::new(client, RestEndpoints::CUSTOMERS)
    }

    /// Order history of one customer.
    pub async fn orders(&self, customer_id: &str, filters: &Filters) -> Result<ListPage<Order>> {
        let path = Endpoint::CustomerOrders.with_id(&customer_id);
        let value = self.client().get(&path, filters).await?;
        ListPage::from_value(value, "orders")
    }
}
