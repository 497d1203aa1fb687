//! Wallet discount codes.

use super::{RestEndpoints, RestService};
use crate::http::ApiClient;
use crate::model::Discount;

impl RestService<Discount> {
    pub fn wallet(client: ApiClient) -> Self {
        RestService::new(client, RestEndpoints::DISCOUNTS)
    }
}
