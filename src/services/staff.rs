//! Delivery staff calls beyond CRUD.

use super::{RestEndpoints, RestService};
use crate::endpoint::Endpoint;
use crate::envelope::decode_record;
use crate::error::Result;
use crate::http::ApiClient;
use crate::model::{DeliveryStaff, StaffPerformance};

impl RestService<DeliveryStaff> {
    pub fn delivery_staff(client: ApiClient) -> Self {
        RestService::new(client, RestEndpoints::DELIVERY_STAFF)
    }

    /// Delivery metrics for one staff member.
    pub async fn performance(&self, staff_id: &str) -> Result<StaffPerformance> {
        let path = Endpoint::DeliveryStaffPerformance.with_id(&staff_id);
        let value = self.client().get(&path, &Default::default()).await?;
        decode_record(value, "performance")
    }
}
