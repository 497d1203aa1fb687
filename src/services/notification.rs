//! Notification sending and read receipts.

use super::{RestEndpoints, RestService};
use crate::endpoint::Endpoint;
use crate::envelope::unwrap_envelope;
use crate::error::Result;
use crate::http::ApiClient;
use crate::model::{Notification, NotificationDraft};
use serde_json::json;

impl RestService<Notification> {
    pub fn notifications(client: ApiClient) -> Self {
        RestService::new(client, RestEndpoints::NOTIFICATIONS)
    }

    /// Push a notification to its audience.
    ///
    /// # Errors
    /// Returns `Error::Validation` before any request for an invalid draft.
    pub async fn send(&self, draft: &NotificationDraft) -> Result<Option<Notification>> {
        draft.validate()?;
        let value = self
            .client()
            .post(Endpoint::NotificationSend.template(), draft)
            .await?;
        info!("Sent notification {:?} to {:?}", draft.title, draft.audience);
        self.decode_written(value)
    }

    pub async fn mark_read(&self, notification_id: &str) -> Result<()> {
        let path = Endpoint::NotificationRead.with_id(&notification_id);
        let value = self.client().patch(&path, &json!({ "read": true })).await?;
        unwrap_envelope(value)?;
        Ok(())
    }
}
