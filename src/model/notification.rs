//! Push notifications sent to customers and staff.

use crate::entity::{generate_id, Resource};
use crate::error::{Error, Result};
use crate::storage::keys;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who a notification is delivered to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Audience {
    #[default]
    #[serde(alias = "All")]
    All,
    #[serde(alias = "Customers")]
    Customers,
    #[serde(alias = "staff", alias = "DeliveryStaff")]
    DeliveryStaff,
    #[serde(alias = "Members")]
    Members,
    /// Explicit recipient ids.
    Users(Vec<String>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(alias = "_id", default)]
    pub id: String,
    pub title: String,
    #[serde(default, alias = "body")]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, alias = "target")]
    pub audience: Audience,
    #[serde(default, alias = "isRead")]
    pub read: bool,
    #[serde(default, alias = "createdAt")]
    pub sent_at: Option<DateTime<Utc>>,
}

/// Payload for composing or sending a notification.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDraft {
    pub title: String,
    pub message: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub audience: Audience,
}

impl NotificationDraft {
    pub fn new(title: impl Into<String>, message: impl Into<String>, audience: Audience) -> Self {
        NotificationDraft {
            title: title.into(),
            message: message.into(),
            kind: None,
            audience,
        }
    }

    /// # Errors
    /// Returns `Error::Validation` for a blank title or message, or an empty
    /// explicit recipient list.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() || self.message.trim().is_empty() {
            return Err(Error::Validation(
                "notification title and message are required".to_string(),
            ));
        }
        if matches!(&self.audience, Audience::Users(ids) if ids.is_empty()) {
            return Err(Error::Validation("no recipients selected".to_string()));
        }
        Ok(())
    }
}

impl Resource for Notification {
    type Key = String;
    type Draft = NotificationDraft;

    fn key(&self) -> Self::Key {
        self.id.clone()
    }

    fn resource_name() -> &'static str {
        "notification"
    }

    fn collection_key() -> &'static str {
        "notifications"
    }

    fn storage_key() -> &'static str {
        keys::NOTIFICATIONS
    }

    fn from_draft(draft: NotificationDraft, key: Option<String>) -> Notification {
        Notification {
            id: key.unwrap_or_default(),
            title: draft.title,
            message: draft.message,
            kind: draft.kind,
            audience: draft.audience,
            read: false,
            sent_at: None,
        }
    }

    fn assign_key(&mut self, _existing: &[Self]) {
        if self.id.is_empty() {
            self.id = generate_id();
        }
        if self.sent_at.is_none() {
            self.sent_at = Some(Utc::now());
        }
    }

    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("notification title is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_audience_wire_forms() {
        assert_eq!(serde_json::to_value(Audience::DeliveryStaff).unwrap(), json!("deliveryStaff"));
        assert_eq!(
            serde_json::to_value(Audience::Users(vec!["c1".into()])).unwrap(),
            json!({"users": ["c1"]})
        );
        let audience: Audience = serde_json::from_value(json!("All")).unwrap();
        assert_eq!(audience, Audience::All);
    }

    #[test]
    fn test_draft_validation() {
        assert!(NotificationDraft::new("Offer", "", Audience::All).validate().is_err());
        assert!(NotificationDraft::new("Offer", "10% off", Audience::Users(vec![]))
            .validate()
            .is_err());
        assert!(NotificationDraft::new("Offer", "10% off", Audience::Customers)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_reads_backend_aliases() {
        let n: Notification = serde_json::from_value(json!({
            "_id": "n1",
            "title": "Delivery delayed",
            "body": "Rain in sector 4",
            "isRead": true,
            "createdAt": "2026-03-01T06:30:00Z"
        }))
        .unwrap();
        assert!(n.read);
        assert_eq!(n.message, "Rain in sector 4");
        assert!(n.sent_at.is_some());
    }
}
