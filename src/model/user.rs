//! Admin panel users.

use super::{Status, StatusCasing};
use crate::entity::{generate_id, Resource, Toggleable};
use crate::error::{Error, Result};
use crate::storage::keys;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id", default)]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default, alias = "lastLoginAt")]
    pub last_login: Option<String>,
}

fn default_role() -> String {
    "staff".to_string()
}

impl Resource for User {
    type Key = String;
    type Draft = User;

    fn key(&self) -> Self::Key {
        self.id.clone()
    }

    fn resource_name() -> &'static str {
        "user"
    }

    fn collection_key() -> &'static str {
        "users"
    }

    fn storage_key() -> &'static str {
        keys::USERS
    }

    fn from_draft(draft: User, key: Option<String>) -> User {
        User {
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
        if !self.email.contains('@') {
            return Err(Error::Validation(format!("invalid email: {:?}", self.email)));
        }
        Ok(())
    }
}

impl Toggleable for User {
    const STATUS_CASING: StatusCasing = StatusCasing::Lower;

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}
