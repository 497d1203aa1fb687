//! Branches and product categories.

use super::{Status, StatusCasing};
use crate::entity::{generate_id, NormalizeContext, Resource, Toggleable};
use crate::error::{Error, Result};
use crate::image::resolve_in_place;
use crate::storage::keys;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    #[serde(alias = "_id", default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default)]
    pub status: Status,
}

impl Resource for Branch {
    type Key = String;
    type Draft = Branch;

    fn key(&self) -> Self::Key {
        self.id.clone()
    }

    fn resource_name() -> &'static str {
        "branch"
    }

    fn collection_key() -> &'static str {
        "branches"
    }

    fn storage_key() -> &'static str {
        keys::BRANCHES
    }

    fn from_draft(draft: Branch, key: Option<String>) -> Branch {
        Branch {
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
        if self.name.trim().is_empty() {
            return Err(Error::Validation("branch name is required".to_string()));
        }
        Ok(())
    }
}

impl Toggleable for Branch {
    const STATUS_CASING: StatusCasing = StatusCasing::Lower;

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id", default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl Resource for Category {
    type Key = String;
    type Draft = Category;

    fn key(&self) -> Self::Key {
        self.id.clone()
    }

    fn resource_name() -> &'static str {
        "category"
    }

    fn collection_key() -> &'static str {
        "categories"
    }

    fn storage_key() -> &'static str {
        keys::CATEGORIES
    }

    fn from_draft(draft: Category, key: Option<String>) -> Category {
        Category {
            id: key.unwrap_or(draft.id.clone()),
            ..draft
        }
    }

    fn assign_key(&mut self, _existing: &[Self]) {
        if self.id.is_empty() {
            self.id = generate_id();
        }
    }

    fn normalize(mut self, ctx: &NormalizeContext) -> Self {
        resolve_in_place(&mut self.image, &ctx.backend_origin);
        self
    }
}
