//! Core traits implemented by every backend-managed record.

use crate::error::Result;
use crate::model::{Status, StatusCasing};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::hash::Hash;

/// Context applied to records after they are decoded.
#[derive(Clone, Debug, Default)]
pub struct NormalizeContext {
    /// Backend origin used to absolutize relative image paths.
    pub backend_origin: String,
}

impl NormalizeContext {
    pub fn new(backend_origin: impl Into<String>) -> Self {
        NormalizeContext {
            backend_origin: backend_origin.into(),
        }
    }
}

/// Trait that all backend-managed records implement.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use dynasty_admin::Resource;
///
/// #[derive(Clone, Serialize, Deserialize)]
/// pub struct Route {
///     pub id: String,
///     pub name: String,
/// }
///
/// impl Resource for Route {
///     type Key = String;
///     type Draft = Route;
///
///     fn key(&self) -> Self::Key {
///         self.id.clone()
///     }
///
///     fn resource_name() -> &'static str {
///         "route"
///     }
///
///     fn collection_key() -> &'static str {
///         "routes"
///     }
///
///     fn storage_key() -> &'static str {
///         "routes"
///     }
///
///     fn from_draft(draft: Route, _key: Option<String>) -> Route {
///         draft
///     }
/// }
/// ```
pub trait Resource: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Record identifier.
    type Key: Display + Clone + Send + Sync + Eq + Hash + 'static;

    /// Payload accepted by create/update. Most records use themselves.
    type Draft: Clone + Send + Sync + Serialize + 'static;

    /// Return the record's identifier.
    fn key(&self) -> Self::Key;

    /// Singular name, used in logs and error messages.
    fn resource_name() -> &'static str;

    /// Field name the backend wraps lists in.
    fn collection_key() -> &'static str;

    /// Local storage key holding the fallback collection.
    fn storage_key() -> &'static str;

    /// Build a record from a draft, for the local data source.
    fn from_draft(draft: Self::Draft, key: Option<Self::Key>) -> Self;

    /// Assign an identifier to a record created locally.
    ///
    /// `existing` is the current local collection. Default: leave as is.
    fn assign_key(&mut self, _existing: &[Self]) {}

    /// Rewrite backend-shaped fields into the UI shape (image URLs, ...).
    fn normalize(self, _ctx: &NormalizeContext) -> Self {
        self
    }

    /// Optional: Validate a record before it is stored locally.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Records with a two-state status that can be flipped optimistically.
pub trait Toggleable: Resource {
    /// Casing the backend expects when this record's status is written.
    const STATUS_CASING: StatusCasing;

    fn status(&self) -> Status;

    fn set_status(&mut self, status: Status);
}

/// Fresh identifier for records created while offline.
pub(crate) fn generate_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Clone, Serialize, Deserialize)]
    struct TestRecord {
        id: String,
        status: Status,
    }

    impl Resource for TestRecord {
        type Key = String;
        type Draft = TestRecord;

        fn key(&self) -> Self::Key {
            self.id.clone()
        }

        fn resource_name() -> &'static str {
            "test"
        }

        fn collection_key() -> &'static str {
            "tests"
        }

        fn storage_key() -> &'static str {
            "tests"
        }

        fn from_draft(draft: TestRecord, key: Option<String>) -> TestRecord {
            TestRecord {
                id: key.unwrap_or(draft.id),
                ..draft
            }
        }
    }

    impl Toggleable for TestRecord {
        const STATUS_CASING: StatusCasing = StatusCasing::Lower;

        fn status(&self) -> Status {
            self.status
        }

        fn set_status(&mut self, status: Status) {
            self.status = status;
        }
    }

    #[test]
    fn test_from_draft_uses_key() {
        let draft = TestRecord {
            id: String::new(),
            status: Status::Active,
        };
        let record = TestRecord::from_draft(draft, Some("t1".to_string()));
        assert_eq!(record.key(), "t1");
        assert_eq!(TestRecord::collection_key(), "tests");
    }

    #[test]
    fn test_toggle_status() {
        let mut record = TestRecord {
            id: "t1".to_string(),
            status: Status::Active,
        };
        record.set_status(record.status().toggled());
        assert_eq!(record.status(), Status::Inactive);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(generate_id(), generate_id());
    }
}
