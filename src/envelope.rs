//! Response envelope handling.
//!
//! The backend is not consistent about wrapping payloads: some routes answer
//! `{ "success": true, "data": ... }`, others return the payload bare, and
//! list routes may return an array or an object holding the array next to a
//! total. Everything is normalized here so services only see payloads.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Keys checked, in order, for the record array of a list response.
const LIST_KEYS: [&str; 4] = ["items", "results", "docs", "rows"];

/// Keys checked, in order, for the total count of a list response.
const TOTAL_KEYS: [&str; 3] = ["total", "count", "totalCount"];

/// Strip a `{ success, data }` envelope.
///
/// - `success: false` becomes `Error::Application` with the envelope's
///   `message` (or `error`).
/// - An object with a `data` field yields that field.
/// - Anything else is returned unchanged.
///
/// # Errors
/// Returns `Error::Application` for an explicit `success: false`.
pub fn unwrap_envelope(value: Value) -> Result<Value> {
    let Value::Object(mut map) = value else {
        return Ok(value);
    };

    if map.get("success").and_then(Value::as_bool) == Some(false) {
        let message = map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(Value::as_str)
            .unwrap_or("request was not successful")
            .to_string();
        return Err(Error::Application(message));
    }

    match map.remove("data") {
        Some(data) => Ok(data),
        None => Ok(Value::Object(map)),
    }
}

/// One page of records plus the backend's total.
#[derive(Clone, Debug, PartialEq)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> ListPage<T> {
    pub fn new(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        ListPage { items, total }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> ListPage<U> {
        ListPage {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

impl<T: DeserializeOwned> ListPage<T> {
    /// Decode a list response.
    ///
    /// Accepts a bare array, or an object holding the array under
    /// `collection` (e.g. `"customers"`) or one of the common list keys, with
    /// the total under `total`/`count`/`totalCount` or `pagination.total`.
    /// Without a total, the item count is used.
    ///
    /// Records that fail to decode are skipped with a warning; the rest of
    /// the page is kept.
    ///
    /// # Errors
    /// Returns `Error::Deserialization` when no array can be found.
    pub fn from_value(value: Value, collection: &str) -> Result<Self> {
        let value = unwrap_envelope(value)?;

        let (array, total) = match value {
            Value::Array(items) => (items, None),
            Value::Object(mut map) => {
                let total = TOTAL_KEYS
                    .iter()
                    .find_map(|k| map.get(*k).and_then(Value::as_u64))
                    .or_else(|| {
                        map.get("pagination")
                            .and_then(|p| p.get("total"))
                            .and_then(Value::as_u64)
                    });

                let key = std::iter::once(collection)
                    .chain(LIST_KEYS)
                    .find(|k| map.get(*k).is_some_and(Value::is_array));

                match key.and_then(|k| map.remove(k)) {
                    Some(Value::Array(items)) => (items, total),
                    _ => {
                        return Err(Error::Deserialization(format!(
                            "list response for {} has no record array",
                            collection
                        )))
                    }
                }
            }
            Value::Null => (Vec::new(), None),
            other => {
                return Err(Error::Deserialization(format!(
                    "unexpected list response for {}: {}",
                    collection, other
                )))
            }
        };

        let mut items = Vec::with_capacity(array.len());
        for record in array {
            match serde_json::from_value(record) {
                Ok(item) => items.push(item),
                Err(e) => warn!("Skipping undecodable {} record: {}", collection, e),
            }
        }
        let total = total.unwrap_or(items.len() as u64);

        Ok(ListPage { items, total })
    }
}

/// Decode a single-record response, unwrapping an envelope and an optional
/// named wrapper (`{ "customer": { ... } }`).
///
/// # Errors
/// Returns `Error::Deserialization` when the payload does not decode.
pub fn decode_record<T: DeserializeOwned>(value: Value, wrapper: &str) -> Result<T> {
    let mut value = unwrap_envelope(value)?;
    if let Value::Object(map) = &mut value {
        if let Some(inner) = map.remove(wrapper).filter(Value::is_object) {
            return Ok(serde_json::from_value(inner)?);
        }
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: String,
    }

    #[test]
    fn test_unwrap_envelope_variants() {
        assert_eq!(
            unwrap_envelope(json!({"success": true, "data": [1]})).unwrap(),
            json!([1])
        );
        assert_eq!(unwrap_envelope(json!([1, 2])).unwrap(), json!([1, 2]));
        assert_eq!(
            unwrap_envelope(json!({"id": "x"})).unwrap(),
            json!({"id": "x"})
        );
    }

    #[test]
    fn test_success_false_is_application_error() {
        let err = unwrap_envelope(json!({"success": false, "message": "Code expired"}))
            .unwrap_err();
        assert!(matches!(err, Error::Application(ref m) if m == "Code expired"));
    }

    #[test]
    fn test_list_from_bare_array() {
        let page: ListPage<Row> = ListPage::from_value(json!([{"id": "a"}, {"id": "b"}]), "rows")
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[1], Row { id: "b".into() });
    }

    #[test]
    fn test_list_from_named_collection_with_total() {
        let body = json!({
            "success": true,
            "data": {"customers": [{"id": "c1"}], "pagination": {"total": 41}}
        });
        let page: ListPage<Row> = ListPage::from_value(body, "customers").unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 41);
    }

    #[test]
    fn test_list_from_generic_key() {
        let page: ListPage<Row> =
            ListPage::from_value(json!({"items": [{"id": "z"}], "total": 9}), "orders").unwrap();
        assert_eq!(page.total, 9);
    }

    #[test]
    fn test_undecodable_record_is_skipped() {
        let page: ListPage<Row> =
            ListPage::from_value(json!([{"id": "a"}, {"id": 7}, {"id": "c"}]), "rows").unwrap();
        assert_eq!(page.items, vec![Row { id: "a".into() }, Row { id: "c".into() }]);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_list_without_array_fails() {
        let err = ListPage::<Row>::from_value(json!({"total": 3}), "orders").unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }

    #[test]
    fn test_decode_record_with_wrapper() {
        let row: Row = decode_record(json!({"data": {"product": {"id": "p1"}}}), "product")
            .unwrap();
        assert_eq!(row.id, "p1");

        let row: Row = decode_record(json!({"id": "p2"}), "product").unwrap();
        assert_eq!(row.id, "p2");
    }
}
