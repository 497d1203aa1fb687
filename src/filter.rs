//! List filters and their cleaning rules.
//!
//! The dashboard uses the string `"all"` as its "no filter" sentinel. Before a
//! filter map reaches the backend, entries whose value is `"all"`, `""` or
//! null are removed; everything else passes through unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Sentinel meaning "do not filter on this key".
pub const ALL: &str = "all";

/// Ordered filter map sent as query parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(BTreeMap<String, Value>);

impl Filters {
    pub fn new() -> Self {
        Filters(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert an optional value; `None` is stored as null and cleaned away.
    pub fn with_opt<V: Into<Value>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        let value = value.map(Into::into).unwrap_or(Value::Null);
        self.with(key, value)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Copy without the "no filter" entries.
    pub fn cleaned(&self) -> Filters {
        Filters(
            self.0
                .iter()
                .filter(|(_, value)| !is_unset(value))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    /// Cleaned filters rendered as query pairs.
    ///
    /// Strings are sent verbatim, arrays as repeated keys, everything else in
    /// its JSON text form.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in self.cleaned().0 {
            match value {
                Value::Array(items) => {
                    for item in items {
                        pairs.push((key.clone(), scalar_text(&item)));
                    }
                }
                other => pairs.push((key, scalar_text(&other))),
            }
        }
        pairs
    }

    /// Stable serialized form of the cleaned filters.
    ///
    /// Stores refetch only when this value changes.
    pub fn fingerprint(&self) -> String {
        serde_json::to_string(&self.cleaned().0).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Filters(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Whether a filter value means "no filter".
pub fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty() || s == ALL,
        _ => false,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
