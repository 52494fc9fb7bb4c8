//! Filter values and filter state.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::model::Record;
use crate::model::contains_ignore_case;
use crate::model::field_string;

/// A scalar filter value as entered in the filter panel.
///
/// Serialized untagged so persisted filters read as plain JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl FilterValue {
    /// Returns `true` if this value restricts results.
    ///
    /// Empty strings, `false`, zero and `NaN`-like numbers leave the filter
    /// unapplied.
    pub fn is_active(&self) -> bool {
        match self {
            FilterValue::Bool(b) => *b,
            FilterValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            FilterValue::Text(s) => !s.is_empty(),
        }
    }

    /// Returns `true` if the value is an empty string.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, FilterValue::Text(s) if s.is_empty())
    }

    /// Tests a record field against this value (case-insensitive substring).
    pub fn matches(&self, record: &Record, key: &str) -> bool {
        contains_ignore_case(&field_string(record.get(key)), &self.to_string())
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::Number(n) => {
                write!(f, "{}", crate::model::display_string(&serde_json::Value::Number(n.clone())))
            }
            FilterValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value.into())
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Number(value.into())
    }
}

/// Filter values keyed by filter key.
///
/// Keys iterate in sorted order so request parameters and persisted JSON
/// are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    values: BTreeMap<String, FilterValue>,
}

impl FilterState {
    /// Creates an empty filter state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one filter value, replacing any previous value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: FilterValue) {
        self.values.insert(key.into(), value);
    }

    /// Returns the value for a key.
    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.values.get(key)
    }

    /// Iterates over every stored value, active or not.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over the values that restrict results.
    pub fn active(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.iter().filter(|(_, v)| v.is_active())
    }

    /// Number of values that are not empty strings.
    ///
    /// This is the count shown on the filter toggle badge.
    pub fn non_empty_count(&self) -> usize {
        self.values.values().filter(|v| !v.is_empty_text()).count()
    }

    /// Keeps only the keys accepted by `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.values.retain(|k, _| keep(k));
    }

    /// Returns `true` if no value is stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Tests a record against every active filter.
    pub fn matches(&self, record: &Record) -> bool {
        self.active().all(|(key, value)| value.matches(record, key))
    }
}

impl<K: Into<String>> FromIterator<(K, FilterValue)> for FilterState {
    fn from_iter<I: IntoIterator<Item = (K, FilterValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
