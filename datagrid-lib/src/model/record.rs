//! Dynamic endpoint record

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::display_string;

/// One item returned by the remote endpoint.
///
/// Records are kept as raw JSON so the client-side pipeline can read any
/// field by name. Hosts that have a typed item can convert with
/// [`Record::deserialize_into`].
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Record;
/// use serde_json::json;
///
/// let record = Record::new(json!({ "id": 1, "name": "Ann" }));
/// assert_eq!(record.get("name"), Some(&json!("Ann")));
/// assert_eq!(record.id_string().as_deref(), Some("1"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Value);

impl Record {
    /// Wraps a JSON value as a record.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the value of a field, if the record is an object and has it.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.as_object().and_then(|map| map.get(field))
    }

    /// Returns the conventional `id` field.
    pub fn id(&self) -> Option<&Value> {
        self.get("id")
    }

    /// Returns the `id` field as a string, skipping a null or missing id.
    pub fn id_string(&self) -> Option<String> {
        match self.id()? {
            Value::Null => None,
            id => Some(display_string(id)),
        }
    }

    /// Returns the record's own values in field order.
    ///
    /// Objects yield their field values and arrays their elements. Scalars
    /// have no enumerable values.
    pub fn values(&self) -> Vec<&Value> {
        match &self.0 {
            Value::Object(map) => map.values().collect(),
            Value::Array(items) => items.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Returns a reference to the underlying JSON.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Deserializes the record into a host-defined item type.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.0)
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
