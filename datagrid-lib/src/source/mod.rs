//! Record sources.
//!
//! A [`RecordSource`] turns a [`Query`] into the full list of records the
//! endpoint returns for it. [`HttpSource`] talks to a JSON endpoint; tests
//! and embedders can provide their own implementation.

mod http;

pub use http::*;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FetchError;
use crate::model::Record;
use crate::query::Query;

/// Trait for anything that can produce records for a query.
///
/// Implementations return every record for the query; pagination, search
/// and sorting happen client-side afterwards.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetches all records matching the request parameters of `query`.
    async fn fetch_records(&self, query: &Query) -> Result<Vec<Record>, FetchError>;
}

/// Extracts records from an endpoint payload.
///
/// Accepts a bare JSON array or an object with a `data` array. An object
/// without `data` (or with `data: null`) yields no records. Anything else
/// is a shape error.
pub fn parse_payload(payload: Value) -> Result<Vec<Record>, FetchError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(FetchError::Shape(format!(
                    "`data` is {}, expected an array",
                    kind(&other)
                )));
            }
        },
        other => {
            return Err(FetchError::Shape(format!(
                "payload is {}, expected an array or an object",
                kind(&other)
            )));
        }
    };
    Ok(items.into_iter().map(Record::new).collect())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
