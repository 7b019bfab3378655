//! Reflection inference from sample JSON documents.
//!
//! Used when snapshots are reconstructed from existing data rather than from
//! a hand-written schema: each sample document becomes one reflection list,
//! with kinds derived from the sample values.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::{PrimitiveKind, UnitReflection};

/// Sample inference errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferError {
    /// The top-level sample is not a JSON object.
    #[error("sample document must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Infers a reflection list from a JSON object, in document order.
///
/// Strings that parse as RFC 3339 timestamps or `YYYY-MM-DD` dates become
/// `date`; arrays are reported as `unknown` since their element type cannot
/// be expressed by a primitive kind. Every inferred unit is required.
///
/// # Errors
///
/// Returns [`InferError::NotAnObject`] when `sample` is not an object.
///
/// # Examples
///
/// ```
/// use schema_snapshot_core::*;
///
/// let sample = serde_json::json!({
///     "name": "Ada",
///     "born": "1815-12-10",
///     "meta": { "score": 9.5 }
/// });
/// let units = infer_units(&sample).unwrap();
///
/// assert_eq!(units[0], UnitReflection::primitive("name", PrimitiveKind::String));
/// assert_eq!(units[1], UnitReflection::primitive("born", PrimitiveKind::Date));
/// assert!(units[2].is_recursive());
/// ```
pub fn infer_units(sample: &Value) -> Result<Vec<UnitReflection>, InferError> {
    match sample {
        Value::Object(map) => Ok(infer_object(map)),
        other => Err(InferError::NotAnObject(value_kind(other))),
    }
}

fn infer_object(map: &Map<String, Value>) -> Vec<UnitReflection> {
    map.iter()
        .map(|(key, value)| match value {
            Value::Object(inner) => UnitReflection::recursive(key, infer_object(inner)),
            other => UnitReflection::primitive(key, infer_kind(other)),
        })
        .collect()
}

fn infer_kind(value: &Value) -> PrimitiveKind {
    match value {
        Value::Null => PrimitiveKind::Null,
        Value::Bool(_) => PrimitiveKind::Boolean,
        Value::Number(_) => PrimitiveKind::Number,
        Value::String(s) if looks_like_date(s) => PrimitiveKind::Date,
        Value::String(_) => PrimitiveKind::String,
        Value::Array(_) => PrimitiveKind::Unknown,
        Value::Object(_) => PrimitiveKind::Object,
    }
}

fn looks_like_date(s: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(s).is_ok()
        || chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
