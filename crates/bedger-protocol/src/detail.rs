//! Free-form event details.
//!
//! Details are restricted to values with a lossless JSON representation:
//! null, booleans, numbers, strings, and lists or string-keyed maps of
//! the same. Validation walks the tree explicitly instead of relying on
//! a serializer to reject bad input.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

use crate::error::{ValidationError, ValidationResult};

/// Details payload of a message, keyed by field name.
pub type Details = BTreeMap<String, DetailValue>;

/// A single value inside [`Details`].
#[derive(Debug, Clone, PartialEq)]
pub enum DetailValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    /// Must be finite to pass validation
    Float(f64),
    String(String),
    List(Vec<DetailValue>),
    Map(BTreeMap<String, DetailValue>),
}

impl DetailValue {
    /// Short name of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) | Self::UInt(_) | Self::Float(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

/// Validates a details payload and converts it into a JSON object.
///
/// Map keys keep their sorted order so the encoding is deterministic.
pub(crate) fn validate_details(details: Details) -> ValidationResult<Map<String, Value>> {
    details
        .into_iter()
        .map(|(key, value)| {
            let path = format!("details.{key}");
            to_json(value, &path).map(|json| (key, json))
        })
        .collect()
}

fn to_json(value: DetailValue, path: &str) -> ValidationResult<Value> {
    let json = match value {
        DetailValue::Null => Value::Null,
        DetailValue::Bool(b) => Value::Bool(b),
        DetailValue::Int(n) => Value::from(n),
        DetailValue::UInt(n) => Value::from(n),
        DetailValue::Float(f) => Number::from_f64(f).map(Value::Number).ok_or_else(|| {
            ValidationError::NonFiniteNumber {
                path: path.to_string(),
            }
        })?,
        DetailValue::String(s) => Value::String(s),
        DetailValue::List(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| to_json(item, &format!("{path}[{index}]")))
                .collect::<ValidationResult<Vec<_>>>()?,
        ),
        DetailValue::Map(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(key, item)| {
                    let child = format!("{path}.{key}");
                    to_json(item, &child).map(|json| (key, json))
                })
                .collect::<ValidationResult<Map<_, _>>>()?,
        ),
    };
    Ok(json)
}

/// Converts a JSON object into [`Details`].
///
/// Fails with [`ValidationError::DetailsNotObject`] for any other JSON kind.
pub fn details_from_json(value: Value) -> ValidationResult<Details> {
    match value {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| (key, DetailValue::from(value)))
            .collect()),
        other => Err(ValidationError::DetailsNotObject {
            kind: DetailValue::from(other).kind(),
        }),
    }
}

impl From<Value> for DetailValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt(u)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for DetailValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for DetailValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for DetailValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for DetailValue {
    fn from(value: u32) -> Self {
        Self::UInt(u64::from(value))
    }
}

impl From<u64> for DetailValue {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<f64> for DetailValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for DetailValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<DetailValue>> From<Vec<T>> for DetailValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<DetailValue>> From<BTreeMap<String, T>> for DetailValue {
    fn from(entries: BTreeMap<String, T>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key, value.into()))
                .collect(),
        )
    }
}

impl<T: Into<DetailValue>> From<Option<T>> for DetailValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
