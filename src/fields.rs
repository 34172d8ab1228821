use rusqlite::types::Value;
use serde::{de, Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

use crate::errors::JoblyError;

/// Tells an explicit `null` apart from a missing field: pair it with
/// `#[serde(default)]` on an `Option<Option<T>>` field and `null` becomes
/// `Some(None)` while a missing field stays `None`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Reads a query string value, treating `key=` the same as a missing key.
pub fn empty_as_none<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: FromStr,
    T::Err: Display,
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.is_empty() => raw.parse().map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

pub fn require_text(field: &str, value: &str) -> Result<(), JoblyError> {
    if value.trim().is_empty() {
        return Err(JoblyError::invalid_request(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}

pub fn require_non_negative(field: &str, value: Option<i64>) -> Result<(), JoblyError> {
    match value {
        Some(number) if number < 0 => Err(JoblyError::invalid_request(format!(
            "{} must be greater than or equal to 0",
            field
        ))),
        _ => Ok(()),
    }
}

pub fn require_fraction(field: &str, value: Option<f64>) -> Result<(), JoblyError> {
    match value {
        Some(number) if !(0.0..=1.0).contains(&number) => Err(JoblyError::invalid_request(
            format!("{} must be between 0 and 1", field),
        )),
        _ => Ok(()),
    }
}

pub fn text(value: &str) -> Value {
    Value::Text(value.to_owned())
}

pub fn optional_text(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::Text)
}

pub fn optional_integer(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}

pub fn optional_real(value: Option<f64>) -> Value {
    value.map_or(Value::Null, Value::Real)
}
