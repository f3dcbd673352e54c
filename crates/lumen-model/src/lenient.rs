//! Lenient field decoding.
//!
//! Design snapshots come from an editor, plugins, and older documents. A
//! field holding the wrong JSON shape must not fail the whole design, so
//! every raw property field is decoded through one of these helpers: a value
//! that cannot be interpreted becomes `None` (absent), and the normalizer
//! later substitutes the documented default.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode any `T`, mapping a mismatched value to `None`.
///
/// # Errors
///
/// Only fails if the underlying input is not valid JSON.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decode a finite number, accepting numeric strings (`"12.5"`).
///
/// # Errors
///
/// Only fails if the underlying input is not valid JSON.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

/// Decode a string, accepting numbers and booleans in their JSON spelling.
///
/// # Errors
///
/// Only fails if the underlying input is not valid JSON.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Decode a boolean, accepting `"true"`/`"false"` strings.
///
/// # Errors
///
/// Only fails if the underlying input is not valid JSON.
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => Some(b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    })
}

/// Decode a list, silently dropping entries that do not decode as `T`.
///
/// # Errors
///
/// Only fails if the underlying input is not valid JSON.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Interpret a JSON value as a finite number.
#[must_use]
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}
