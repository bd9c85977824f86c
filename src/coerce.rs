//! Text and JSON to number coercion shared by the loaders.
//!
//! Missing markers (`""`, `N/A`) become `None`. Anything else that does not parse is an
//! error: a malformed number is never silently dropped.

use crate::error::SyncError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const NOT_AVAILABLE: &str = "N/A";

#[must_use]
pub fn is_missing(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed == NOT_AVAILABLE
}

/// Removes the decoration the stats feeds put around numbers: percent signs, thousands
/// separators and quote characters.
#[must_use]
pub fn strip_numeric_noise(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '%' | ',' | '"'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// # Errors
///
/// Returns `SyncError::Coercion` when `raw` is neither missing nor a number.
pub fn text_to_f64(field: &str, raw: &str) -> Result<Option<f64>, SyncError> {
    let cleaned = strip_numeric_noise(raw);
    if is_missing(&cleaned) {
        return Ok(None);
    }
    cleaned
        .parse::<f64>()
        .map(Some)
        .map_err(|_| SyncError::coercion(field, raw))
}

/// Integer coercion. Whole floats such as `"2025.0"` are accepted.
///
/// # Errors
///
/// Returns `SyncError::Coercion` when `raw` is neither missing nor an integer.
pub fn text_to_i64(field: &str, raw: &str) -> Result<Option<i64>, SyncError> {
    let cleaned = strip_numeric_noise(raw);
    if is_missing(&cleaned) {
        return Ok(None);
    }
    if let Ok(value) = cleaned.parse::<i64>() {
        return Ok(Some(value));
    }
    match cleaned.parse::<f64>() {
        #[allow(clippy::cast_possible_truncation)]
        Ok(value) if value.fract() == 0.0 && value.is_finite() => Ok(Some(value as i64)),
        _ => Err(SyncError::coercion(field, raw)),
    }
}

/// # Errors
///
/// Returns `SyncError::Coercion` for strings that are not numbers and for arrays or objects.
pub fn json_to_f64(field: &str, value: &Value) -> Result<Option<f64>, SyncError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => text_to_f64(field, s),
        other => Err(SyncError::coercion(field, &other.to_string())),
    }
}

/// # Errors
///
/// Returns `SyncError::Coercion` for values that are not whole numbers.
pub fn json_to_i64(field: &str, value: &Value) -> Result<Option<i64>, SyncError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => match n.as_i64() {
            Some(v) => Ok(Some(v)),
            None => text_to_i64(field, &n.to_string()),
        },
        Value::String(s) => text_to_i64(field, s),
        other => Err(SyncError::coercion(field, &other.to_string())),
    }
}

/// Renders a scalar JSON value as the text the CSV export writes.
#[must_use]
pub fn json_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(json_to_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

/// `deserialize_with` helpers for feed fields that arrive as numbers, numeric strings or `N/A`.
pub mod lenient {
    use super::{Deserialize, Deserializer, Value, json_to_f64, json_to_i64};

    /// # Errors
    ///
    /// Fails on strings that are neither missing markers nor numbers.
    pub fn f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
        json_to_f64("value", &value).map_err(serde::de::Error::custom)
    }

    /// # Errors
    ///
    /// Fails on values that are not whole numbers or missing markers.
    pub fn i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
        json_to_i64("value", &value).map_err(serde::de::Error::custom)
    }

    /// Text fields where the feeds use `N/A` for "no value".
    ///
    /// # Errors
    ///
    /// Never fails for scalar input.
    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
        Ok(super::json_to_text(&value).filter(|s| !super::is_missing(s)))
    }
}
