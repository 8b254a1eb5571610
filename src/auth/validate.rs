use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ApiError;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Trimmed value, with blank strings treated as absent.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Required phone. Any non-blank value is accepted as the lookup key.
pub(crate) fn phone(value: Option<&str>, missing: &str) -> Result<String, ApiError> {
    present(value)
        .map(str::to_string)
        .ok_or_else(|| ApiError::validation(missing))
}

/// Passwords are taken verbatim; only emptiness is rejected.
pub(crate) fn secret<'a>(value: Option<&'a str>, missing: &str) -> Result<&'a str, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(missing))
}

/// Phone fields arrive as JSON strings or numbers. Other JSON types count
/// as missing.
pub(crate) fn phone_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
