//! JSON-to-Rust mapping for Facebook responses.
//!
//! Field bindings are declared with `serde` attributes on the target types:
//! `#[serde(rename = "...")]` for alternate JSON keys, `Option` fields plus
//! `#[serde(default)]` for keys Facebook omits, and the `deserialize_with`
//! helpers below for dates and `{"data": [...]}`-wrapped collections.
//! Mapping errors name the JSON path of the offending field.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{FacebookError, Result};

/// Long date form used by the Graph API, e.g. `2010-02-28T16:11:08+0000`.
pub const FACEBOOK_LONG_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

pub struct JsonMapper;

impl JsonMapper {
    /// Maps a JSON document to a single `T`.
    pub fn to_object<T: DeserializeOwned>(json: &str) -> Result<T> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let object = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|e| Self::mapping_error::<T>(e.path().to_string(), e.inner()))?;
        deserializer
            .end()
            .map_err(|e| Self::mapping_error::<T>(String::new(), &e))?;
        Ok(object)
    }

    /// Maps a JSON array to a list of `T`.
    ///
    /// Facebook answers an empty FQL result with `{}` rather than `[]`, and
    /// some calls return a lone object where a list is expected; both are
    /// accepted.
    pub fn to_list<T: DeserializeOwned>(json: &str) -> Result<Vec<T>> {
        let value: Value = serde_json::from_str(json).map_err(|e| {
            FacebookError::json_mapping(format!("Unable to parse JSON list: {e}"))
        })?;

        match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    Self::from_value(item).map_err(|e| e.with_context(&format!("element [{index}]")))
                })
                .collect(),
            Value::Object(object) if object.is_empty() => Ok(Vec::new()),
            object @ Value::Object(_) => Ok(vec![Self::from_value(object)?]),
            other => Err(FacebookError::json_mapping(format!(
                "Expected a JSON array but found: {other}"
            ))),
        }
    }

    /// Maps an already-parsed JSON value to `T`.
    pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
        serde_path_to_error::deserialize(value)
            .map_err(|e| Self::mapping_error::<T>(e.path().to_string(), e.inner()))
    }

    fn mapping_error<T>(path: String, err: &serde_json::Error) -> FacebookError {
        let target = std::any::type_name::<T>();
        if path.is_empty() || path == "." {
            FacebookError::json_mapping(format!("Unable to map JSON to {target}: {err}"))
        } else {
            FacebookError::json_mapping(format!(
                "Unable to map JSON to {target} at field '{path}': {err}"
            ))
        }
    }
}

/// Parses a Facebook date: the long ISO form with numeric offset, or epoch
/// seconds (FQL's short form).
pub fn parse_facebook_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw
            .parse::<i64>()
            .ok()
            .and_then(|seconds| Utc.timestamp_opt(seconds, 0).single());
    }

    DateTime::parse_from_str(raw, FACEBOOK_LONG_DATE_FORMAT)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// `deserialize_with` helper for optional date fields.
pub fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_i64()
            .and_then(|seconds| Utc.timestamp_opt(seconds, 0).single())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("unable to parse date '{number}'"))),
        Some(Value::String(raw)) => parse_facebook_date(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("unable to parse date '{raw}'"))),
        Some(other) => Err(D::Error::custom(format!("unable to parse date '{other}'"))),
    }
}

/// `deserialize_with` helper for collection fields that Facebook sends either
/// as a bare array or wrapped as `{"data": [...]}`.
pub fn deserialize_data_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(Value::Object(mut object)) => match object.remove("data") {
            Some(Value::Array(items)) => items,
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "expected 'data' to be an array but found: {other}"
                )));
            }
        },
        Some(other) => {
            return Err(D::Error::custom(format!(
                "expected an array or a {{\"data\": [...]}} object but found: {other}"
            )));
        }
    };

    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
        .collect()
}
