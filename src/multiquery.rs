//! FQL multiquery response reshaping.
//!
//! `fql.multiquery` answers with one envelope per query:
//!
//! ```json
//! [{"name": "friends", "fql_result_set": [...]}, {"name": "pages", "fql_result_set": {}}]
//! ```
//!
//! which is reshaped into `{"friends": [...], "pages": []}`. Empty result sets
//! arrive as `{}` and are normalized to `[]`.

use std::collections::BTreeMap;
use std::fmt::Debug;

use serde_json::{Map, Value};

use crate::error::{FacebookError, Result};

const NAME_ATTRIBUTE_NAME: &str = "name";
const RESULT_SET_ATTRIBUTE_NAME: &str = "fql_result_set";
const METRIC_ATTRIBUTE_NAME: &str = "metric";
const VALUE_ATTRIBUTE_NAME: &str = "value";

/// Serializes the name → FQL mapping into the `queries` parameter value.
pub fn queries_to_json<I, K, Q>(queries: I) -> Result<String>
where
    I: IntoIterator<Item = (K, Q)>,
    K: Into<String>,
    Q: Into<String>,
{
    let mut object = Map::new();
    for (name, query) in queries {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FacebookError::configuration("Query names cannot be blank"));
        }
        if object.insert(name.clone(), Value::String(query.into())).is_some() {
            return Err(FacebookError::configuration(format!(
                "Query name '{name}' was supplied more than once"
            )));
        }
    }

    if object.is_empty() {
        return Err(FacebookError::configuration(
            "At least one query is required",
        ));
    }

    Ok(Value::Object(object).to_string())
}

/// Reshapes a multiquery response body into a map of query name → result
/// array.
///
/// Accepts the wire envelope list as well as an already name-keyed object.
pub fn reshape(body: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        FacebookError::json_mapping(format!("Unable to process fql.multiquery JSON response: {e}"))
    })?;

    match value {
        Value::Array(envelopes) => reshape_envelopes(envelopes),
        Value::Object(named) => named
            .into_iter()
            .map(|(name, results)| normalize_result_set(&name, results).map(|results| (name, results)))
            .collect(),
        other => Err(FacebookError::json_mapping(format!(
            "Unable to process fql.multiquery JSON response: unexpected {other}"
        ))),
    }
}

fn reshape_envelopes(envelopes: Vec<Value>) -> Result<Map<String, Value>> {
    let mut reshaped = Map::new();

    for envelope in envelopes {
        let mut envelope = match envelope {
            Value::Object(envelope) => envelope,
            other => {
                return Err(FacebookError::json_mapping(format!(
                    "Unable to process fql.multiquery JSON response: envelope is not an object: {other}"
                )));
            }
        };

        let name = match envelope.remove(NAME_ATTRIBUTE_NAME) {
            Some(Value::String(name)) => name,
            other => {
                return Err(FacebookError::json_mapping(format!(
                    "Unable to process fql.multiquery JSON response: envelope has no '{}' string (found {:?})",
                    NAME_ATTRIBUTE_NAME, other
                )));
            }
        };

        let results = envelope.remove(RESULT_SET_ATTRIBUTE_NAME).ok_or_else(|| {
            FacebookError::json_mapping(format!(
                "Unable to process fql.multiquery JSON response: query '{name}' has no '{RESULT_SET_ATTRIBUTE_NAME}'"
            ))
        })?;
        let results = normalize_result_set(&name, results)?;

        if reshaped.insert(name.clone(), results).is_some() {
            return Err(FacebookError::json_mapping(format!(
                "fql.multiquery response contains query '{name}' twice"
            )));
        }
    }

    Ok(reshaped)
}

fn normalize_result_set(name: &str, results: Value) -> Result<Value> {
    match results {
        Value::Array(_) => Ok(results),
        Value::Null => Ok(Value::Array(Vec::new())),
        Value::Object(object) if object.is_empty() => Ok(Value::Array(Vec::new())),
        other => Err(FacebookError::json_mapping(format!(
            "fql.multiquery result for query '{name}' is not an array: {other}"
        ))),
    }
}

/// Splits per-key `[{"metric": ..., "value": ...}]` rows into
/// metric → key → value.
///
/// A metric appearing twice for the same key is a protocol violation and
/// fails rather than keeping either value.
pub fn decompose_by_metric<K>(
    rows_by_key: &BTreeMap<K, Vec<Value>>,
) -> Result<BTreeMap<String, BTreeMap<K, Value>>>
where
    K: Ord + Clone + Debug,
{
    let mut by_metric: BTreeMap<String, BTreeMap<K, Value>> = BTreeMap::new();

    for (key, rows) in rows_by_key {
        for row in rows {
            let Value::Object(row_object) = row else {
                return Err(FacebookError::json_mapping(format!(
                    "Could not decode metric result {row}: not an object"
                )));
            };
            let metric = row_object
                .get(METRIC_ATTRIBUTE_NAME)
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    FacebookError::json_mapping(format!(
                        "Could not decode metric result {row}: missing '{METRIC_ATTRIBUTE_NAME}'"
                    ))
                })?;
            let value = row_object.get(VALUE_ATTRIBUTE_NAME).ok_or_else(|| {
                FacebookError::json_mapping(format!(
                    "Could not decode metric result {row}: missing '{VALUE_ATTRIBUTE_NAME}'"
                ))
            })?;

            let by_key = by_metric.entry(metric.to_string()).or_default();
            if by_key.insert(key.clone(), value.clone()).is_some() {
                return Err(FacebookError::json_mapping(format!(
                    "Multiquery response has two results for metric '{metric}' and key {key:?}"
                )));
            }
        }
    }

    Ok(by_metric)
}
