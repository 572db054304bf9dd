//! Response classification for Facebook API calls
//!
//! Facebook reports failures inconsistently: sometimes as a 200 whose body is
//! an error object, sometimes as a 400/401/500 carrying one, sometimes as a
//! bare status. Every response passes through [`ResponseClassifier`] before
//! its body reaches the mapper.

use crate::{
    error::{FacebookError, Result},
    transport::TransportResponse,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

const LEGACY_ERROR_CODE_ATTRIBUTE_NAME: &str = "error_code";
const LEGACY_ERROR_MSG_ATTRIBUTE_NAME: &str = "error_msg";
const ERROR_ATTRIBUTE_NAME: &str = "error";
const ERROR_TYPE_ATTRIBUTE_NAME: &str = "type";
const ERROR_MESSAGE_ATTRIBUTE_NAME: &str = "message";

/// Statuses whose bodies may carry a machine-readable error.
const RECOGNIZED_STATUSES: [u16; 4] = [200, 400, 401, 500];

pub struct ResponseClassifier;

impl ResponseClassifier {
    /// Returns the body of a successful response, or the typed failure it
    /// encodes.
    pub fn classify(response: TransportResponse) -> Result<String> {
        let TransportResponse { status, body } = response;
        debug!(status, body_len = body.len(), "Facebook responded");

        if !RECOGNIZED_STATUSES.contains(&status) {
            return Err(FacebookError::network_status(
                status,
                "Facebook request failed",
            ));
        }

        if let Some(error) = Self::embedded_error(&body)? {
            warn!(status, %error, "Facebook returned an error response");
            return Err(error);
        }

        // A 401 or 500 without an error payload: something went wrong on
        // Facebook's end and there is nothing more specific to report.
        if matches!(status, 401 | 500) {
            return Err(FacebookError::network_status(
                status,
                "Facebook request failed",
            ));
        }

        Ok(body)
    }

    /// Extracts a legacy (`error_code`) or Graph (`error`) error from the body.
    ///
    /// Only JSON objects are inspected. A body that looks like an object but
    /// doesn't parse is left for the caller: the mapper will reject it on a
    /// success path, and 401/500 become network errors.
    fn embedded_error(body: &str) -> Result<Option<FacebookError>> {
        if !body.trim_start().starts_with('{') {
            return Ok(None);
        }

        let Ok(Value::Object(object)) = serde_json::from_str::<Value>(body) else {
            return Ok(None);
        };

        if let Some(code) = object.get(LEGACY_ERROR_CODE_ATTRIBUTE_NAME) {
            return Self::legacy_error(code, &object).map(Some);
        }

        match object.get(ERROR_ATTRIBUTE_NAME) {
            None => Ok(None),
            Some(Value::Object(error)) => Self::graph_error(error).map(Some),
            Some(other) => Err(FacebookError::json_mapping(format!(
                "Unable to process the Facebook API response: '{}' is not an object: {}",
                ERROR_ATTRIBUTE_NAME, other
            ))),
        }
    }

    fn legacy_error(code: &Value, object: &Map<String, Value>) -> Result<FacebookError> {
        let code = match code {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        }
        .ok_or_else(|| {
            FacebookError::json_mapping(format!(
                "Unable to process the Facebook API response: invalid '{}' value {}",
                LEGACY_ERROR_CODE_ATTRIBUTE_NAME, code
            ))
        })?;

        let message = object
            .get(LEGACY_ERROR_MSG_ATTRIBUTE_NAME)
            .and_then(Value::as_str)
            .unwrap_or_default();

        Ok(FacebookError::response_status(code, message))
    }

    fn graph_error(error: &Map<String, Value>) -> Result<FacebookError> {
        let attribute = |name: &str| {
            error.get(name).and_then(Value::as_str).ok_or_else(|| {
                FacebookError::json_mapping(format!(
                    "Unable to process the Facebook API response: error object has no '{}' string",
                    name
                ))
            })
        };

        Ok(FacebookError::graph(
            attribute(ERROR_TYPE_ATTRIBUTE_NAME)?,
            attribute(ERROR_MESSAGE_ATTRIBUTE_NAME)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(status: u16, body: &str) -> Result<String> {
        ResponseClassifier::classify(TransportResponse::new(status, body))
    }

    #[test]
    fn plain_success_passes_through() {
        assert_eq!(classify(200, r#"{"id":"1"}"#).unwrap(), r#"{"id":"1"}"#);
        assert_eq!(classify(200, "[]").unwrap(), "[]");
        assert_eq!(classify(200, "true").unwrap(), "true");
    }

    #[test]
    fn legacy_error_code_becomes_response_status_error() {
        let err = classify(
            200,
            r#"{"error_code":190,"error_msg":"Invalid OAuth 2.0 Access Token","request_args":[]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            FacebookError::response_status(190, "Invalid OAuth 2.0 Access Token")
        );

        let err = classify(400, r#"{"error_code":"601","error_msg":"Parser error"}"#).unwrap_err();
        assert_eq!(err, FacebookError::response_status(601, "Parser error"));
    }

    #[test]
    fn graph_error_object_becomes_graph_error() {
        let err = classify(
            400,
            r#"{"error":{"type":"OAuthException","message":"Error validating access token."}}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            FacebookError::graph("OAuthException", "Error validating access token.")
        );
    }

    #[test]
    fn structured_errors_win_over_401_and_500() {
        let err = classify(
            500,
            r#"{"error":{"type":"GraphMethodException","message":"Unsupported get request."}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FacebookError::Graph { .. }));

        let err = classify(401, r#"{"error_code":102,"error_msg":"Session key invalid"}"#).unwrap_err();
        assert!(matches!(err, FacebookError::ResponseStatus { code: 102, .. }));
    }

    #[test]
    fn bare_401_and_500_are_network_errors() {
        assert_eq!(classify(500, "").unwrap_err().status(), Some(500));
        assert_eq!(classify(401, "<html>nope</html>").unwrap_err().status(), Some(401));
        assert_eq!(classify(500, "{broken").unwrap_err().status(), Some(500));
    }

    #[test]
    fn unrecognized_statuses_fail_without_parsing() {
        let err = classify(503, r#"{"error":{"type":"X","message":"Y"}}"#).unwrap_err();
        assert_eq!(
            err,
            FacebookError::network_status(503, "Facebook request failed")
        );
    }

    #[test]
    fn malformed_graph_error_is_a_mapping_error() {
        let err = classify(400, r#"{"error":{"message":"no type"}}"#).unwrap_err();
        assert!(matches!(err, FacebookError::JsonMapping(_)));

        let err = classify(200, r#"{"error":"just a string"}"#).unwrap_err();
        assert!(matches!(err, FacebookError::JsonMapping(_)));
    }
}
