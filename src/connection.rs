use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{FacebookError, Result};
use crate::mapper::JsonMapper;

/// One page of a Graph API connection (`/me/friends`, `/{page}/feed`, ...)
/// plus the URLs of its neighbouring pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection<T> {
    data: Vec<T>,
    previous_page_url: Option<String>,
    next_page_url: Option<String>,
}

impl<T> Connection<T> {
    pub fn new(data: Vec<T>, previous_page_url: Option<String>, next_page_url: Option<String>) -> Self {
        Self {
            data,
            previous_page_url,
            next_page_url,
        }
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    pub fn previous_page_url(&self) -> Option<&str> {
        self.previous_page_url.as_deref()
    }

    pub fn next_page_url(&self) -> Option<&str> {
        self.next_page_url.as_deref()
    }

    pub fn has_previous(&self) -> bool {
        self.previous_page_url.is_some()
    }

    pub fn has_next(&self) -> bool {
        self.next_page_url.is_some()
    }
}

impl<T: DeserializeOwned> Connection<T> {
    /// Maps `{"data": [...], "paging": {"previous": ..., "next": ...}}`.
    pub(crate) fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).map_err(|e| {
            FacebookError::json_mapping(format!("Unable to map connection JSON: {e}"))
        })?;
        let Value::Object(mut object) = value else {
            return Err(FacebookError::json_mapping(
                "Unable to map connection JSON: expected an object",
            ));
        };

        let data = match object.remove("data") {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(JsonMapper::from_value)
                .collect::<Result<Vec<T>>>()
                .map_err(|e| e.with_context("Unable to map connection data"))?,
            _ => {
                return Err(FacebookError::json_mapping(
                    "Unable to map connection JSON: missing 'data' array",
                ));
            }
        };

        let (previous_page_url, next_page_url) = match object.get("paging") {
            Some(Value::Object(paging)) => (
                paging_url(paging.get("previous")),
                paging_url(paging.get("next")),
            ),
            _ => (None, None),
        };

        Ok(Self::new(data, previous_page_url, next_page_url))
    }
}

fn paging_url(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

impl<T> IntoIterator for Connection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NamedFacebookType;

    #[test]
    fn maps_data_and_paging() {
        let json = r#"{
            "data": [{"id": "1", "name": "Ann"}, {"id": "2", "name": "Bob"}],
            "paging": {"next": "https://graph.facebook.com/me/friends?offset=2"}
        }"#;
        let connection: Connection<NamedFacebookType> = Connection::from_json(json).unwrap();

        assert_eq!(connection.data().len(), 2);
        assert_eq!(connection.data()[1].name.as_deref(), Some("Bob"));
        assert!(connection.has_next());
        assert!(!connection.has_previous());
        assert_eq!(
            connection.next_page_url(),
            Some("https://graph.facebook.com/me/friends?offset=2")
        );
    }

    #[test]
    fn paging_is_optional() {
        let connection: Connection<NamedFacebookType> =
            Connection::from_json(r#"{"data": []}"#).unwrap();
        assert!(connection.data().is_empty());
        assert!(!connection.has_next());
    }

    #[test]
    fn missing_data_is_a_mapping_error() {
        let err = Connection::<NamedFacebookType>::from_json(r#"{"paging": {}}"#).unwrap_err();
        assert!(matches!(err, FacebookError::JsonMapping(_)));
    }
}
