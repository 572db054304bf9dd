//! Request parameters and the reserved-name rules that guard them.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded::byte_serialize;

use crate::error::{FacebookError, Result};

pub const METHOD_PARAM_NAME: &str = "method";
pub const FORMAT_PARAM_NAME: &str = "format";
pub const ACCESS_TOKEN_PARAM_NAME: &str = "access_token";
pub const API_KEY_PARAM_NAME: &str = "api_key";
pub const SIGNATURE_PARAM_NAME: &str = "sig";
pub const CALL_ID_PARAM_NAME: &str = "call_id";
pub const SESSION_KEY_PARAM_NAME: &str = "session_key";
pub const VERSION_PARAM_NAME: &str = "v";
pub const IDS_PARAM_NAME: &str = "ids";
pub const QUERY_PARAM_NAME: &str = "query";
pub const QUERIES_PARAM_NAME: &str = "queries";

/// Names the client populates itself. Callers may never supply these.
pub const RESERVED_PARAM_NAMES: [&str; 11] = [
    METHOD_PARAM_NAME,
    FORMAT_PARAM_NAME,
    ACCESS_TOKEN_PARAM_NAME,
    API_KEY_PARAM_NAME,
    SIGNATURE_PARAM_NAME,
    CALL_ID_PARAM_NAME,
    SESSION_KEY_PARAM_NAME,
    VERSION_PARAM_NAME,
    IDS_PARAM_NAME,
    QUERY_PARAM_NAME,
    QUERIES_PARAM_NAME,
];

/// A single name/value pair sent along with an API call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Builds a parameter from any serializable value.
    ///
    /// Strings are sent verbatim; numbers, booleans, arrays and objects are
    /// sent as their JSON text, which is what Facebook expects for structured
    /// parameters such as `privacy` or `targeting`.
    pub fn json<T: Serialize + ?Sized>(name: impl Into<String>, value: &T) -> Result<Self> {
        let name = name.into();
        let value = match serde_json::to_value(value)? {
            Value::String(text) => text,
            other => serde_json::to_string(&other)?,
        };
        Ok(Self { name, value })
    }

    pub fn is_reserved(&self) -> bool {
        RESERVED_PARAM_NAMES.contains(&self.name.as_str())
    }
}

/// The ordered parameter set of one request.
///
/// Caller parameters go in first; reserved parameters added afterwards by the
/// client refuse to overwrite anything already present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterList {
    params: Vec<Parameter>,
}

impl ParameterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts caller parameters, rejecting reserved, blank and repeated names.
    pub fn from_caller(parameters: &[Parameter]) -> Result<Self> {
        let mut seen = HashSet::with_capacity(parameters.len());
        for parameter in parameters {
            if parameter.name.trim().is_empty() {
                return Err(FacebookError::configuration(
                    "Parameter names cannot be blank",
                ));
            }
            if parameter.is_reserved() {
                return Err(FacebookError::configuration(format!(
                    "You cannot specify the '{}' URL parameter yourself - it is populated by the client",
                    parameter.name
                )));
            }
            if !seen.insert(parameter.name.as_str()) {
                return Err(FacebookError::configuration(format!(
                    "Parameter '{}' was supplied more than once",
                    parameter.name
                )));
            }
        }

        Ok(Self {
            params: parameters.to_vec(),
        })
    }

    /// Adds a client-managed parameter. Fails if the name is already taken.
    pub fn insert_reserved(&mut self, parameter: Parameter) -> Result<()> {
        if self.contains(&parameter.name) {
            return Err(FacebookError::configuration(format!(
                "Parameter '{}' was supplied more than once",
                parameter.name
            )));
        }
        self.params.push(parameter);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// `name=value` pairs joined by `&`, each side form-encoded on its own.
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|p| {
                format!(
                    "{}={}",
                    byte_serialize(p.name.as_bytes()).collect::<String>(),
                    byte_serialize(p.value.as_bytes()).collect::<String>()
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}
