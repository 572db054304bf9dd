//! Assembles endpoint URLs and parameter sets for a single API call.

use crate::{
    auth::SigningContext,
    config::FacebookClientConfig,
    error::{FacebookError, Result},
    parameter::{FORMAT_PARAM_NAME, METHOD_PARAM_NAME, Parameter, ParameterList},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `https://graph.facebook.com`
    Graph,
    /// `https://api.facebook.com/method`, used for FQL and REST methods.
    Legacy,
}

/// Facebook only accepts GET and POST; deletes are POSTs with a
/// `method=delete` override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    endpoint: Endpoint,
    path: String,
    method: HttpMethod,
    delete: bool,
    parameters: ParameterList,
}

/// A request ready for the transport: verb, full URL and (for POST) the
/// form-encoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PreparedRequest {
    pub method: HttpMethod,
    pub endpoint: Endpoint,
    pub path: String,
    pub url: String,
    pub body: Option<String>,
}

impl ApiRequest {
    fn new(endpoint: Endpoint, path: &str, method: HttpMethod, caller: &[Parameter]) -> Result<Self> {
        Ok(Self {
            endpoint,
            path: normalize_path(path),
            method,
            delete: false,
            parameters: ParameterList::from_caller(caller)?,
        })
    }

    pub fn graph_get(path: &str, caller: &[Parameter]) -> Result<Self> {
        Self::new(Endpoint::Graph, path, HttpMethod::Get, caller)
    }

    pub fn graph_post(path: &str, caller: &[Parameter]) -> Result<Self> {
        Self::new(Endpoint::Graph, path, HttpMethod::Post, caller)
    }

    pub fn graph_delete(path: &str) -> Result<Self> {
        let mut request = Self::new(Endpoint::Graph, path, HttpMethod::Post, &[])?;
        request.delete = true;
        Ok(request)
    }

    /// A legacy REST call; `method` is both the URL path segment and, in
    /// signature mode, the signed `method` parameter.
    pub fn legacy_post(method: &str, caller: &[Parameter]) -> Result<Self> {
        Self::new(Endpoint::Legacy, method, HttpMethod::Post, caller)
    }

    /// Adds a parameter the client owns (`ids`, `query`, `queries`, ...).
    pub fn with_reserved(mut self, parameter: Parameter) -> Result<Self> {
        self.parameters.insert_reserved(parameter)?;
        Ok(self)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Merges the protocol-mandated parameters, signs if required, and builds
    /// the final URL/body.
    pub fn prepare(
        mut self,
        config: &FacebookClientConfig,
        call_id: i64,
    ) -> Result<PreparedRequest> {
        if self.delete {
            self.parameters
                .insert_reserved(Parameter::new(METHOD_PARAM_NAME, "delete"))?;
        }
        self.parameters
            .insert_reserved(Parameter::new(FORMAT_PARAM_NAME, "json"))?;

        let legacy_method = match self.endpoint {
            Endpoint::Legacy => Some(self.path.trim_start_matches('/')),
            Endpoint::Graph => None,
        };
        config.auth.apply(
            &mut self.parameters,
            SigningContext {
                legacy_method,
                api_version: &config.legacy_api_version,
                call_id,
            },
        )?;

        let base = match self.endpoint {
            Endpoint::Graph => config.graph_endpoint_url.trim_end_matches('/'),
            Endpoint::Legacy => config.legacy_endpoint_url.trim_end_matches('/'),
        };
        let url = format!("{}{}", base, self.path);
        let query = self.parameters.to_query_string();

        let (url, body) = match self.method {
            HttpMethod::Get => (format!("{url}?{query}"), None),
            HttpMethod::Post => (url, Some(query)),
        };

        Ok(PreparedRequest {
            method: self.method,
            endpoint: self.endpoint,
            path: self.path,
            url,
            body,
        })
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Trims and lowercases every id, rejecting blanks and empty lists, and joins
/// them into the comma-separated `ids` value.
pub fn normalize_ids<S: AsRef<str>>(ids: &[S]) -> Result<String> {
    if ids.is_empty() {
        return Err(FacebookError::configuration(
            "The list of IDs cannot be empty.",
        ));
    }

    let mut normalized = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.as_ref().trim().to_lowercase();
        if id.is_empty() {
            return Err(FacebookError::configuration(
                "The list of IDs cannot contain blank strings.",
            ));
        }
        normalized.push(id);
    }

    Ok(normalized.join(","))
}
