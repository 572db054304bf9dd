//! Facebook Graph API client for Rust
//!
//! An async client for the Graph API and the legacy REST/FQL endpoint: object
//! and connection fetches, publishing, deletes, FQL queries and multiqueries,
//! and Page Insights built on top of them.
//!
//! # Example
//!
//! ```rust, no_run
//! use fb_graph_client::{Connection, FacebookClient, Parameter, types::{NamedFacebookType, Post}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FacebookClient::new("MY_ACCESS_TOKEN")?;
//!
//!     let me: NamedFacebookType = client.fetch_object("me", &[]).await?;
//!     println!("Hello, {:?}", me.name);
//!
//!     let feed: Connection<Post> = client
//!         .fetch_connection("me/feed", &[Parameter::new("limit", "5")])
//!         .await?;
//!     for post in feed.data() {
//!         println!("{:?}", post.message);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod connection;
pub mod error;
pub mod insights;
pub mod mapper;
pub mod multiquery;
pub mod parameter;
pub mod request;
pub mod response;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

pub use auth::{AuthStrategy, LegacyCredentials, SignatureAlgorithm};
pub use config::FacebookClientConfig;
pub use connection::Connection;
pub use error::{FacebookError, Result};
pub use insights::{InsightsQuery, Period};
pub use mapper::JsonMapper;
pub use parameter::Parameter;
pub use response::ResponseClassifier;
pub use transport::{BinaryAttachment, ReqwestTransport, TransportResponse, WebRequestor};

use parameter::{IDS_PARAM_NAME, QUERIES_PARAM_NAME, QUERY_PARAM_NAME};
use request::{ApiRequest, HttpMethod, normalize_ids};

const FQL_QUERY_METHOD: &str = "fql.query";
const FQL_MULTIQUERY_METHOD: &str = "fql.multiquery";

/// Client for the Facebook Graph API and legacy REST endpoint.
///
/// Holds only immutable configuration and a shared transport, so it is cheap
/// to clone and safe to use from many tasks at once. Every call is a single
/// HTTP round trip.
#[derive(Debug, Clone)]
pub struct FacebookClient {
    config: Arc<FacebookClientConfig>,
    transport: Arc<dyn WebRequestor>,
}

impl FacebookClient {
    /// Create a client that authenticates with an OAuth access token
    ///
    /// # Errors
    /// Returns an error if the token is blank or the HTTP client cannot be built
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        let config = FacebookClientConfig::new(access_token)?;
        Self::with_config(config)
    }

    /// Create a client with custom configuration and the default reqwest transport
    ///
    /// # Errors
    /// Returns an error if configuration validation fails
    pub fn with_config(config: FacebookClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, transport)
    }

    /// Create a client that sends requests through `transport`
    pub fn with_transport(
        config: FacebookClientConfig,
        transport: impl WebRequestor + 'static,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        })
    }

    pub fn config(&self) -> &FacebookClientConfig {
        &self.config
    }

    /// Fetch a single Graph API object, e.g. `"me"` or `"31698190356"`
    ///
    /// # Errors
    ///
    /// - `FacebookError::Configuration` if `object` is blank or a parameter name is reserved
    /// - `FacebookError::Network` if the request fails or Facebook answers 401/500 without details
    /// - `FacebookError::Graph` / `FacebookError::ResponseStatus` for errors reported in the body
    /// - `FacebookError::JsonMapping` if the body does not map onto `T`
    pub async fn fetch_object<T: DeserializeOwned>(
        &self,
        object: &str,
        parameters: &[Parameter],
    ) -> Result<T> {
        require_non_blank(object, "object")?;
        let body = self
            .make_request(ApiRequest::graph_get(object, parameters)?, None)
            .await?;
        JsonMapper::to_object(&body)
    }

    /// Fetch several objects in one call with the `ids` parameter
    ///
    /// The response is keyed by id, so `T` is usually a map or a struct with
    /// one field per id.
    pub async fn fetch_objects<T, S>(&self, ids: &[S], parameters: &[Parameter]) -> Result<T>
    where
        T: DeserializeOwned,
        S: AsRef<str>,
    {
        let ids = normalize_ids(ids)?;
        let request = ApiRequest::graph_get("", parameters)?
            .with_reserved(Parameter::new(IDS_PARAM_NAME, ids))?;
        let body = self.make_request(request, None).await?;
        JsonMapper::to_object(&body)
    }

    /// Fetch the first page of a connection such as `"me/friends"`
    pub async fn fetch_connection<T: DeserializeOwned>(
        &self,
        connection: &str,
        parameters: &[Parameter],
    ) -> Result<Connection<T>> {
        require_non_blank(connection, "connection")?;
        let body = self
            .make_request(ApiRequest::graph_get(connection, parameters)?, None)
            .await?;
        Connection::from_json(&body)
    }

    /// Fetch a connection page by the full URL Facebook handed back in `paging`
    ///
    /// The URL already carries every parameter it needs and is requested as-is.
    pub async fn fetch_connection_page<T: DeserializeOwned>(
        &self,
        connection_page_url: &str,
    ) -> Result<Connection<T>> {
        require_non_blank(connection_page_url, "connection page URL")?;
        debug!("Fetching connection page");
        let response = self.transport.get(connection_page_url.trim()).await?;
        debug!(status = response.status, "Received Facebook response");
        let body = ResponseClassifier::classify(response)?;
        Connection::from_json(&body)
    }

    /// Publish to a connection, e.g. a status update to `"me/feed"`
    ///
    /// The response is usually the new object's id, see [`types::FacebookType`].
    pub async fn publish<T: DeserializeOwned>(
        &self,
        connection: &str,
        parameters: &[Parameter],
    ) -> Result<T> {
        require_non_blank(connection, "connection")?;
        let body = self
            .make_request(ApiRequest::graph_post(connection, parameters)?, None)
            .await?;
        JsonMapper::to_object(&body)
    }

    /// Publish with a file attached, e.g. a photo to `"me/photos"`
    pub async fn publish_with_attachment<T: DeserializeOwned>(
        &self,
        connection: &str,
        parameters: &[Parameter],
        attachment: &BinaryAttachment,
    ) -> Result<T> {
        require_non_blank(connection, "connection")?;
        if attachment.filename.trim().is_empty() {
            return Err(FacebookError::configuration(
                "Binary attachment filename cannot be blank",
            ));
        }
        let body = self
            .make_request(ApiRequest::graph_post(connection, parameters)?, Some(attachment))
            .await?;
        JsonMapper::to_object(&body)
    }

    /// Delete an object; `Ok(true)` only when Facebook answers with `true`
    pub async fn delete_object(&self, object: &str) -> Result<bool> {
        require_non_blank(object, "object")?;
        let body = self
            .make_request(ApiRequest::graph_delete(object)?, None)
            .await?;
        Ok(body.trim() == "true")
    }

    /// Run a single FQL query against the legacy `fql.query` method
    pub async fn execute_query<T: DeserializeOwned>(
        &self,
        query: &str,
        parameters: &[Parameter],
    ) -> Result<Vec<T>> {
        require_non_blank(query, "query")?;
        let request = ApiRequest::legacy_post(FQL_QUERY_METHOD, parameters)?
            .with_reserved(Parameter::new(QUERY_PARAM_NAME, query))?;
        let body = self.make_request(request, None).await?;
        JsonMapper::to_list(&body)
    }

    /// Run several named FQL queries in one round trip
    ///
    /// The response is reshaped to `{"<query name>": [rows...]}` before
    /// mapping onto `T`.
    pub async fn execute_multiquery<T, I, K, Q>(
        &self,
        queries: I,
        parameters: &[Parameter],
    ) -> Result<T>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = (K, Q)>,
        K: Into<String>,
        Q: Into<String>,
    {
        let queries = multiquery::queries_to_json(queries)?;
        let request = ApiRequest::legacy_post(FQL_MULTIQUERY_METHOD, parameters)?
            .with_reserved(Parameter::new(QUERIES_PARAM_NAME, queries))?;
        let body = self.make_request(request, None).await?;
        let reshaped = multiquery::reshape(&body)?;
        JsonMapper::from_value(Value::Object(reshaped))
    }

    /// Call any legacy REST method, e.g. `"users.getInfo"`
    pub async fn call_method<T: DeserializeOwned>(
        &self,
        method: &str,
        parameters: &[Parameter],
    ) -> Result<T> {
        require_non_blank(method, "method")?;
        let body = self
            .make_request(ApiRequest::legacy_post(method.trim(), parameters)?, None)
            .await?;
        JsonMapper::to_object(&body)
    }

    #[instrument(skip_all, fields(path = %request.path()))]
    async fn make_request(
        &self,
        request: ApiRequest,
        attachment: Option<&BinaryAttachment>,
    ) -> Result<String> {
        let prepared = request.prepare(&self.config, now_ms())?;
        debug!(
            method = prepared.method.as_str(),
            endpoint = ?prepared.endpoint,
            "Sending Facebook request"
        );

        let response = match prepared.method {
            HttpMethod::Get => self.transport.get(&prepared.url).await?,
            HttpMethod::Post => {
                self.transport
                    .post(&prepared.url, prepared.body.as_deref().unwrap_or_default(), attachment)
                    .await?
            }
        };

        debug!(status = response.status, "Received Facebook response");
        ResponseClassifier::classify(response)
    }
}

fn require_non_blank(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FacebookError::configuration(format!(
            "The {what} cannot be blank"
        )));
    }
    Ok(())
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
