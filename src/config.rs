use bon::Builder;
use std::time::Duration;
use validator::Validate;

use crate::auth::AuthStrategy;
use crate::error::{FacebookError, Result};

pub const DEFAULT_GRAPH_ENDPOINT_URL: &str = "https://graph.facebook.com";
pub const DEFAULT_LEGACY_ENDPOINT_URL: &str = "https://api.facebook.com/method";

#[derive(Debug, Clone, Builder, Validate)]
pub struct FacebookClientConfig {
    #[builder(default)]
    pub auth: AuthStrategy,
    #[builder(into, default = DEFAULT_GRAPH_ENDPOINT_URL.to_string())]
    #[validate(url(message = "Graph endpoint must be a valid URL"))]
    pub graph_endpoint_url: String,
    #[builder(into, default = DEFAULT_LEGACY_ENDPOINT_URL.to_string())]
    #[validate(url(message = "Legacy endpoint must be a valid URL"))]
    pub legacy_endpoint_url: String,
    /// Value of the `v` parameter on signed legacy calls.
    #[builder(into, default = "1.0".to_string())]
    pub legacy_api_version: String,
    #[builder(default = Duration::from_secs(30))]
    pub timeout: Duration,
    /// Transport-level retries on connection failures. Zero disables them.
    #[builder(default = 0)]
    pub retry_attempts: u32,
    #[builder(default = Duration::from_millis(500))]
    pub retry_delay: Duration,
    #[builder(into, default = format!("fb-graph-client/{}", env!("CARGO_PKG_VERSION")))]
    pub user_agent: String,
}

impl FacebookClientConfig {
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        let access_token = access_token.into();

        if access_token.trim().is_empty() {
            return Err(FacebookError::configuration("Access token cannot be blank"));
        }

        Ok(Self::builder()
            .auth(AuthStrategy::access_token(access_token))
            .build())
    }

    pub fn validate(&self) -> Result<()> {
        Validate::validate(self)
            .map_err(|e| FacebookError::configuration(format!("Config validation failed: {e}")))?;

        self.auth.validate()?;

        if self.timeout.is_zero() {
            return Err(FacebookError::configuration(
                "Timeout must be greater than 0",
            ));
        }

        if self.legacy_api_version.trim().is_empty() {
            return Err(FacebookError::configuration(
                "Legacy API version cannot be blank",
            ));
        }

        Ok(())
    }
}

impl Default for FacebookClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
