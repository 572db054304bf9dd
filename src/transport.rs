use crate::{
    config::FacebookClientConfig,
    error::{FacebookError, Result},
};
use async_trait::async_trait;
use backoff::backoff::Backoff;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryDecision, RetryPolicy, RetryTransientMiddleware, Retryable, RetryableStrategy};
use std::time::{Duration, SystemTime};

/// Status code and raw body of an HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// A file uploaded alongside a publish call (photos, videos).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryAttachment {
    pub filename: String,
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

impl BinaryAttachment {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// The only way the client talks to the network.
///
/// Implementations report any connection, DNS or timeout failure as
/// [`FacebookError::Network`]; every HTTP status, including errors, comes back
/// as a [`TransportResponse`] so the client can classify it.
#[async_trait]
pub trait WebRequestor: Send + Sync + std::fmt::Debug {
    async fn get(&self, url: &str) -> Result<TransportResponse>;

    async fn post(
        &self,
        url: &str,
        body: &str,
        attachment: Option<&BinaryAttachment>,
    ) -> Result<TransportResponse>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ClientWithMiddleware,
    inner: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &FacebookClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                FacebookError::configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        let mut builder = ClientBuilder::new(inner.clone());
        if config.retry_attempts > 0 {
            let retry_policy = BackoffRetryPolicy::new(config.retry_attempts, config.retry_delay);
            builder = builder.with(RetryTransientMiddleware::new_with_policy_and_strategy(
                retry_policy,
                ConnectionFailureStrategy,
            ));
        }

        Ok(Self {
            client: builder.build(),
            inner,
        })
    }

    async fn into_transport_response(response: reqwest::Response) -> Result<TransportResponse> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

#[async_trait]
impl WebRequestor for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse> {
        let response = self.client.get(url).send().await?;
        Self::into_transport_response(response).await
    }

    async fn post(
        &self,
        url: &str,
        body: &str,
        attachment: Option<&BinaryAttachment>,
    ) -> Result<TransportResponse> {
        let response = match attachment {
            None => {
                self.client
                    .post(url)
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(body.to_string())
                    .send()
                    .await?
            }
            // Multipart bodies cannot be replayed, so they skip the retry
            // layer. Parameters move to the query string.
            Some(attachment) => {
                let mut part = Part::bytes(attachment.data.clone())
                    .file_name(attachment.filename.clone());
                if let Some(content_type) = &attachment.content_type {
                    part = part.mime_str(content_type).map_err(|e| {
                        FacebookError::configuration(format!(
                            "Invalid attachment content type '{content_type}': {e}"
                        ))
                    })?;
                }
                let form = Form::new().part(attachment.filename.clone(), part);

                self.inner
                    .post(format!("{url}?{body}"))
                    .multipart(form)
                    .send()
                    .await?
            }
        };

        Self::into_transport_response(response).await
    }
}

/// Retries only when no response arrived at all. Every HTTP status goes back
/// to the caller untouched: a 500 from Facebook may still carry a decodable
/// error, and replaying a publish could post twice.
#[derive(Debug, Clone, Copy)]
struct ConnectionFailureStrategy;

impl RetryableStrategy for ConnectionFailureStrategy {
    fn handle(
        &self,
        res: &std::result::Result<reqwest::Response, reqwest_middleware::Error>,
    ) -> Option<Retryable> {
        match res {
            Ok(_) => None,
            Err(error) => reqwest_retry::default_on_request_failure(error),
        }
    }
}

#[derive(Debug, Clone)]
struct BackoffRetryPolicy {
    max_retries: u32,
    initial_interval: Duration,
}

impl BackoffRetryPolicy {
    fn new(max_retries: u32, initial_interval: Duration) -> Self {
        Self {
            max_retries,
            initial_interval,
        }
    }

    fn delay_for(&self, n_past_retries: u32) -> Duration {
        let mut backoff = backoff::ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_randomization_factor(0.5)
            .with_multiplier(2.0)
            .with_max_interval(Duration::from_secs(30))
            .with_max_elapsed_time(None)
            .build();
        backoff.reset();

        let mut delay = self.initial_interval;
        for _ in 0..=n_past_retries {
            delay = backoff.next_backoff().unwrap_or(self.initial_interval);
        }
        delay
    }
}

impl RetryPolicy for BackoffRetryPolicy {
    fn should_retry(&self, _request_start_time: SystemTime, n_past_retries: u32) -> RetryDecision {
        if n_past_retries >= self.max_retries {
            return RetryDecision::DoNotRetry;
        }

        RetryDecision::Retry {
            execute_after: SystemTime::now() + self.delay_for(n_past_retries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_policy_stops_after_max_attempts() {
        let policy = BackoffRetryPolicy::new(2, Duration::from_millis(100));
        assert!(matches!(
            policy.should_retry(SystemTime::now(), 0),
            RetryDecision::Retry { .. }
        ));
        assert!(matches!(
            policy.should_retry(SystemTime::now(), 2),
            RetryDecision::DoNotRetry
        ));
    }

    #[test]
    fn retry_delay_grows_and_stays_bounded() {
        let policy = BackoffRetryPolicy::new(5, Duration::from_millis(100));
        let first = policy.delay_for(0);
        assert!(first >= Duration::from_millis(50));
        assert!(first <= Duration::from_millis(150));
        assert!(policy.delay_for(20) <= Duration::from_secs(45));
    }

    #[test]
    fn transport_builds_with_and_without_retries() {
        let config = FacebookClientConfig::default();
        assert!(ReqwestTransport::new(&config).is_ok());

        let config = FacebookClientConfig::builder().retry_attempts(3).build();
        assert!(ReqwestTransport::new(&config).is_ok());
    }
}
