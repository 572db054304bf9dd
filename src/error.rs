use thiserror::Error;

pub type Result<T> = std::result::Result<T, FacebookError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FacebookError {
    /// Bad caller input, detected before any request is sent.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Transport failure, or an HTTP status that carried no decodable error.
    #[error("Network error{}: {message}", describe_status(.status))]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// Legacy REST error (`error_code` / `error_msg`).
    #[error("Facebook response status error {code}: {message}")]
    ResponseStatus { code: i64, message: String },

    /// Graph API error (`error.type` / `error.message`).
    #[error("Facebook Graph API error ({error_type}): {message}")]
    Graph { error_type: String, message: String },

    #[error("JSON mapping error: {0}")]
    JsonMapping(String),
}

fn describe_status(status: &Option<u16>) -> String {
    status
        .map(|status| format!(" (HTTP status {status})"))
        .unwrap_or_default()
}

impl FacebookError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            status: None,
            message: message.into(),
        }
    }

    pub fn network_status(status: u16, message: impl Into<String>) -> Self {
        Self::Network {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn response_status(code: i64, message: impl Into<String>) -> Self {
        Self::ResponseStatus {
            code,
            message: message.into(),
        }
    }

    pub fn graph(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Graph {
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    pub fn json_mapping(message: impl Into<String>) -> Self {
        Self::JsonMapping(message.into())
    }

    /// Adds context to an error for better debugging and error reporting
    pub fn with_context(self, context: &str) -> Self {
        match self {
            Self::Configuration(message) => {
                Self::Configuration(format!("{}: {}", context, message))
            }
            Self::Network { status, message } => Self::Network {
                status,
                message: format!("{}: {}", context, message),
            },
            Self::JsonMapping(message) => Self::JsonMapping(format!("{}: {}", context, message)),
            // Remote errors are surfaced verbatim
            Self::ResponseStatus { .. } | Self::Graph { .. } => self,
        }
    }

    /// The HTTP status attached to a network error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => *status,
            _ => None,
        }
    }

    /// Only transport-level failures are worth retrying; everything else is
    /// either a caller mistake or a decoded answer from Facebook.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { status: None, .. })
    }
}

impl From<reqwest::Error> for FacebookError {
    fn from(err: reqwest::Error) -> Self {
        Self::network(format!("Facebook request failed: {err}"))
    }
}

impl From<reqwest_middleware::Error> for FacebookError {
    fn from(err: reqwest_middleware::Error) -> Self {
        Self::network(format!("Facebook request failed: {err}"))
    }
}

impl From<serde_json::Error> for FacebookError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonMapping(err.to_string())
    }
}
