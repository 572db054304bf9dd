//! How requests prove who is calling: an OAuth access token for the Graph
//! protocol, or an `api_key` plus request signature for the legacy REST
//! protocol.

use std::collections::BTreeMap;
use std::fmt;

use md5::Md5;
use sha2::{Digest, Sha256};

use crate::{
    error::{FacebookError, Result},
    parameter::{
        ACCESS_TOKEN_PARAM_NAME, API_KEY_PARAM_NAME, CALL_ID_PARAM_NAME, METHOD_PARAM_NAME,
        Parameter, ParameterList, SESSION_KEY_PARAM_NAME, SIGNATURE_PARAM_NAME,
        VERSION_PARAM_NAME,
    },
};

/// Digest used for legacy request signatures.
///
/// Facebook's legacy REST endpoint only verifies MD5 signatures, so `Md5` is
/// the default and the only choice that interoperates with it. MD5 is a broken
/// hash; `Sha256` exists for servers that speak the same signing scheme with a
/// stronger digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    #[default]
    Md5,
    Sha256,
}

impl SignatureAlgorithm {
    pub fn hex_digest(self, input: &[u8]) -> String {
        match self {
            Self::Md5 => hex::encode(Md5::digest(input)),
            Self::Sha256 => hex::encode(Sha256::digest(input)),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct LegacyCredentials {
    pub api_key: String,
    pub secret: String,
    pub session_key: Option<String>,
    pub algorithm: SignatureAlgorithm,
}

impl LegacyCredentials {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
            session_key: None,
            algorithm: SignatureAlgorithm::default(),
        }
    }

    pub fn with_session_key(mut self, session_key: impl Into<String>) -> Self {
        self.session_key = Some(session_key.into());
        self
    }

    pub fn with_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

impl fmt::Debug for LegacyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyCredentials")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .field("session_key", &self.session_key.as_ref().map(|_| "<redacted>"))
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Default)]
pub enum AuthStrategy {
    /// No credentials; only public Graph data is reachable.
    #[default]
    Anonymous,
    /// Graph protocol: the token rides along as `access_token`.
    AccessToken(String),
    /// Legacy REST protocol: parameters are signed with the app secret.
    Signature(LegacyCredentials),
}

impl fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            Self::Signature(credentials) => f.debug_tuple("Signature").field(credentials).finish(),
        }
    }
}

/// Per-request inputs the signature strategy needs besides the credentials.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SigningContext<'a> {
    pub legacy_method: Option<&'a str>,
    pub api_version: &'a str,
    pub call_id: i64,
}

impl AuthStrategy {
    pub fn access_token(token: impl Into<String>) -> Self {
        Self::AccessToken(token.into())
    }

    pub fn signature(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::Signature(LegacyCredentials::new(api_key, secret))
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Anonymous => Ok(()),
            Self::AccessToken(token) if token.trim().is_empty() => Err(
                FacebookError::configuration("Access token cannot be blank"),
            ),
            Self::AccessToken(_) => Ok(()),
            Self::Signature(credentials) => {
                if credentials.api_key.trim().is_empty() {
                    return Err(FacebookError::configuration("API key cannot be blank"));
                }
                if credentials.secret.is_empty() {
                    return Err(FacebookError::configuration("App secret cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Adds the protocol-mandated credentials to `params`.
    ///
    /// In signature mode `sig` is computed over the complete set and is always
    /// the last parameter added.
    pub(crate) fn apply(&self, params: &mut ParameterList, context: SigningContext<'_>) -> Result<()> {
        match self {
            Self::Anonymous => Ok(()),
            Self::AccessToken(token) => {
                params.insert_reserved(Parameter::new(ACCESS_TOKEN_PARAM_NAME, token.trim()))
            }
            Self::Signature(credentials) => {
                params.insert_reserved(Parameter::new(API_KEY_PARAM_NAME, &credentials.api_key))?;
                params.insert_reserved(Parameter::new(VERSION_PARAM_NAME, context.api_version))?;
                params.insert_reserved(Parameter::new(
                    CALL_ID_PARAM_NAME,
                    context.call_id.to_string(),
                ))?;
                if let Some(session_key) = &credentials.session_key {
                    params.insert_reserved(Parameter::new(SESSION_KEY_PARAM_NAME, session_key))?;
                }
                if let Some(method) = context.legacy_method {
                    params.insert_reserved(Parameter::new(METHOD_PARAM_NAME, method))?;
                }

                let sig = generate_signature(
                    params.iter(),
                    &credentials.secret,
                    credentials.algorithm,
                );
                params.insert_reserved(Parameter::new(SIGNATURE_PARAM_NAME, sig))
            }
        }
    }
}

/// Legacy request signature: parameters sorted by name, concatenated as
/// `name=value` with no separator, followed by the secret, digested and
/// hex-encoded.
pub fn generate_signature<'a>(
    params: impl IntoIterator<Item = &'a Parameter>,
    secret: &str,
    algorithm: SignatureAlgorithm,
) -> String {
    let sorted: BTreeMap<&str, &str> = params
        .into_iter()
        .map(|p| (p.name.as_str(), p.value.as_str()))
        .collect();

    let mut payload = String::new();
    for (name, value) in sorted {
        payload.push_str(name);
        payload.push('=');
        payload.push_str(value);
    }
    payload.push_str(secret);

    algorithm.hex_digest(payload.as_bytes())
}
