//! Error type shared by the provider adapters

use std::time::Duration;

use cadence_domain::CadenceError;
use thiserror::Error;

/// Seconds to wait when a 429 carries no usable `retry-after` header
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Failure talking to an LLM backend
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limit exceeded, retry after {0} seconds")]
    RateLimit(u64),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),
}

impl From<ProviderError> for CadenceError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Network(msg) => Self::Network(msg),
            ProviderError::Timeout(after) => {
                Self::Network(format!("request timed out after {}s", after.as_secs()))
            }
            ProviderError::Authentication(msg) => Self::Auth(msg),
            other @ (ProviderError::Api { .. }
            | ProviderError::RateLimit(_)
            | ProviderError::InvalidResponse(_)) => Self::Provider(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() || err.is_body() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
