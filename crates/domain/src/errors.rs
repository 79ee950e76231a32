//! Error types used throughout the scheduling core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Cadence
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CadenceError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// No provider registered under the requested name, or no default.
    #[error("No provider: {0}")]
    NoProvider(String),

    /// Upstream language-model backend failed (non-2xx, malformed body, all
    /// fallbacks exhausted).
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not enough history (events, messages, patterns) to produce a result.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Cancellation token fired or the call deadline elapsed.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CadenceError {
    /// Whether a routed call should move on to the next provider after this
    /// error. Cancellation and missing configuration stop the chain.
    pub const fn is_provider_failure(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::Network(_) | Self::Auth(_) | Self::Parse(_))
    }
}

impl From<serde_json::Error> for CadenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value.to_string())
    }
}

/// Result type alias for Cadence operations
pub type Result<T> = std::result::Result<T, CadenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = CadenceError::NoProvider("no default provider configured".into());
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["type"], "NoProvider");
        assert_eq!(json["message"], "no default provider configured");
    }

    #[test]
    fn cancellation_is_not_a_provider_failure() {
        assert!(CadenceError::Provider("503".into()).is_provider_failure());
        assert!(CadenceError::Network("timed out".into()).is_provider_failure());
        assert!(!CadenceError::Cancelled("deadline exceeded".into()).is_provider_failure());
        assert!(!CadenceError::Config("bad".into()).is_provider_failure());
    }
}
