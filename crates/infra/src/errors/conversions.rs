//! Conversions from external infrastructure errors into domain errors.

use cadence_domain::CadenceError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;

/// Message used for every transport-level timeout
pub const TIMEOUT_MESSAGE: &str = "HTTP request timed out";

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CadenceError);

impl From<InfraError> for CadenceError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CadenceError> for InfraError {
    fn from(value: CadenceError) -> Self {
        Self(value)
    }
}

trait IntoCadenceError {
    fn into_cadence(self) -> CadenceError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CadenceError */
/* -------------------------------------------------------------------------- */

impl IntoCadenceError for HttpError {
    fn into_cadence(self) -> CadenceError {
        if self.is_timeout() {
            return CadenceError::Network(TIMEOUT_MESSAGE.into());
        }

        if self.is_connect() {
            return CadenceError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return CadenceError::Provider(format!("failed to decode response body: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => CadenceError::Auth(message),
                404 => CadenceError::NotFound(message),
                429 | 500..=599 => CadenceError::Network(message),
                400..=499 => CadenceError::InvalidInput(message),
                _ => CadenceError::Network(message),
            };
        }

        CadenceError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_cadence())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → CadenceError */
/* -------------------------------------------------------------------------- */

impl IntoCadenceError for JsonError {
    fn into_cadence(self) -> CadenceError {
        CadenceError::Parse(format!("invalid JSON at line {} column {}: {self}", self.line(), self.column()))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        Self(value.into_cadence())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
