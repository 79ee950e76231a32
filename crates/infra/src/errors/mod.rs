//! Infrastructure error types and conversions into the domain error

pub mod conversions;

pub use conversions::{InfraError, TIMEOUT_MESSAGE};
