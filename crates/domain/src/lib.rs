//! # Cadence Domain
//!
//! Data types shared by the scheduling intelligence core.
//!
//! This crate contains:
//! - Chat, tool and provider-response types for the LLM layer
//! - Calendar and email records consumed from the external client
//! - Pattern, focus-time and scheduling results produced by the services
//! - The AI provider configuration model
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other Cadence crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
