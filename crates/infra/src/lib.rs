//! # Cadence Infrastructure
//!
//! Adapters behind the ports defined in `cadence-core`:
//! - Retrying HTTP client and shared JSON plumbing
//! - LLM provider adapters (Claude, OpenAI, Groq, Ollama) and the router
//!   factory
//! - Configuration loading from environment or TOML/JSON files
//! - Tracing subscriber setup
//!
//! All network I/O in the workspace lives here.

pub mod config;
pub mod errors;
pub mod http;
pub mod llm;
pub mod observability;

pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use llm::{
    build_router, ClaudeProvider, JsonApiClient, OllamaProvider, OpenAiCompatibleProvider,
    ProviderError,
};
pub use observability::{init_tracing, LogFormat};
