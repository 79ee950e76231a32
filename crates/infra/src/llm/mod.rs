//! LLM provider adapters and the router factory

pub mod base;
pub mod claude;
pub mod error;
pub mod factory;
pub mod ollama;
pub mod openai;
pub mod stream;

pub use base::JsonApiClient;
pub use claude::ClaudeProvider;
pub use error::ProviderError;
pub use factory::build_router;
pub use ollama::OllamaProvider;
pub use openai::OpenAiCompatibleProvider;
