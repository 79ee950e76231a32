//! Builds the LLM router from configuration

use std::sync::Arc;

use cadence_core::{LlmProvider, LlmRouter};
use cadence_domain::{AiConfig, Result};
use tracing::{info, warn};

use super::claude::ClaudeProvider;
use super::ollama::OllamaProvider;
use super::openai::OpenAiCompatibleProvider;

/// Router with one adapter per configured provider section.
///
/// `None` yields an empty router: no providers, no default, no chain.
///
/// # Errors
/// `CadenceError::Config` when the configuration fails validation or an
/// adapter cannot be constructed.
pub fn build_router(config: Option<&AiConfig>) -> Result<LlmRouter> {
    let Some(config) = config else {
        warn!("no AI configuration, LLM router has no providers");
        return Ok(LlmRouter::empty());
    };
    config.validate()?;

    let mut providers: Vec<Arc<dyn LlmProvider>> = Vec::new();
    if let Some(ollama) = &config.ollama {
        providers.push(Arc::new(OllamaProvider::new(ollama)?));
    }
    if let Some(claude) = &config.claude {
        providers.push(Arc::new(ClaudeProvider::new(claude)?));
    }
    if let Some(openai) = &config.openai {
        providers.push(Arc::new(OpenAiCompatibleProvider::openai(openai)?));
    }
    if let Some(groq) = &config.groq {
        providers.push(Arc::new(OpenAiCompatibleProvider::groq(groq)?));
    }

    info!(configured = ?config.configured_providers(), "building LLM router");
    Ok(LlmRouter::new(providers, config.default_provider.trim(), config.fallback.as_ref()))
}
