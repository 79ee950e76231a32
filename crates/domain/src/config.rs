//! AI provider configuration model
//!
//! A snapshot of this struct is taken once per process and used to build the
//! LLM router. Provider sections are optional: an absent section means that
//! backend is simply not registered.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CLAUDE_MODEL, DEFAULT_GROQ_MODEL, DEFAULT_OLLAMA_HOST, DEFAULT_OLLAMA_MODEL,
    DEFAULT_OPENAI_MODEL, DEFAULT_PROVIDER_TIMEOUT_SECS, KNOWN_PROVIDERS,
};
use crate::{CadenceError, Result};

/// Top-level AI configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Provider used when a call does not name one. Empty means none.
    pub default_provider: String,
    pub fallback: Option<FallbackConfig>,
    pub ollama: Option<OllamaConfig>,
    pub claude: Option<ProviderConfig>,
    pub openai: Option<ProviderConfig>,
    pub groq: Option<ProviderConfig>,
}

/// Ordered list of providers tried in sequence by routed calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub enabled: bool,
    pub providers: Vec<String>,
}

/// Local Ollama server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OLLAMA_HOST.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
        }
    }
}

/// Hosted provider settings (Claude, OpenAI, Groq)
///
/// `api_key` may be written as `${VAR}`; the loader expands it. Empty
/// `model` and `base_url` fall back to the provider's defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: String::new(),
            base_url: None,
            timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
        }
    }
}

impl ProviderConfig {
    /// Config with only a key and model set.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), model: model.into(), ..Self::default() }
    }

    /// Model to use, or `default` when unset.
    pub fn model_or<'a>(&'a self, default: &'a str) -> &'a str {
        if self.model.trim().is_empty() {
            default
        } else {
            &self.model
        }
    }
}

impl AiConfig {
    /// Names of the providers that have a configuration section.
    pub fn configured_providers(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.ollama.is_some() {
            names.push("ollama");
        }
        if self.claude.is_some() {
            names.push("claude");
        }
        if self.openai.is_some() {
            names.push("openai");
        }
        if self.groq.is_some() {
            names.push("groq");
        }
        names
    }

    /// Default models per provider, for display.
    pub const fn default_model(provider: &str) -> Option<&'static str> {
        match provider.as_bytes() {
            b"ollama" => Some(DEFAULT_OLLAMA_MODEL),
            b"claude" => Some(DEFAULT_CLAUDE_MODEL),
            b"openai" => Some(DEFAULT_OPENAI_MODEL),
            b"groq" => Some(DEFAULT_GROQ_MODEL),
            _ => None,
        }
    }

    /// Check the snapshot before building a router.
    ///
    /// Unknown default provider names are rejected. Fallback entries are not
    /// checked; the router skips unregistered names at call time.
    ///
    /// # Errors
    /// Returns `CadenceError::Config` for an unknown provider name.
    pub fn validate(&self) -> Result<()> {
        let default = self.default_provider.trim();
        if !default.is_empty() && !KNOWN_PROVIDERS.contains(&default) {
            return Err(CadenceError::Config(format!(
                "unknown default provider '{default}' (expected one of {})",
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        Ok(())
    }
}
