//! Provider registry with an ordered fallback chain
//!
//! The router is built once from configuration and never mutated. Routed
//! calls walk the fallback chain strictly in order: an unregistered or
//! unavailable entry is skipped, the first successful reply wins, and when
//! every entry fails the call reports the last cause.

use std::collections::HashMap;
use std::sync::Arc;

use cadence_domain::{CadenceError, ChatRequest, ChatResponse, FallbackConfig, Result};
use tracing::{debug, info, warn};

use super::ports::LlmProvider;
use crate::context::CallContext;

/// One entry of the fallback chain after resolution against the registry
pub enum Attempt {
    /// Registered provider to try
    Provider(Arc<dyn LlmProvider>),
    /// Name present in the chain but absent from the registry
    Unregistered(String),
}

/// Routes chat requests to registered LLM providers
pub struct LlmRouter {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
    default_provider: String,
    fallback_chain: Vec<String>,
}

impl LlmRouter {
    /// Build a router from constructed providers.
    ///
    /// An enabled fallback configuration becomes the chain verbatim, names
    /// not in the registry included. Otherwise the chain is just the default
    /// provider, or empty when there is none.
    pub fn new(
        providers: Vec<Arc<dyn LlmProvider>>,
        default_provider: impl Into<String>,
        fallback: Option<&FallbackConfig>,
    ) -> Self {
        let default_provider = default_provider.into();
        let providers: HashMap<String, Arc<dyn LlmProvider>> =
            providers.into_iter().map(|p| (p.name().to_string(), p)).collect();

        let fallback_chain = match fallback {
            Some(cfg) if cfg.enabled => cfg.providers.clone(),
            _ if !default_provider.is_empty() => vec![default_provider.clone()],
            _ => Vec::new(),
        };

        info!(
            providers = providers.len(),
            default = %default_provider,
            chain = ?fallback_chain,
            "LLM router initialized"
        );

        Self { providers, default_provider, fallback_chain }
    }

    /// Router with no providers; every call fails with `NoProvider`.
    pub fn empty() -> Self {
        Self { providers: HashMap::new(), default_provider: String::new(), fallback_chain: Vec::new() }
    }

    /// Name used when a call does not pick a provider
    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    /// Provider names tried by [`Self::chat`], in order
    pub fn fallback_chain(&self) -> &[String] {
        &self.fallback_chain
    }

    /// Resolve a provider by name; an empty name means the default.
    pub fn get_provider(&self, name: &str) -> Result<Arc<dyn LlmProvider>> {
        let name = if name.is_empty() { self.default_provider.as_str() } else { name };
        if name.is_empty() {
            return Err(CadenceError::NoProvider("no default provider configured".to_string()));
        }

        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| CadenceError::NoProvider(format!("provider '{name}' not configured")))
    }

    /// Registered provider names, unordered
    pub fn list_providers(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    /// The fallback chain resolved against the registry, in attempt order.
    pub fn plan(&self) -> Vec<Attempt> {
        self.fallback_chain
            .iter()
            .map(|name| match self.providers.get(name) {
                Some(provider) => Attempt::Provider(Arc::clone(provider)),
                None => Attempt::Unregistered(name.clone()),
            })
            .collect()
    }

    /// Routed chat: the default provider alone when there is no chain,
    /// otherwise the first chain entry that answers.
    ///
    /// A chain holding only the default behaves exactly like no chain: one
    /// attempt, and the provider's own error is returned unchanged.
    pub async fn chat(&self, ctx: &CallContext, request: &ChatRequest) -> Result<ChatResponse> {
        if self.fallback_chain.is_empty() || self.fallback_chain == [self.default_provider.as_str()] {
            let provider = self.get_provider("")?;
            return provider.chat(ctx, request).await;
        }

        let mut last_error: Option<CadenceError> = None;
        for attempt in self.plan() {
            let provider = match attempt {
                Attempt::Provider(provider) => provider,
                Attempt::Unregistered(name) => {
                    debug!(provider = %name, "Skipping unregistered fallback provider");
                    last_error =
                        Some(CadenceError::NoProvider(format!("provider '{name}' not configured")));
                    continue;
                }
            };

            let name = provider.name().to_string();
            if !provider.is_available(ctx).await {
                debug!(provider = %name, "Skipping unavailable provider");
                last_error =
                    Some(CadenceError::Provider(format!("provider '{name}' is not available")));
                continue;
            }

            match provider.chat(ctx, request).await {
                Ok(response) => return Ok(response),
                Err(err @ CadenceError::Cancelled(_)) => return Err(err),
                Err(err) => {
                    warn!(provider = %name, error = %err, "Provider failed, trying next in chain");
                    last_error = Some(err);
                }
            }
        }

        if self.fallback_chain.len() == 1 {
            if let Some(err) = last_error {
                return Err(err);
            }
        }

        let cause = last_error.map_or_else(|| "empty fallback chain".to_string(), |e| e.to_string());
        Err(CadenceError::Provider(format!("all providers failed, last error: {cause}")))
    }

    /// Chat with one named provider, bypassing the fallback chain.
    pub async fn chat_with_provider(
        &self,
        ctx: &CallContext,
        name: &str,
        request: &ChatRequest,
    ) -> Result<ChatResponse> {
        let provider = self.get_provider(name)?;
        if !provider.is_available(ctx).await {
            return Err(CadenceError::Provider(format!(
                "provider '{}' is not available",
                provider.name()
            )));
        }
        provider.chat(ctx, request).await
    }
}
