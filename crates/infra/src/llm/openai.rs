//! OpenAI-compatible chat completions adapter, used for OpenAI and Groq

use std::time::Duration;

use async_trait::async_trait;
use cadence_core::{CallContext, LlmProvider, StreamCallback};
use cadence_domain::constants::{
    DEFAULT_GROQ_MODEL, DEFAULT_OPENAI_MODEL, PROVIDER_GROQ, PROVIDER_OPENAI,
};
use cadence_domain::{
    CadenceError, ChatRequest, ChatResponse, ProviderConfig, Result, TokenUsage, Tool, ToolCall,
};
use serde::{Deserialize, Serialize};

use super::base::{
    decode_arguments, fallback_stream_chat, openai_messages, openai_tools, JsonApiClient,
    WireMessage, WireTool,
};
use super::error::ProviderError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    function: WireFunctionCall,
}

#[derive(Debug, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

/// Any backend speaking the OpenAI chat completions protocol
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    name: &'static str,
    api: JsonApiClient,
}

impl OpenAiCompatibleProvider {
    /// OpenAI proper
    pub fn openai(config: &ProviderConfig) -> Result<Self> {
        Self::with_defaults(PROVIDER_OPENAI, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL, config)
    }

    /// Groq's OpenAI-compatible endpoint
    pub fn groq(config: &ProviderConfig) -> Result<Self> {
        Self::with_defaults(PROVIDER_GROQ, DEFAULT_GROQ_BASE_URL, DEFAULT_GROQ_MODEL, config)
    }

    fn with_defaults(
        name: &'static str,
        base_url: &str,
        model: &str,
        config: &ProviderConfig,
    ) -> Result<Self> {
        let base_url =
            config.base_url.as_deref().filter(|u| !u.trim().is_empty()).unwrap_or(base_url);
        let api = JsonApiClient::new(
            name,
            base_url,
            config.api_key.clone(),
            config.model_or(model),
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self { name, api })
    }

    async fn send(
        &self,
        request: &ChatRequest,
        tools: &[Tool],
    ) -> std::result::Result<ChatResponse, ProviderError> {
        self.api.require_api_key()?;

        let body = CompletionRequest {
            model: self.api.model_for(request),
            messages: openai_messages(&request.messages),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            tools: openai_tools(tools),
        };
        let response = self.api.post_json("/chat/completions", &body, true, &[]).await?;
        let reply: CompletionResponse = self.api.read_json(response).await?;

        let choice = reply.choices.into_iter().next().ok_or_else(|| {
            ProviderError::InvalidResponse(format!("{} returned no choices", self.name))
        })?;

        let tool_calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                arguments: decode_arguments(&call.function.arguments),
                function: call.function.name,
            })
            .collect();

        let usage = reply.usage.map_or_else(TokenUsage::default, |u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            usage,
            model: if reply.model.is_empty() {
                self.api.model_for(request).to_string()
            } else {
                reply.model
            },
            provider: self.name.to_string(),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn is_available(&self, _ctx: &CallContext) -> bool {
        self.api.has_api_key()
    }

    async fn chat(&self, ctx: &CallContext, request: &ChatRequest) -> Result<ChatResponse> {
        ctx.run(async { self.send(request, &[]).await.map_err(CadenceError::from) }).await
    }

    async fn chat_with_tools(
        &self,
        ctx: &CallContext,
        request: &ChatRequest,
        tools: &[Tool],
    ) -> Result<ChatResponse> {
        ctx.run(async { self.send(request, tools).await.map_err(CadenceError::from) }).await
    }

    async fn stream_chat(
        &self,
        ctx: &CallContext,
        request: &ChatRequest,
        callback: StreamCallback<'_>,
    ) -> Result<()> {
        fallback_stream_chat(self, ctx, request, callback).await
    }
}
