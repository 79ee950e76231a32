//! Anthropic Messages API adapter

use std::time::Duration;

use async_trait::async_trait;
use cadence_core::{CallContext, LlmProvider, StreamCallback};
use cadence_domain::constants::{DEFAULT_CLAUDE_MODEL, PROVIDER_CLAUDE};
use cadence_domain::{
    CadenceError, ChatMessage, ChatRequest, ChatResponse, MessageRole, ProviderConfig, Result,
    TokenUsage, Tool, ToolCall,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::base::JsonApiClient;
use super::error::ProviderError;
use super::stream::{for_each_line, sse_data};

pub const DEFAULT_CLAUDE_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The Messages API requires `max_tokens`
pub const DEFAULT_CLAUDE_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ClaudeMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ClaudeTool<'a>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ClaudeTool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    model: String,
    #[serde(default)]
    usage: ClaudeUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Map<String, Value>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
struct ClaudeUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

/// One server-sent event of a streamed response
#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    delta: Option<StreamDelta>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    text: Option<String>,
}

/// Claude through the Anthropic Messages API
#[derive(Debug, Clone)]
pub struct ClaudeProvider {
    api: JsonApiClient,
}

impl ClaudeProvider {
    /// # Errors
    /// `CadenceError::Config` for an unusable base URL.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let base_url = config.base_url.as_deref().filter(|u| !u.trim().is_empty());
        let api = JsonApiClient::new(
            PROVIDER_CLAUDE,
            base_url.unwrap_or(DEFAULT_CLAUDE_BASE_URL),
            config.api_key.clone(),
            config.model_or(DEFAULT_CLAUDE_MODEL),
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self { api })
    }

    fn build_request<'a>(
        &'a self,
        request: &'a ChatRequest,
        tools: &'a [Tool],
        stream: bool,
    ) -> MessagesRequest<'a> {
        let (system, messages) = split_system(&request.messages);
        MessagesRequest {
            model: self.api.model_for(request),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_CLAUDE_MAX_TOKENS),
            messages,
            system,
            temperature: request.temperature,
            tools: tools
                .iter()
                .map(|tool| ClaudeTool {
                    name: &tool.name,
                    description: &tool.description,
                    input_schema: &tool.parameters,
                })
                .collect(),
            stream,
        }
    }

    async fn send(
        &self,
        request: &ChatRequest,
        tools: &[Tool],
    ) -> std::result::Result<ChatResponse, ProviderError> {
        self.api.require_api_key()?;

        let body = self.build_request(request, tools, false);
        let response = self
            .api
            .post_json("/v1/messages", &body, false, &self.headers())
            .await?;
        let reply: MessagesResponse = self.api.read_json(response).await?;

        let model = if reply.model.is_empty() {
            self.api.model_for(request).to_string()
        } else {
            reply.model
        };
        Ok(into_chat_response(reply.content, reply.usage, model))
    }

    fn headers(&self) -> [(&str, &str); 2] {
        [("x-api-key", self.api.api_key()), ("anthropic-version", ANTHROPIC_VERSION)]
    }
}

/// System turns go into the top-level `system` field; tool output is sent
/// back as a user turn. Empty turns, such as an assistant turn that only
/// requested tools, are dropped because the API rejects empty content.
fn split_system(messages: &[ChatMessage]) -> (Option<String>, Vec<ClaudeMessage<'_>>) {
    let mut system = Vec::new();
    let mut turns = Vec::with_capacity(messages.len());

    for message in messages {
        if message.content.trim().is_empty() {
            continue;
        }
        match message.role {
            MessageRole::System => system.push(message.content.as_str()),
            MessageRole::Assistant => {
                turns.push(ClaudeMessage { role: "assistant", content: &message.content });
            }
            MessageRole::User | MessageRole::Tool => {
                turns.push(ClaudeMessage { role: "user", content: &message.content });
            }
        }
    }

    let system = if system.is_empty() { None } else { Some(system.join("\n\n")) };
    (system, turns)
}

fn into_chat_response(blocks: Vec<ContentBlock>, usage: ClaudeUsage, model: String) -> ChatResponse {
    let mut content = String::new();
    let mut tool_calls = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text } => content.push_str(&text),
            ContentBlock::ToolUse { id, name, input } => {
                tool_calls.push(ToolCall { id, function: name, arguments: input });
            }
            ContentBlock::Other => {}
        }
    }

    ChatResponse {
        content,
        tool_calls,
        usage: TokenUsage::new(usage.input_tokens, usage.output_tokens),
        model,
        provider: PROVIDER_CLAUDE.to_string(),
    }
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    fn name(&self) -> &str {
        PROVIDER_CLAUDE
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
        ctx.run(async {
            self.api.require_api_key()?;

            let body = self.build_request(request, &[], true);
            let response =
                self.api.post_json("/v1/messages", &body, false, &self.headers()).await?;
            let response = self.api.ensure_success(response).await?;

            for_each_line(response, |line| {
                let Some(data) = sse_data(line) else {
                    return Ok(true);
                };
                let event: StreamEvent = serde_json::from_str(data).map_err(ProviderError::from)?;
                match event.kind.as_str() {
                    "content_block_delta" => {
                        if let Some(text) = event.delta.and_then(|d| d.text) {
                            callback(&text)?;
                        }
                        Ok(true)
                    }
                    "message_stop" => Ok(false),
                    "error" => Err(CadenceError::Provider(format!(
                        "claude stream error: {}",
                        event.error.unwrap_or_default()
                    ))),
                    other => {
                        debug!(event = other, "ignoring stream event");
                        Ok(true)
                    }
                }
            })
            .await
        })
        .await
    }
}
