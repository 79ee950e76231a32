//! Local Ollama server adapter

use std::time::Duration;

use async_trait::async_trait;
use cadence_core::{CallContext, LlmProvider, StreamCallback};
use cadence_domain::constants::{DEFAULT_OLLAMA_HOST, DEFAULT_OLLAMA_MODEL, PROVIDER_OLLAMA};
use cadence_domain::{
    CadenceError, ChatRequest, ChatResponse, OllamaConfig, Result, TokenUsage, Tool, ToolCall,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::base::{openai_tools, wire_messages, JsonApiClient, WireMessage, WireTool};
use super::error::ProviderError;
use super::stream::for_each_line;
use crate::http::HttpClient;

/// Budget for the `/api/tags` availability probe
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Options::is_empty")]
    options: Options,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
}

#[derive(Debug, Default, Serialize)]
struct Options {
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl Options {
    const fn is_empty(&self) -> bool {
        self.num_predict.is_none() && self.temperature.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

#[derive(Debug, Default, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<OllamaToolCall>,
}

#[derive(Debug, Deserialize)]
struct OllamaToolCall {
    function: OllamaFunction,
}

#[derive(Debug, Deserialize)]
struct OllamaFunction {
    name: String,
    #[serde(default)]
    arguments: Map<String, Value>,
}

/// Models served by a local Ollama instance
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    api: JsonApiClient,
    probe: HttpClient,
}

impl OllamaProvider {
    /// # Errors
    /// `CadenceError::Config` for an unusable host URL.
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let host = if config.host.trim().is_empty() { DEFAULT_OLLAMA_HOST } else { &config.host };
        let model =
            if config.model.trim().is_empty() { DEFAULT_OLLAMA_MODEL } else { &config.model };

        let api = JsonApiClient::new(
            PROVIDER_OLLAMA,
            host,
            "",
            model,
            Duration::from_secs(config.timeout_secs),
        )?;
        let probe = HttpClient::builder().timeout(PROBE_TIMEOUT).max_attempts(1).build()?;
        Ok(Self { api, probe })
    }

    fn build_request<'a>(
        &'a self,
        request: &'a ChatRequest,
        tools: &'a [Tool],
        stream: bool,
    ) -> OllamaChatRequest<'a> {
        OllamaChatRequest {
            model: self.api.model_for(request),
            messages: wire_messages(&request.messages, |arguments| Value::Object(arguments.clone())),
            stream,
            options: Options { num_predict: request.max_tokens, temperature: request.temperature },
            tools: openai_tools(tools),
        }
    }

    async fn send(
        &self,
        request: &ChatRequest,
        tools: &[Tool],
    ) -> std::result::Result<ChatResponse, ProviderError> {
        let body = self.build_request(request, tools, false);
        let response = self.api.post_json("/api/chat", &body, false, &[]).await?;
        let reply: OllamaChatResponse = self.api.read_json(response).await?;

        let message = reply.message.unwrap_or_default();
        let tool_calls = message
            .tool_calls
            .into_iter()
            .enumerate()
            .map(|(index, call)| ToolCall {
                id: format!("call_{index}"),
                function: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        Ok(ChatResponse {
            content: message.content,
            tool_calls,
            usage: TokenUsage::new(reply.prompt_eval_count, reply.eval_count),
            model: if reply.model.is_empty() {
                self.api.model_for(request).to_string()
            } else {
                reply.model
            },
            provider: PROVIDER_OLLAMA.to_string(),
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        PROVIDER_OLLAMA
    }

    /// Reachable when `/api/tags` answers 200.
    async fn is_available(&self, ctx: &CallContext) -> bool {
        let url = self.api.url("/api/tags");
        let probe = ctx.run(async { self.probe.send(self.probe.get(&url)).await }).await;
        match probe {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(%url, error = %err, "ollama not reachable");
                false
            }
        }
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
            let body = self.build_request(request, &[], true);
            let response = self.api.post_json("/api/chat", &body, false, &[]).await?;
            let response = self.api.ensure_success(response).await?;

            for_each_line(response, |line| {
                if line.trim().is_empty() {
                    return Ok(true);
                }
                let chunk: OllamaChatResponse =
                    serde_json::from_str(line).map_err(ProviderError::from)?;
                if let Some(message) = chunk.message.filter(|m| !m.content.is_empty()) {
                    callback(&message.content)?;
                }
                Ok(!chunk.done)
            })
            .await
        })
        .await
    }
}
