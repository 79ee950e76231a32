//! Shared JSON-over-HTTP plumbing for hosted LLM APIs

use std::time::Duration;

use cadence_core::{CallContext, LlmProvider, StreamCallback};
use cadence_domain::{CadenceError, ChatMessage, ChatRequest, Result, Tool};
use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use super::error::{ProviderError, DEFAULT_RETRY_AFTER_SECS};
use crate::errors::TIMEOUT_MESSAGE;
use crate::http::HttpClient;

/// Longest error body echoed back in an error message
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Connection settings plus request helpers common to every adapter
#[derive(Debug, Clone)]
pub struct JsonApiClient {
    provider: &'static str,
    http: HttpClient,
    api_key: String,
    model: String,
    base_url: String,
}

impl JsonApiClient {
    /// Client for `provider` rooted at `base_url`.
    ///
    /// # Errors
    /// `CadenceError::Config` when `base_url` is not an absolute URL.
    pub fn new(
        provider: &'static str,
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let parsed = Url::parse(base_url.trim()).map_err(|err| {
            CadenceError::Config(format!("invalid {provider} base URL '{base_url}': {err}"))
        })?;

        let http = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            provider,
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub const fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Configured model
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Model for one request: the request's override or the configured one.
    pub fn model_for<'a>(&'a self, request: &'a ChatRequest) -> &'a str {
        request.model_override().unwrap_or(&self.model)
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Fails unless an API key is configured.
    pub fn require_api_key(&self) -> std::result::Result<(), ProviderError> {
        if self.has_api_key() {
            Ok(())
        } else {
            Err(ProviderError::Authentication(format!("{} API key not configured", self.provider)))
        }
    }

    /// POST `body` as JSON to `path`, optionally with bearer auth and extra
    /// headers. The status is not checked here.
    pub async fn post_json<B>(
        &self,
        path: &str,
        body: &B,
        bearer: bool,
        headers: &[(&str, &str)],
    ) -> std::result::Result<Response, ProviderError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.url(path);
        let mut builder = self.http.post(&url).json(body);
        if bearer {
            builder = builder.bearer_auth(&self.api_key);
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        debug!(provider = self.provider, %url, "posting provider request");
        self.http.send(builder).await.map_err(|err| self.transport_error(err))
    }

    fn transport_error(&self, err: CadenceError) -> ProviderError {
        match err {
            CadenceError::Network(msg) if msg == TIMEOUT_MESSAGE => {
                ProviderError::Timeout(self.http.timeout())
            }
            CadenceError::Network(msg) => ProviderError::Network(msg),
            CadenceError::Auth(msg) => ProviderError::Authentication(msg),
            other => ProviderError::Network(other.to_string()),
        }
    }

    /// Decode a successful JSON body; map anything else to a `ProviderError`.
    pub async fn read_json<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> std::result::Result<T, ProviderError> {
        let response = self.ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| {
            ProviderError::InvalidResponse(format!("{} returned malformed JSON: {err}", self.provider))
        })
    }

    /// Pass a 2xx response through; turn any other status into an error.
    pub async fn ensure_success(
        &self,
        response: Response,
    ) -> std::result::Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);

        warn!(provider = self.provider, %status, error = %message, "provider request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::Authentication(message)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                ProviderError::RateLimit(retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS))
            }
            _ => ProviderError::Api { status: status.as_u16(), message },
        })
    }
}

/// Human-readable message from an error body.
///
/// Understands `{"error": {"message": ..}}` and `{"error": ".."}`; anything
/// else is returned as text, shortened.
pub fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        let error = value.get("error")?;
        error
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| error.as_str())
            .map(str::to_string)
    });

    from_json.unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            "empty response body".to_string()
        } else {
            trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
        }
    })
}

/// Chat message in OpenAI wire format
#[derive(Debug, Serialize)]
pub struct WireMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<WireToolCall<'a>>,
}

/// Tool call replayed on an assistant turn
#[derive(Debug, Serialize)]
pub struct WireToolCall<'a> {
    pub id: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: WireCallFunction<'a>,
}

#[derive(Debug, Serialize)]
pub struct WireCallFunction<'a> {
    pub name: &'a str,
    /// JSON-encoded string for OpenAI, a plain object for Ollama
    pub arguments: Value,
}

/// Function tool in OpenAI wire format
#[derive(Debug, Serialize)]
pub struct WireTool<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: WireFunction<'a>,
}

#[derive(Debug, Serialize)]
pub struct WireFunction<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub parameters: &'a Value,
}

/// Messages with tool-call arguments encoded as a JSON string.
pub fn openai_messages(messages: &[ChatMessage]) -> Vec<WireMessage<'_>> {
    wire_messages(messages, |arguments| Value::String(Value::Object(arguments.clone()).to_string()))
}

/// Messages with tool-call arguments shaped by `encode`.
pub fn wire_messages<'a>(
    messages: &'a [ChatMessage],
    encode: impl Fn(&Map<String, Value>) -> Value,
) -> Vec<WireMessage<'a>> {
    messages
        .iter()
        .map(|m| WireMessage {
            role: m.role.as_str(),
            content: &m.content,
            name: m.name.as_deref(),
            tool_call_id: m.tool_call_id.as_deref(),
            tool_calls: m
                .tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: &call.id,
                    kind: "function",
                    function: WireCallFunction { name: &call.function, arguments: encode(&call.arguments) },
                })
                .collect(),
        })
        .collect()
}

pub fn openai_tools(tools: &[Tool]) -> Vec<WireTool<'_>> {
    tools
        .iter()
        .map(|tool| WireTool {
            kind: "function",
            function: WireFunction {
                name: &tool.name,
                description: &tool.description,
                parameters: &tool.parameters,
            },
        })
        .collect()
}

/// Arguments sent as a JSON-encoded string. Anything but an object decodes
/// to an empty map.
pub fn decode_arguments(raw: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        _ => {
            if !raw.trim().is_empty() {
                debug!(arguments = %raw, "discarding undecodable tool arguments");
            }
            Map::new()
        }
    }
}

/// Streaming for backends without incremental output: one chat call, one
/// chunk.
pub async fn fallback_stream_chat<P>(
    provider: &P,
    ctx: &CallContext,
    request: &ChatRequest,
    callback: StreamCallback<'_>,
) -> Result<()>
where
    P: LlmProvider + ?Sized,
{
    let response = provider.chat(ctx, request).await?;
    callback(&response.content)
}
