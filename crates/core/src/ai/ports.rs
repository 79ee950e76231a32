//! Port interfaces for language-model backends and tool execution

use async_trait::async_trait;
use cadence_domain::{ChatRequest, ChatResponse, Result, Tool};
use serde_json::{Map, Value};

use crate::context::CallContext;

/// Receives streamed text chunks. Returning an error stops the stream.
pub type StreamCallback<'a> = &'a mut (dyn FnMut(&str) -> Result<()> + Send);

/// Uniform capability surface of one LLM backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Registry name, e.g. "claude"
    fn name(&self) -> &str;

    /// Whether the backend can take requests right now
    async fn is_available(&self, ctx: &CallContext) -> bool;

    /// Single chat completion
    async fn chat(&self, ctx: &CallContext, request: &ChatRequest) -> Result<ChatResponse>;

    /// Chat completion with a function-calling catalogue
    async fn chat_with_tools(
        &self,
        ctx: &CallContext,
        request: &ChatRequest,
        tools: &[Tool],
    ) -> Result<ChatResponse>;

    /// Stream the completion through `callback`
    async fn stream_chat(
        &self,
        ctx: &CallContext,
        request: &ChatRequest,
        callback: StreamCallback<'_>,
    ) -> Result<()>;
}

/// Executes a tool the model asked for and returns its textual result
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(
        &self,
        ctx: &CallContext,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<String>;
}
