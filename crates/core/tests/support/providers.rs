use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cadence_core::{CallContext, LlmProvider, StreamCallback};
use cadence_domain::{CadenceError, ChatRequest, ChatResponse, Result as DomainResult, Tool, TokenUsage};

/// LLM provider that replays queued answers and records every request.
///
/// `chat` and `chat_with_tools` share one queue. An exhausted queue fails
/// with a provider error, like a backend that stopped answering.
pub struct ScriptedProvider {
    name: String,
    available: AtomicBool,
    replies: Mutex<VecDeque<DomainResult<ChatResponse>>>,
    requests: Mutex<Vec<ChatRequest>>,
    tool_requests: Mutex<Vec<Vec<Tool>>>,
}

impl ScriptedProvider {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            available: AtomicBool::new(true),
            replies: Mutex::default(),
            requests: Mutex::default(),
            tool_requests: Mutex::default(),
        })
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Queue a plain text answer.
    pub fn reply(self: &Arc<Self>, content: &str) -> Arc<Self> {
        let response = text_response(&self.name, content);
        self.replies.lock().unwrap().push_back(Ok(response));
        Arc::clone(self)
    }

    /// Queue a full response.
    pub fn respond(self: &Arc<Self>, response: ChatResponse) -> Arc<Self> {
        self.replies.lock().unwrap().push_back(Ok(response));
        Arc::clone(self)
    }

    /// Queue a failure.
    pub fn fail(self: &Arc<Self>, error: CadenceError) -> Arc<Self> {
        self.replies.lock().unwrap().push_back(Err(error));
        Arc::clone(self)
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn tool_requests(&self) -> Vec<Vec<Tool>> {
        self.tool_requests.lock().unwrap().clone()
    }

    fn next(&self, request: &ChatRequest) -> DomainResult<ChatResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CadenceError::Provider(format!("{} has no scripted reply", self.name))))
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self, _ctx: &CallContext) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn chat(&self, ctx: &CallContext, request: &ChatRequest) -> DomainResult<ChatResponse> {
        ctx.check()?;
        self.next(request)
    }

    async fn chat_with_tools(
        &self,
        ctx: &CallContext,
        request: &ChatRequest,
        tools: &[Tool],
    ) -> DomainResult<ChatResponse> {
        ctx.check()?;
        self.tool_requests.lock().unwrap().push(tools.to_vec());
        self.next(request)
    }

    async fn stream_chat(
        &self,
        ctx: &CallContext,
        request: &ChatRequest,
        callback: StreamCallback<'_>,
    ) -> DomainResult<()> {
        ctx.check()?;
        let response = self.next(request)?;
        for word in response.content.split_inclusive(' ') {
            callback(word)?;
        }
        Ok(())
    }
}

pub fn text_response(provider: &str, content: &str) -> ChatResponse {
    ChatResponse {
        content: content.to_string(),
        tool_calls: Vec::new(),
        usage: TokenUsage { prompt_tokens: 40, completion_tokens: 20, total_tokens: 60 },
        model: format!("{provider}-test"),
        provider: provider.to_string(),
    }
}
