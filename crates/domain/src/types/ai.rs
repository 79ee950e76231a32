//! Chat and tool-calling types shared by every LLM provider

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::impl_str_enum;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl_str_enum!(MessageRole {
    System => "system",
    User => "user",
    Assistant => "assistant",
    Tool => "tool",
});

/// A single role-tagged chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Call answered by a tool-role message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Calls requested by an assistant turn, replayed in follow-up requests
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self { role, content: content.into(), name: None, tool_call_id: None, tool_calls: Vec::new() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Assistant turn that asked for `calls`.
    pub fn assistant_with_tool_calls(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self { tool_calls: calls, ..Self::assistant(content) }
    }

    /// Tool output fed back to the model.
    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Tool, content)
    }

    /// Tool output answering the call with id `call_id`.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self { tool_call_id: Some(call_id.into()), ..Self::tool(content) }
    }
}

/// Request sent to a provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    /// Overrides the provider's configured model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub stream: bool,
}

impl ChatRequest {
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages, model: None, max_tokens: None, temperature: None, stream: false }
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Requested model, ignoring blank overrides.
    pub fn model_override(&self) -> Option<&str> {
        self.model.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }
}

/// Token accounting reported by a provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub const fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// A function invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub function: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    /// String argument by name, if present and a string.
    pub fn str_arg(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).and_then(Value::as_str)
    }
}

/// Provider reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default)]
    pub usage: TokenUsage,
    #[serde(default)]
    pub model: String,
    /// Name of the provider that served the request.
    #[serde(default)]
    pub provider: String,
}

/// Function description offered to the model
///
/// `parameters` is a JSON-schema object; its `required` array lists the
/// mandatory arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl Tool {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self { name: name.into(), description: description.into(), parameters }
    }

    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let msg = ChatMessage::tool("{\"status\":\"success\"}");
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["role"], "tool");
        assert!(json.get("name").is_none());
        assert_eq!("Assistant".parse::<MessageRole>().unwrap(), MessageRole::Assistant);
    }

    #[test]
    fn tool_round_messages_carry_call_ids() {
        let call = ToolCall { id: "call_7".into(), function: "checkDST".into(), arguments: Map::new() };
        let assistant = ChatMessage::assistant_with_tool_calls("", vec![call]);
        let result = ChatMessage::tool_result("call_7", "{}");

        assert_eq!(assistant.role, MessageRole::Assistant);
        assert_eq!(assistant.tool_calls[0].id, "call_7");
        assert_eq!(result.role, MessageRole::Tool);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["tool_call_id"], "call_7");
        assert!(json.get("tool_calls").is_none());
    }

    #[test]
    fn blank_model_override_is_ignored() {
        let req = ChatRequest::new(vec![ChatMessage::user("hi")]).with_model("  ");
        assert_eq!(req.model_override(), None);

        let req = req.with_model("gpt-4o");
        assert_eq!(req.model_override(), Some("gpt-4o"));
    }

    #[test]
    fn usage_totals_tokens() {
        assert_eq!(TokenUsage::new(12, 30).total_tokens, 42);
    }

    #[test]
    fn tool_lists_required_parameters() {
        let tool = Tool::new(
            "checkDST",
            "Check DST",
            json!({"type": "object", "properties": {}, "required": ["time", "timezone"]}),
        );
        assert_eq!(tool.required_parameters(), vec!["time", "timezone"]);

        let bare = Tool::new("noop", "", json!({"type": "object"}));
        assert!(bare.required_parameters().is_empty());
    }
}
