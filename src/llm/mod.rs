//! Model transport layer
//!
//! Two operations, both synchronous: plain prompt completion and a chat
//! call that carries the conversation history plus the declared tool set.
//! Backends are selected by name from the config; the review engine only
//! sees the `Provider` trait.

pub mod ollama;
pub mod openai;

use crate::config::LlmConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the append-only conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }
}

/// A callable capability declared to the model, in the common
/// `{"type": "function", "function": {...}}` wire shape.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub tool_type: &'static str,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// A tool invocation as it came off the wire, before decoding into a
/// typed capability at the conversation boundary.
#[derive(Debug, Clone)]
pub struct RawToolCall {
    pub name: String,
    pub arguments: Value,
}

/// Reply to a `chat_with_tools` call.
#[derive(Debug, Clone, Default)]
pub struct ChatReply {
    pub content: String,
    pub tool_calls: Vec<RawToolCall>,
}

/// Backend-agnostic model transport. Both calls block until the backend
/// answers; no timeout is imposed beyond what the backend enforces.
pub trait Provider {
    fn generate(&self, prompt: &str) -> anyhow::Result<String>;

    fn chat_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> anyhow::Result<ChatReply>;

    fn model(&self) -> &str;
}

pub const SUPPORTED_PROVIDERS: &[&str] = &["ollama", "openai"];

/// Construct the configured backend. Unknown provider names are a
/// configuration error, not a fallback.
pub fn create_provider(config: &LlmConfig) -> anyhow::Result<Box<dyn Provider>> {
    match config.provider.as_str() {
        "ollama" => Ok(Box::new(ollama::OllamaProvider::new(
            &config.base_url,
            &config.model,
        ))),
        "openai" => Ok(Box::new(openai::OpenAiProvider::new(
            &config.base_url,
            &config.model,
            config.api_key.clone(),
        ))),
        other => anyhow::bail!(
            "unsupported LLM provider '{}' (supported: {})",
            other,
            SUPPORTED_PROVIDERS.join(", ")
        ),
    }
}

/// Truncate a string for error messages (Unicode-safe).
pub(crate) fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
