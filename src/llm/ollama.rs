//! Ollama backend (`/api/generate` and `/api/chat`)
//!
//! Some models ignore the tool-call channel and emit the invocation as a
//! fenced JSON object in plain content; that shape is recognized and
//! promoted to a proper tool call.

use super::{truncate_str, ChatReply, Message, Provider, RawToolCall, ToolSpec};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub struct OllamaProvider {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSpec]>,
    stream: bool,
    options: Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<OllamaToolCall>,
}

#[derive(Deserialize)]
struct OllamaToolCall {
    function: OllamaFunctionCall,
}

#[derive(Deserialize)]
struct OllamaFunctionCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn post(&self, path: &str, body: &impl Serialize) -> anyhow::Result<String> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            anyhow::bail!(
                "ollama request failed with status {}: {}",
                status,
                truncate_str(&text, 200)
            );
        }
        Ok(text)
    }
}

impl Provider for OllamaProvider {
    fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let request = GenerateRequest { model: &self.model, prompt, stream: false };
        let text = self.post("/api/generate", &request)?;
        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("failed to parse ollama response: {}", e))?;
        Ok(parsed.response)
    }

    fn chat_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> anyhow::Result<ChatReply> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            tools: (!tools.is_empty()).then_some(tools),
            stream: false,
            options: json!({
                "num_ctx": 16384,
                "temperature": 0.2,
                "repeat_penalty": 1.1,
                "top_k": 40,
            }),
        };

        let text = self.post("/api/chat", &request)?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("failed to parse ollama chat response: {}", e))?;

        let mut reply = ChatReply {
            content: parsed.message.content,
            tool_calls: parsed
                .message
                .tool_calls
                .into_iter()
                .map(|tc| RawToolCall {
                    name: tc.function.name,
                    arguments: tc.function.arguments,
                })
                .collect(),
        };

        if reply.tool_calls.is_empty() {
            if let Some(call) = tool_call_from_content(&reply.content) {
                reply.tool_calls.push(call);
                reply.content.clear();
            }
        }
        Ok(reply)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Recognize a bare or fenced JSON object of shape `{"name": ..,
/// "arguments": ..}` emitted as plain content instead of a tool call.
fn tool_call_from_content(content: &str) -> Option<RawToolCall> {
    let mut text = content.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest.strip_suffix("```").unwrap_or(rest).trim();
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest.strip_suffix("```").unwrap_or(rest).trim();
    }

    if !text.starts_with('{') {
        return None;
    }

    #[derive(Deserialize)]
    struct InlineCall {
        name: String,
        #[serde(default)]
        arguments: Value,
    }

    let call: InlineCall = serde_json::from_str(text).ok()?;
    if call.name.is_empty() {
        return None;
    }
    Some(RawToolCall { name: call.name, arguments: call.arguments })
}
