//! OpenAI-compatible backend (`/v1/chat/completions`)
//!
//! Works against any server speaking the chat-completions shape, local or
//! hosted; the bearer key is optional for local inference servers.

use super::{truncate_str, ChatReply, Message, Provider, RawToolCall, ToolSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub struct OpenAiProvider {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSpec]>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<OpenAiToolCall>,
}

#[derive(Deserialize)]
struct OpenAiToolCall {
    function: OpenAiFunctionCall,
}

#[derive(Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    /// The chat-completions API carries arguments as a JSON string.
    #[serde(default)]
    arguments: String,
}

impl OpenAiProvider {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn chat(&self, messages: &[Message], tools: &[ToolSpec]) -> anyhow::Result<ChatReply> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            tools: (!tools.is_empty()).then_some(tools),
            stream: false,
        };

        let mut builder = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send()?;
        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            anyhow::bail!(
                "chat completions request failed with status {}: {}",
                status,
                truncate_str(&text, 200)
            );
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("failed to parse chat completions response: {}", e))?;
        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| anyhow::anyhow!("chat completions response had no choices"))?;

        Ok(ChatReply {
            content: message.content.unwrap_or_default(),
            tool_calls: message
                .tool_calls
                .into_iter()
                .map(|tc| RawToolCall {
                    name: tc.function.name,
                    arguments: parse_arguments(&tc.function.arguments),
                })
                .collect(),
        })
    }
}

fn parse_arguments(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or(Value::Null)
}

impl Provider for OpenAiProvider {
    fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let reply = self.chat(&[Message::user(prompt)], &[])?;
        Ok(reply.content)
    }

    fn chat_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> anyhow::Result<ChatReply> {
        self.chat(messages, tools)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
