//! Bounded tool-calling review conversation
//!
//! The conversation is a small state machine: seed the history with the
//! rendered prompt, then alternate between waiting on the model and (when
//! the model asks) waiting on the human operator. A reply with a tool call
//! routes through the capability table; a reply with plain content ends the
//! conversation. The model gets a fixed number of turns and exhausting them
//! is a failure, not a silent approval.

use super::error::ReviewError;
use crate::llm::{FunctionSpec, Message, Provider, RawToolCall, ToolSpec};
use serde::Deserialize;
use serde_json::json;
use std::io::{BufRead, Write};

pub const ASK_HUMAN: &str = "ask_human";

/// A decoded, typed capability invocation. Decoding happens once, at the
/// wire boundary; everything past this point works with real types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    AskHuman { question: String },
}

/// The capabilities offered to the model for one conversation. Built
/// explicitly at startup; there is no global registry.
pub struct CapabilitySet {
    specs: Vec<ToolSpec>,
}

impl CapabilitySet {
    /// The standard review capability set: just `ask_human`.
    pub fn for_review() -> Self {
        Self {
            specs: vec![ToolSpec {
                tool_type: "function",
                function: FunctionSpec {
                    name: ASK_HUMAN,
                    description: "Ask the human operator a clarifying question about \
                                  intent or requirements that the code alone cannot answer. \
                                  Use sparingly.",
                    parameters: json!({
                        "type": "object",
                        "properties": {
                            "question": {
                                "type": "string",
                                "description": "The question to ask the human reviewer",
                            }
                        },
                        "required": ["question"],
                    }),
                },
            }],
        }
    }

    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    /// Decode a wire-level tool call into a typed capability. Unknown names
    /// and undecodable arguments both fail the conversation.
    pub fn decode(&self, raw: &RawToolCall) -> Result<Capability, ReviewError> {
        match raw.name.as_str() {
            ASK_HUMAN => {
                #[derive(Deserialize)]
                struct Args {
                    question: String,
                }
                let args: Args = serde_json::from_value(raw.arguments.clone())
                    .map_err(|_| {
                        ReviewError::InvalidToolCall(format!(
                            "{} called without a usable 'question' argument",
                            ASK_HUMAN
                        ))
                    })?;
                if args.question.trim().is_empty() {
                    return Err(ReviewError::InvalidToolCall(format!(
                        "{} called with an empty question",
                        ASK_HUMAN
                    )));
                }
                Ok(Capability::AskHuman { question: args.question })
            }
            other => Err(ReviewError::InvalidToolCall(other.to_string())),
        }
    }
}

/// Source of human answers for `ask_human`. Injected so conversations can
/// be driven in tests without a terminal.
pub trait OperatorPrompt {
    fn ask(&mut self, question: &str) -> anyhow::Result<String>;
}

/// Reads answers interactively from stdin.
pub struct ConsoleOperator;

impl OperatorPrompt for ConsoleOperator {
    fn ask(&mut self, question: &str) -> anyhow::Result<String> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "\n🤖 The model has a question:")?;
        writeln!(stdout, "   {}", question)?;
        write!(stdout, "Your answer: ")?;
        stdout.flush()?;

        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim().to_string())
    }
}

/// Run one bounded review conversation and return the model's terminal
/// reply text. The caller classifies the text separately.
pub fn run_conversation(
    provider: &dyn Provider,
    capabilities: &CapabilitySet,
    operator: &mut dyn OperatorPrompt,
    seed_prompt: &str,
    max_turns: usize,
) -> Result<String, ReviewError> {
    let mut history = vec![Message::user(seed_prompt)];

    for _ in 0..max_turns {
        let reply = provider
            .chat_with_tools(&history, capabilities.specs())
            .map_err(ReviewError::Transport)?;

        if !reply.tool_calls.is_empty() {
            for raw in &reply.tool_calls {
                match capabilities.decode(raw)? {
                    Capability::AskHuman { question } => {
                        let answer = operator
                            .ask(&question)
                            .map_err(ReviewError::Operator)?;
                        history.push(Message::assistant(question));
                        history.push(Message::user(answer));
                    }
                }
            }
            continue;
        }

        if reply.content.trim().is_empty() {
            return Err(ReviewError::EmptyResponse);
        }
        return Ok(reply.content);
    }

    Err(ReviewError::Exhausted(max_turns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatReply;
    use serde_json::Value;
    use std::cell::RefCell;

    /// Provider stub that replays a fixed script of replies and counts how
    /// many model turns the conversation consumed.
    struct ScriptedProvider {
        script: RefCell<Vec<ChatReply>>,
        calls: RefCell<usize>,
    }

    impl ScriptedProvider {
        fn new(mut script: Vec<ChatReply>) -> Self {
            script.reverse();
            Self { script: RefCell::new(script), calls: RefCell::new(0) }
        }

        fn calls(&self) -> usize {
            *self.calls.borrow()
        }
    }

    impl Provider for ScriptedProvider {
        fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
            unreachable!("conversations never use generate")
        }

        fn chat_with_tools(
            &self,
            _messages: &[Message],
            _tools: &[ToolSpec],
        ) -> anyhow::Result<ChatReply> {
            *self.calls.borrow_mut() += 1;
            self.script
                .borrow_mut()
                .pop()
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    struct CannedOperator {
        answer: &'static str,
        asked: Vec<String>,
    }

    impl OperatorPrompt for CannedOperator {
        fn ask(&mut self, question: &str) -> anyhow::Result<String> {
            self.asked.push(question.to_string());
            Ok(self.answer.to_string())
        }
    }

    fn ask_call(question: &str) -> ChatReply {
        ChatReply {
            content: String::new(),
            tool_calls: vec![RawToolCall {
                name: ASK_HUMAN.to_string(),
                arguments: json!({ "question": question }),
            }],
        }
    }

    fn text_reply(content: &str) -> ChatReply {
        ChatReply { content: content.to_string(), tool_calls: vec![] }
    }

    #[test]
    fn test_plain_content_completes_first_turn() {
        let provider = ScriptedProvider::new(vec![text_reply("APPROVED")]);
        let capabilities = CapabilitySet::for_review();
        let mut operator = CannedOperator { answer: "", asked: vec![] };
        let text =
            run_conversation(&provider, &capabilities, &mut operator, "review this", 10).unwrap();
        assert_eq!(text, "APPROVED");
        assert_eq!(provider.calls(), 1);
        assert!(operator.asked.is_empty());
    }

    #[test]
    fn test_question_then_answer_then_verdict() {
        let provider = ScriptedProvider::new(vec![
            ask_call("is the retry count intentional?"),
            text_reply("[]"),
        ]);
        let capabilities = CapabilitySet::for_review();
        let mut operator = CannedOperator { answer: "yes, three retries", asked: vec![] };
        let text =
            run_conversation(&provider, &capabilities, &mut operator, "review this", 10).unwrap();
        assert_eq!(text, "[]");
        assert_eq!(provider.calls(), 2);
        assert_eq!(operator.asked, vec!["is the retry count intentional?"]);
    }

    #[test]
    fn test_exhausted_after_exactly_max_turns() {
        let script: Vec<ChatReply> = (0..10).map(|i| ask_call(&format!("q{}", i))).collect();
        let provider = ScriptedProvider::new(script);
        let capabilities = CapabilitySet::for_review();
        let mut operator = CannedOperator { answer: "still unclear", asked: vec![] };
        let err = run_conversation(&provider, &capabilities, &mut operator, "review this", 10)
            .unwrap_err();
        match err {
            ReviewError::Exhausted(turns) => assert_eq!(turns, 10),
            other => panic!("expected exhaustion, got {:?}", other),
        }
        // The bound caps model turns, not total exchanges.
        assert_eq!(provider.calls(), 10);
        assert_eq!(operator.asked.len(), 10);
    }

    #[test]
    fn test_unknown_tool_fails_conversation() {
        let provider = ScriptedProvider::new(vec![ChatReply {
            content: String::new(),
            tool_calls: vec![RawToolCall { name: "run_shell".to_string(), arguments: Value::Null }],
        }]);
        let capabilities = CapabilitySet::for_review();
        let mut operator = CannedOperator { answer: "", asked: vec![] };
        let err = run_conversation(&provider, &capabilities, &mut operator, "review this", 10)
            .unwrap_err();
        match err {
            ReviewError::InvalidToolCall(name) => assert_eq!(name, "run_shell"),
            other => panic!("expected invalid tool call, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_question_argument_rejected() {
        let capabilities = CapabilitySet::for_review();
        let raw = RawToolCall { name: ASK_HUMAN.to_string(), arguments: json!({}) };
        assert!(matches!(
            capabilities.decode(&raw),
            Err(ReviewError::InvalidToolCall(_))
        ));
        let blank = RawToolCall {
            name: ASK_HUMAN.to_string(),
            arguments: json!({ "question": "   " }),
        };
        assert!(capabilities.decode(&blank).is_err());
    }

    #[test]
    fn test_empty_reply_is_an_error() {
        let provider = ScriptedProvider::new(vec![text_reply("   \n")]);
        let capabilities = CapabilitySet::for_review();
        let mut operator = CannedOperator { answer: "", asked: vec![] };
        let err = run_conversation(&provider, &capabilities, &mut operator, "review this", 10)
            .unwrap_err();
        assert!(matches!(err, ReviewError::EmptyResponse));
    }
}
