//! Per-file review error taxonomy
//!
//! Every variant aborts only the current file's review; the driver logs it
//! and moves on. `FormatViolation` is deliberately distinguishable from the
//! transport-side failures so callers can tell "the model ignored the
//! response contract" apart from "the network failed".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("model transport failed: {0}")]
    Transport(#[source] anyhow::Error),

    #[error("operator input failed: {0}")]
    Operator(#[source] anyhow::Error),

    #[error("invalid tool call: {0}")]
    InvalidToolCall(String),

    #[error("model returned neither content nor a tool call")]
    EmptyResponse,

    #[error("conversation exhausted after {0} model turns without a terminal reply")]
    Exhausted(usize),

    #[error("format violation: {reason}. Response: {response}")]
    FormatViolation { reason: String, response: String },
}

impl ReviewError {
    pub fn is_format_violation(&self) -> bool {
        matches!(self, ReviewError::FormatViolation { .. })
    }
}
