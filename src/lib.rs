//! difflens: symbol-aware LLM review of staged git changes
//!
//! The pipeline per staged file: parse the diff into exact changed lines,
//! intersect them with tree-sitter symbol ranges, expand the affected
//! symbols with their bodies and cross-reference usage sites, then run a
//! bounded tool-calling conversation with the model and classify its
//! terminal reply into issues or an approval.

pub mod config;
pub mod diff;
pub mod engine;
pub mod git_ops;
pub mod llm;
pub mod prompt;
pub mod report;
pub mod review;
pub mod search;
pub mod spinner;
pub mod symbols;
