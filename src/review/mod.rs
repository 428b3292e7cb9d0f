//! Review orchestration
//!
//! Drives one staged-change review end to end: per changed file, build the
//! symbol-aware context, run the bounded conversation, and classify the
//! terminal reply. Files are reviewed sequentially and independently; a
//! failure on one file is recorded and the run moves on to the next.

pub mod classify;
pub mod conversation;
pub mod error;

use crate::diff::{parse_changed_lines, split_diff_by_file, LineRange};
use crate::engine::assemble::assemble_context;
use crate::engine::usages::UsageExpander;
use crate::engine::{build_review_context, ReviewContext};
use crate::llm::Provider;
use crate::prompt::PromptVariant;
use crate::search::XrefSearch;
use crate::symbols::ExtractorRegistry;
use classify::classify_response;
use conversation::{run_conversation, CapabilitySet, OperatorPrompt};
use error::ReviewError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Maximum characters of the offending response carried inside a format
/// violation.
pub(crate) const RESPONSE_EXCERPT_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    Warning,
    Minor,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Warning => "WARNING",
            Severity::Minor => "MINOR",
        }
    }
}

/// One finding reported by the model, in the shape the response contract
/// demands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub file_path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub description: String,
}

/// A file whose review aborted, with the reason. The rest of the run is
/// unaffected.
#[derive(Debug)]
pub struct FileFailure {
    pub file_path: String,
    pub error: ReviewError,
}

#[derive(Debug, Default)]
pub struct RunOutcome {
    pub issues: Vec<Issue>,
    pub failures: Vec<FileFailure>,
    pub reviewed_files: usize,
}

/// Everything a review run needs, wired up by the caller.
pub struct ReviewRun<'a> {
    pub provider: &'a dyn Provider,
    pub registry: &'a ExtractorRegistry,
    pub search: &'a dyn XrefSearch,
    pub operator: &'a mut dyn OperatorPrompt,
    pub template: &'a PromptVariant,
    pub root: PathBuf,
    pub max_turns: usize,
    pub usage_context_lines: usize,
}

impl ReviewRun<'_> {
    /// Review every changed file in `files` against the staged diff.
    pub fn run(&mut self, diff: &str, files: &[String]) -> RunOutcome {
        let changed = parse_changed_lines(diff);
        let segments = split_diff_by_file(diff);
        let mut outcome = RunOutcome::default();

        for file_path in files {
            let Some(segment) = segments.get(file_path) else {
                // Deleted files and binary changes have no reviewable segment.
                continue;
            };
            let ranges = changed.get(file_path).map(Vec::as_slice).unwrap_or(&[]);

            println!("  reviewing {}", file_path);
            outcome.reviewed_files += 1;
            match self.review_file(file_path, segment, ranges) {
                Ok(mut issues) => outcome.issues.append(&mut issues),
                Err(error) => {
                    eprintln!("  review of {} failed: {}", file_path, error);
                    outcome.failures.push(FileFailure {
                        file_path: file_path.clone(),
                        error,
                    });
                }
            }
        }
        outcome
    }

    fn review_file(
        &mut self,
        file_path: &str,
        segment: &str,
        changed: &[LineRange],
    ) -> Result<Vec<Issue>, ReviewError> {
        let context = self.build_context(file_path, segment, changed);
        let prompt = self.template.render(&assemble_context(&context));

        let capabilities = CapabilitySet::for_review();
        let reply = run_conversation(
            self.provider,
            &capabilities,
            self.operator,
            &prompt,
            self.max_turns,
        )?;
        classify_response(&reply)
    }

    fn build_context(
        &self,
        file_path: &str,
        segment: &str,
        changed: &[LineRange],
    ) -> ReviewContext {
        let Ok(content) = fs::read_to_string(self.root.join(file_path)) else {
            return ReviewContext::bare(file_path, segment);
        };
        let symbols = self.registry.extract(file_path, &content);
        if symbols.is_empty() {
            return ReviewContext::bare(file_path, segment);
        }
        let expander = UsageExpander::new(self.search, &self.root, self.usage_context_lines);
        build_review_context(
            file_path,
            segment,
            changed,
            &symbols,
            &content,
            self.registry,
            &expander,
        )
    }
}
