//! Diff-to-symbol context engine
//!
//! Builds the per-file review context: intersect exact changed lines with
//! symbol ranges, slice the affected symbol bodies, expand cross-reference
//! usages, and assemble everything into one context blob for the prompt.

pub mod assemble;
pub mod intersect;
pub mod usages;

use crate::diff::LineRange;
use crate::symbols::{ExtractorRegistry, Symbol};
use intersect::{affected_symbols, AffectedSymbol};
use usages::{Usage, UsageExpander};

/// Everything the review conversation needs for one file. Owned by that
/// file's review and dropped when its report entry is produced.
#[derive(Debug)]
pub struct ReviewContext {
    pub file_path: String,
    pub diff_text: String,
    pub affected: Vec<AffectedSymbol>,
    /// Usages aligned index-for-index with `affected`.
    pub usages: Vec<Vec<Usage>>,
}

impl ReviewContext {
    /// A context with no symbol information; the file is still reviewed
    /// against its diff alone.
    pub fn bare(file_path: &str, diff_text: &str) -> Self {
        Self {
            file_path: file_path.to_string(),
            diff_text: diff_text.to_string(),
            affected: Vec::new(),
            usages: Vec::new(),
        }
    }
}

/// Build the full review context for one changed file.
pub fn build_review_context(
    file_path: &str,
    diff_text: &str,
    changed: &[LineRange],
    symbols: &[Symbol],
    file_content: &str,
    registry: &ExtractorRegistry,
    expander: &UsageExpander,
) -> ReviewContext {
    let affected = affected_symbols(changed, symbols, file_content);
    let usages = affected
        .iter()
        .map(|a| expander.expand(&a.symbol, registry))
        .collect();

    ReviewContext {
        file_path: file_path.to_string(),
        diff_text: diff_text.to_string(),
        affected,
        usages,
    }
}
