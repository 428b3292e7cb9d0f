//! Context assembly
//!
//! Pure concatenation in a stable order: the file's diff, then each affected
//! symbol's body under an expanded-context heading, then each symbol's
//! usages, in symbol-appearance order. The result is substituted into the
//! review prompt template.

use super::ReviewContext;
use std::fmt::Write as _;

/// Render the context blob for one file.
pub fn assemble_context(context: &ReviewContext) -> String {
    let mut out = String::new();

    out.push_str(context.diff_text.trim_end());
    out.push('\n');

    for affected in &context.affected {
        if affected.body.is_empty() {
            continue;
        }
        let sym = &affected.symbol;
        let _ = write!(
            out,
            "\n>>> Expanded context: {} ({} lines {}-{})",
            sym.name, sym.file_path, sym.start_line, sym.end_line
        );
        if let Some(scope) = &sym.enclosing_scope {
            let _ = write!(out, " [in {}]", scope);
        }
        out.push('\n');
        out.push_str(&affected.body);
        out.push('\n');
    }

    for (affected, usages) in context.affected.iter().zip(&context.usages) {
        for usage in usages {
            let _ = write!(
                out,
                "\n>>> Usage of {} at {}:{}",
                affected.symbol.name, usage.file_path, usage.line_number
            );
            if !usage.enclosing_symbol.is_empty() {
                let _ = write!(out, " (in {})", usage.enclosing_symbol);
            }
            out.push('\n');
            out.push_str(usage.snippet.trim_end());
            out.push('\n');
        }
    }

    out
}
