//! Changed-line / symbol-range intersection
//!
//! A symbol is affected iff at least one changed line falls inside its
//! range, boundaries inclusive. Body extraction favors resilience: bounds
//! that make no sense produce an empty body, bounds past EOF clip.

use crate::diff::{ranges_intersect, LineRange};
use crate::symbols::Symbol;
use std::collections::HashSet;

/// A symbol touched by the diff, with its full source body.
#[derive(Debug, Clone)]
pub struct AffectedSymbol {
    pub symbol: Symbol,
    pub body: String,
}

/// Intersect changed lines against the supplied symbol list, preserving
/// supply order and dropping duplicates and degenerate ranges.
pub fn affected_symbols(
    changed: &[LineRange],
    symbols: &[Symbol],
    file_content: &str,
) -> Vec<AffectedSymbol> {
    let lines: Vec<&str> = file_content.lines().collect();
    let mut seen: HashSet<(String, usize, usize)> = HashSet::new();
    let mut affected = Vec::new();

    for symbol in symbols {
        if symbol.start_line == 0
            || symbol.start_line > symbol.end_line
            || symbol.start_line > lines.len()
        {
            continue;
        }
        if !ranges_intersect(changed, symbol.start_line, symbol.end_line) {
            continue;
        }
        let key = (symbol.name.clone(), symbol.start_line, symbol.end_line);
        if !seen.insert(key) {
            continue;
        }
        affected.push(AffectedSymbol {
            symbol: symbol.clone(),
            body: extract_symbol_content(symbol.start_line, symbol.end_line, &lines),
        });
    }
    affected
}

/// Slice `[start_line, end_line]` (1-based, inclusive) out of the file.
///
/// Returns an empty string when the range cannot be satisfied at all, and
/// the clipped available text when only `end_line` runs past EOF.
pub fn extract_symbol_content(start_line: usize, end_line: usize, lines: &[&str]) -> String {
    if start_line == 0 || start_line > end_line || start_line > lines.len() {
        return String::new();
    }
    let end = end_line.min(lines.len());
    lines[start_line - 1..end].join("\n")
}
