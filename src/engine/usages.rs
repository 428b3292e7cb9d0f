//! Usage expansion
//!
//! For each affected symbol, asks the cross-reference search where else the
//! identifier appears, labels every occurrence with its enclosing symbol,
//! and captures a marked snippet window around the usage line. A failed
//! search degrades to "no usages"; it never fails the review.

use crate::search::XrefSearch;
use crate::symbols::{ExtractorRegistry, Symbol};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// One occurrence of an affected symbol's identifier elsewhere in the tree.
#[derive(Debug, Clone)]
pub struct Usage {
    pub file_path: String,
    pub line_number: usize,
    /// Name of the enclosing symbol, empty when none could be resolved.
    pub enclosing_symbol: String,
    /// Numbered context window with the usage line marked.
    pub snippet: String,
}

pub struct UsageExpander<'a> {
    search: &'a dyn XrefSearch,
    root: PathBuf,
    /// Lines of context captured above and below the usage line.
    context_lines: usize,
}

impl<'a> UsageExpander<'a> {
    pub fn new(search: &'a dyn XrefSearch, root: &Path, context_lines: usize) -> Self {
        Self {
            search,
            root: root.to_path_buf(),
            context_lines,
        }
    }

    /// All usages of `symbol` outside its own declaration.
    pub fn expand(&self, symbol: &Symbol, registry: &ExtractorRegistry) -> Vec<Usage> {
        let occurrences = match self.search.find_occurrences(&symbol.name, &self.root) {
            Ok(found) => found,
            Err(err) => {
                eprintln!("  warning: usage search for '{}' failed: {}", symbol.name, err);
                return Vec::new();
            }
        };

        let mut usages = Vec::new();
        for occ in occurrences {
            // The declaration itself is already in the expanded body.
            if occ.file_path == symbol.file_path && symbol.contains_line(occ.line_number) {
                continue;
            }

            let content = fs::read_to_string(self.root.join(&occ.file_path)).unwrap_or_default();
            let enclosing = registry
                .enclosing_symbol_at(&occ.file_path, &content, occ.line_number)
                .map(|s| s.name)
                .unwrap_or_default();

            usages.push(Usage {
                snippet: render_snippet(&content, occ.line_number, self.context_lines),
                file_path: occ.file_path,
                line_number: occ.line_number,
                enclosing_symbol: enclosing,
            });
        }
        usages
    }
}

/// Render a numbered window around `line` (1-based), marking the line itself.
fn render_snippet(content: &str, line: usize, context_lines: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    if line == 0 || line > lines.len() {
        return String::new();
    }

    let lo = line.saturating_sub(context_lines + 1);
    let hi = (line + context_lines).min(lines.len());

    let mut out = String::new();
    for (idx, text) in lines[lo..hi].iter().enumerate() {
        let number = lo + idx + 1;
        let mark = if number == line { '>' } else { ' ' };
        let _ = writeln!(out, "{}{:>4}| {}", mark, number, text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Occurrence;
    use crate::symbols::{ExtractorRegistry, SymbolKind};
    use std::cell::RefCell;
    use std::fs;
    use tempfile::tempdir;

    struct FixedSearch {
        result: RefCell<Option<anyhow::Result<Vec<Occurrence>>>>,
    }

    impl FixedSearch {
        fn ok(occurrences: Vec<Occurrence>) -> Self {
            Self {
                result: RefCell::new(Some(Ok(occurrences))),
            }
        }

        fn failing() -> Self {
            Self {
                result: RefCell::new(Some(Err(anyhow::anyhow!("grep exploded")))),
            }
        }
    }

    impl XrefSearch for FixedSearch {
        fn find_occurrences(
            &self,
            _identifier: &str,
            _root: &Path,
        ) -> anyhow::Result<Vec<Occurrence>> {
            self.result.borrow_mut().take().unwrap()
        }
    }

    fn target_symbol() -> Symbol {
        Symbol {
            name: "greet".to_string(),
            kind: SymbolKind::Function,
            file_path: "lib.rs".to_string(),
            start_line: 1,
            end_line: 3,
            enclosing_scope: None,
        }
    }

    #[test]
    fn test_declaration_site_excluded() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("lib.rs"), "fn greet() {}\n").unwrap();
        fs::write(dir.path().join("main.rs"), "fn main() {\n    greet();\n}\n").unwrap();

        let search = FixedSearch::ok(vec![
            Occurrence { file_path: "lib.rs".into(), line_number: 1 },
            Occurrence { file_path: "main.rs".into(), line_number: 2 },
        ]);
        let registry = ExtractorRegistry::with_default_languages();
        let expander = UsageExpander::new(&search, dir.path(), 2);

        let usages = expander.expand(&target_symbol(), &registry);
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].file_path, "main.rs");
        assert_eq!(usages[0].enclosing_symbol, "main");
    }

    #[test]
    fn test_unresolved_enclosing_still_reported() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "calls greet here\n").unwrap();

        let search = FixedSearch::ok(vec![Occurrence {
            file_path: "notes.txt".into(),
            line_number: 1,
        }]);
        let registry = ExtractorRegistry::with_default_languages();
        let expander = UsageExpander::new(&search, dir.path(), 2);

        let usages = expander.expand(&target_symbol(), &registry);
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].enclosing_symbol, "");
        assert!(usages[0].snippet.contains("greet"));
    }

    #[test]
    fn test_search_failure_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let search = FixedSearch::failing();
        let registry = ExtractorRegistry::with_default_languages();
        let expander = UsageExpander::new(&search, dir.path(), 2);

        assert!(expander.expand(&target_symbol(), &registry).is_empty());
    }

    #[test]
    fn test_snippet_marks_usage_line() {
        let content = "a\nb\nc\nd\ne\nf\ng";
        let snippet = render_snippet(content, 4, 2);
        let lines: Vec<&str> = snippet.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "    2| b");
        assert_eq!(lines[2], ">   4| d");
        assert_eq!(lines[4], "    6| f");
    }

    #[test]
    fn test_snippet_clips_at_file_edges() {
        let content = "a\nb\nc";
        let snippet = render_snippet(content, 1, 3);
        assert_eq!(snippet.lines().count(), 3);
        assert!(snippet.starts_with(">   1| a"));
        assert_eq!(render_snippet(content, 9, 2), "");
    }
}
