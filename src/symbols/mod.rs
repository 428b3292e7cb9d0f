//! Symbol model and per-language extractor registry
//!
//! Symbols are named declarations with known line ranges, extracted with
//! tree-sitter. The registry is an explicit lookup table keyed by file
//! extension, constructed at startup and passed into the engine; files with
//! unknown extensions simply yield no symbols and are reviewed without
//! expanded context.

pub mod extract;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Languages with a registered tree-sitter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Rust,
    Go,
    Python,
    JavaScript,
    TypeScript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Function,
    Method,
    Struct,
    Enum,
    Interface,
    Trait,
    Class,
    Module,
    Constant,
    Variable,
    TypeAlias,
}

/// A named declaration with a 1-based, inclusive line range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub file_path: String,
    pub start_line: usize,
    pub end_line: usize,
    /// Name of the enclosing declaration (impl block, class, module), if any.
    pub enclosing_scope: Option<String>,
}

impl Symbol {
    /// Inclusive containment check for a 1-based line number.
    pub fn contains_line(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

/// Extension-keyed table of symbol extractors.
pub struct ExtractorRegistry {
    languages: HashMap<&'static str, Language>,
}

impl ExtractorRegistry {
    /// Build the default table covering every bundled grammar.
    pub fn with_default_languages() -> Self {
        let mut languages = HashMap::new();
        for (exts, lang) in [
            (&["rs"][..], Language::Rust),
            (&["go"][..], Language::Go),
            (&["py", "pyi"][..], Language::Python),
            (&["js", "jsx", "mjs", "cjs"][..], Language::JavaScript),
            (&["ts", "tsx"][..], Language::TypeScript),
        ] {
            for ext in exts {
                languages.insert(*ext, lang);
            }
        }
        Self { languages }
    }

    /// An empty registry: every file reviews without symbol context.
    pub fn empty() -> Self {
        Self { languages: HashMap::new() }
    }

    pub fn language_for(&self, path: &str) -> Option<Language> {
        let ext = Path::new(path).extension()?.to_str()?.to_lowercase();
        self.languages.get(ext.as_str()).copied()
    }

    /// Extract all declarations from a file. Unknown extensions and files
    /// the grammar cannot parse yield an empty list, never an error.
    pub fn extract(&self, path: &str, content: &str) -> Vec<Symbol> {
        match self.language_for(path) {
            Some(language) => extract::extract_symbols(path, content, language),
            None => Vec::new(),
        }
    }

    /// The nearest (narrowest) declaration enclosing `line` in `content`.
    pub fn enclosing_symbol_at(&self, path: &str, content: &str, line: usize) -> Option<Symbol> {
        self.extract(path, content)
            .into_iter()
            .filter(|s| s.contains_line(line))
            .min_by_key(|s| s.end_line - s.start_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GO_SRC: &str = "\
package main

func Greet(name string) string {
\treturn \"hello \" + name
}

func main() {
\tprintln(Greet(\"world\"))
}
";

    #[test]
    fn test_extension_lookup() {
        let registry = ExtractorRegistry::with_default_languages();
        assert_eq!(registry.language_for("src/a.rs"), Some(Language::Rust));
        assert_eq!(registry.language_for("pkg/x.go"), Some(Language::Go));
        assert_eq!(registry.language_for("a.TSX"), Some(Language::TypeScript));
        assert_eq!(registry.language_for("notes.txt"), None);
        assert_eq!(registry.language_for("Makefile"), None);
    }

    #[test]
    fn test_unknown_extension_yields_no_symbols() {
        let registry = ExtractorRegistry::with_default_languages();
        assert!(registry.extract("readme.md", "# nothing").is_empty());
    }

    #[test]
    fn test_go_function_extraction() {
        let registry = ExtractorRegistry::with_default_languages();
        let symbols = registry.extract("main.go", GO_SRC);
        let greet = symbols.iter().find(|s| s.name == "Greet").unwrap();
        assert_eq!(greet.kind, SymbolKind::Function);
        assert_eq!(greet.start_line, 3);
        assert_eq!(greet.end_line, 5);
    }

    #[test]
    fn test_enclosing_symbol_picks_narrowest() {
        let registry = ExtractorRegistry::with_default_languages();
        let src = "\
struct Wide;

impl Wide {
    fn inner(&self) -> u32 {
        42
    }
}
";
        let enclosing = registry.enclosing_symbol_at("a.rs", src, 5).unwrap();
        assert_eq!(enclosing.name, "inner");
        assert_eq!(enclosing.enclosing_scope.as_deref(), Some("Wide"));
    }

    #[test]
    fn test_enclosing_symbol_outside_everything() {
        let registry = ExtractorRegistry::with_default_languages();
        assert!(registry.enclosing_symbol_at("a.rs", "// only a comment\n", 1).is_none());
    }
}
