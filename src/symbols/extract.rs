//! Tree-sitter symbol extraction
//!
//! One recursive walker over the syntax tree, parameterized by a
//! per-language classification of declaration node kinds. Extraction is
//! best-effort: anything the grammar rejects produces an empty symbol list.

use super::{Language, Symbol, SymbolKind};
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Extract all named declarations from `content`.
pub fn extract_symbols(path: &str, content: &str, language: Language) -> Vec<Symbol> {
    let Some(mut parser) = parser_for(language, path) else {
        return Vec::new();
    };
    let Some(tree) = parser.parse(content, None) else {
        return Vec::new();
    };

    let mut symbols = Vec::new();
    let scope = Scope { name: None, is_type: false };
    walk(tree.root_node(), content, path, language, &scope, &mut symbols);
    symbols
}

struct Scope {
    name: Option<String>,
    /// True when the scope is a type-like container (impl block, class),
    /// which turns nested functions into methods.
    is_type: bool,
}

fn parser_for(language: Language, path: &str) -> Option<Parser> {
    let mut parser = Parser::new();
    let grammar = match language {
        Language::Rust => tree_sitter_rust::LANGUAGE.into(),
        Language::Go => tree_sitter_go::LANGUAGE.into(),
        Language::Python => tree_sitter_python::LANGUAGE.into(),
        Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        Language::TypeScript => {
            let tsx = Path::new(path)
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("tsx"));
            if tsx {
                tree_sitter_typescript::LANGUAGE_TSX.into()
            } else {
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
            }
        }
    };
    parser.set_language(&grammar).ok()?;
    Some(parser)
}

fn walk(
    node: Node,
    content: &str,
    path: &str,
    language: Language,
    scope: &Scope,
    out: &mut Vec<Symbol>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        // Rust impl blocks name a scope without being a symbol themselves.
        if language == Language::Rust && child.kind() == "impl_item" {
            let name = child
                .child_by_field_name("type")
                .map(|n| node_text(n, content));
            let inner = Scope { name, is_type: true };
            walk(child, content, path, language, &inner, out);
            continue;
        }

        match classify(child.kind(), language, scope) {
            Some(kind) => {
                if let Some(name) = declaration_name(child, content, language) {
                    out.push(Symbol {
                        name: name.clone(),
                        kind,
                        file_path: path.to_string(),
                        start_line: child.start_position().row + 1,
                        end_line: child.end_position().row + 1,
                        enclosing_scope: scope.name.clone(),
                    });
                    let inner = Scope {
                        name: Some(name),
                        is_type: matches!(
                            kind,
                            SymbolKind::Class | SymbolKind::Struct | SymbolKind::Trait
                        ),
                    };
                    walk(child, content, path, language, &inner, out);
                    continue;
                }
                walk(child, content, path, language, scope, out);
            }
            None => walk(child, content, path, language, scope, out),
        }
    }
}

fn classify(kind: &str, language: Language, scope: &Scope) -> Option<SymbolKind> {
    match language {
        Language::Rust => match kind {
            "function_item" | "function_signature_item" => Some(if scope.is_type {
                SymbolKind::Method
            } else {
                SymbolKind::Function
            }),
            "struct_item" => Some(SymbolKind::Struct),
            "enum_item" => Some(SymbolKind::Enum),
            "trait_item" => Some(SymbolKind::Trait),
            "mod_item" => Some(SymbolKind::Module),
            "const_item" => Some(SymbolKind::Constant),
            "static_item" => Some(SymbolKind::Variable),
            "type_item" => Some(SymbolKind::TypeAlias),
            _ => None,
        },
        Language::Go => match kind {
            "function_declaration" => Some(SymbolKind::Function),
            "method_declaration" => Some(SymbolKind::Method),
            "type_spec" => Some(SymbolKind::Struct),
            "const_spec" => Some(SymbolKind::Constant),
            "var_spec" => Some(SymbolKind::Variable),
            _ => None,
        },
        Language::Python => match kind {
            "function_definition" => Some(if scope.is_type {
                SymbolKind::Method
            } else {
                SymbolKind::Function
            }),
            "class_definition" => Some(SymbolKind::Class),
            _ => None,
        },
        Language::JavaScript | Language::TypeScript => match kind {
            "function_declaration" | "generator_function_declaration" => {
                Some(SymbolKind::Function)
            }
            "class_declaration" | "abstract_class_declaration" => Some(SymbolKind::Class),
            "method_definition" => Some(SymbolKind::Method),
            "interface_declaration" => Some(SymbolKind::Interface),
            "type_alias_declaration" => Some(SymbolKind::TypeAlias),
            "enum_declaration" => Some(SymbolKind::Enum),
            _ => None,
        },
    }
}

fn declaration_name(node: Node, content: &str, language: Language) -> Option<String> {
    if let Some(name) = node.child_by_field_name("name") {
        return Some(node_text(name, content));
    }
    // Go type/const/var specs nest the identifier one level down.
    if language == Language::Go {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "identifier" || child.kind() == "type_identifier" {
                return Some(node_text(child, content));
            }
        }
    }
    None
}

fn node_text(node: Node, content: &str) -> String {
    content[node.byte_range()].to_string()
}
