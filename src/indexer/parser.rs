use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{char_column, Symbol, SymbolKind};

fn compile_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid regex literal {pattern}: {err}"))
}

static VARIABLE_REGEX: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"^\s*\$([A-Za-z_-][\w-]*)\s*:\s*([^;]*)"));
static MIXIN_REGEX: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"^\s*@mixin\s+([A-Za-z_-][\w-]*)\s*(\([^)]*\)?)?"));
static FUNCTION_REGEX: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"^\s*@function\s+([A-Za-z_-][\w-]*)\s*(\([^)]*\)?)?"));

/// A declaration recognised on a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub kind: SymbolKind,
    pub column: usize,
    pub detail: String,
}

/// Match the declaration on `line`, if any. Lines opening a comment never
/// declare anything.
pub fn declaration_on_line(line: &str) -> Option<Declaration> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("//") || trimmed.starts_with("/*") {
        return None;
    }

    if let Some(caps) = VARIABLE_REGEX.captures(line) {
        let name = caps.get(1)?;
        return Some(Declaration {
            name: name.as_str().to_string(),
            kind: SymbolKind::Variable,
            // Points at the `$`
            column: char_column(line, name.start() - 1),
            detail: caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default().to_string(),
        });
    }

    for (regex, kind) in [
        (&*MIXIN_REGEX, SymbolKind::Mixin),
        (&*FUNCTION_REGEX, SymbolKind::Function),
    ] {
        if let Some(caps) = regex.captures(line) {
            let name = caps.get(1)?;
            return Some(Declaration {
                name: name.as_str().to_string(),
                kind,
                column: char_column(line, name.start()),
                detail: caps.get(2).map(|m| m.as_str()).unwrap_or_default().to_string(),
            });
        }
    }

    None
}

/// Extract every declaration in `text`, in line order, duplicates included.
///
/// Consecutive `//` lines directly above a declaration become its
/// documentation; any other line in between discards them.
pub fn extract_symbols(file: &Path, text: &str) -> Vec<Symbol> {
    let mut symbols = Vec::new();
    let mut doc_lines: Vec<String> = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let trimmed = line.trim_start();
        if let Some(comment) = trimmed.strip_prefix("//") {
            doc_lines.push(comment.trim_start_matches('/').trim().to_string());
            continue;
        }

        match declaration_on_line(line) {
            Some(decl) => {
                let documentation = if doc_lines.is_empty() {
                    None
                } else {
                    Some(doc_lines.join("\n"))
                };
                symbols.push(Symbol {
                    name: decl.name,
                    kind: decl.kind,
                    file: file.to_path_buf(),
                    line: line_no,
                    column: decl.column,
                    detail: decl.detail,
                    documentation,
                });
                doc_lines.clear();
            }
            None => doc_lines.clear(),
        }
    }

    symbols
}
