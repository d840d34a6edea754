pub mod cache;
pub mod graph;
pub mod imports;
pub mod parser;
pub mod symbols;

use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    Variable,
    Mixin,
    Function,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Mixin => "mixin",
            SymbolKind::Function => "function",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declaration found in a stylesheet. Variable names are stored without `$`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub detail: String,
    pub documentation: Option<String>,
}

impl Symbol {
    pub fn is_private(&self) -> bool {
        is_private_name(&self.name)
    }

    pub fn location(&self) -> Location {
        Location {
            file: self.file.clone(),
            line: self.line,
            column: self.column,
        }
    }
}

/// Members starting with `_` or `-` are not visible outside their file.
pub fn is_private_name(name: &str) -> bool {
    name.starts_with('_') || name.starts_with('-')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Use,
    Forward,
    Import,
}

impl DirectiveKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            DirectiveKind::Use => "@use",
            DirectiveKind::Forward => "@forward",
            DirectiveKind::Import => "@import",
        }
    }
}

/// A resolved module dependency. `namespace: None` means the target's members
/// land in the importing file's unscoped set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEdge {
    pub target: PathBuf,
    pub namespace: Option<String>,
    pub kind: DirectiveKind,
}

/// Zero-based line and character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

/// Character column of a byte offset within `line`.
pub(crate) fn char_column(line: &str, byte_offset: usize) -> usize {
    line[..byte_offset].chars().count()
}

/// Byte offset of a character column within `line`, clamped to the line end.
pub(crate) fn byte_offset(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map(|(offset, _)| offset)
        .unwrap_or(line.len())
}
