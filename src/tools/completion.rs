use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::indexer::graph::ModuleGraph;
use crate::indexer::symbols::{dedupe_scoped, ScopedSymbol};
use crate::indexer::{byte_offset, Position, SymbolKind};

fn compile_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid regex literal {pattern}: {err}"))
}

static NAMESPACED_INCLUDE: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"@include\s+([A-Za-z_][\w-]*)\.([\w-]*)$"));
static INCLUDE: Lazy<Regex> = Lazy::new(|| compile_regex(r"@include\s+([\w-]*)$"));
static NAMESPACED_VARIABLE: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"([A-Za-z_][\w-]*)\.\$([\w-]*)$"));
static VARIABLE: Lazy<Regex> = Lazy::new(|| compile_regex(r"\$([\w-]*)$"));
static NAMESPACED_MEMBER: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"([A-Za-z_][\w-]*)\.([\w-]*)$"));
static VALUE_POSITION: Lazy<Regex> = Lazy::new(|| compile_regex(r"[:,(]\s*([\w-]*)$"));

/// What is being typed at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionContext {
    pub kind: SymbolKind,
    pub namespace: Option<String>,
    pub prefix: String,
}

/// Classify the text before the cursor. Patterns overlap, so the order of
/// the checks matters: the first match wins.
pub fn classify(before_cursor: &str) -> Option<CompletionContext> {
    let rules: [(&Regex, SymbolKind, bool); 6] = [
        (&*NAMESPACED_INCLUDE, SymbolKind::Mixin, true),
        (&*INCLUDE, SymbolKind::Mixin, false),
        (&*NAMESPACED_VARIABLE, SymbolKind::Variable, true),
        (&*VARIABLE, SymbolKind::Variable, false),
        (&*NAMESPACED_MEMBER, SymbolKind::Function, true),
        (&*VALUE_POSITION, SymbolKind::Function, false),
    ];

    rules.into_iter().find_map(|(regex, kind, namespaced)| {
        let caps = regex.captures(before_cursor)?;
        let (namespace, prefix) = if namespaced {
            (caps.get(1).map(|m| m.as_str().to_string()), caps.get(2)?)
        } else {
            (None, caps.get(1)?)
        };
        Some(CompletionContext {
            kind,
            namespace,
            prefix: prefix.as_str().to_string(),
        })
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub insert_text: String,
    pub kind: SymbolKind,
    pub detail: String,
    pub source_file: PathBuf,
    pub documentation: Option<String>,
}

impl From<&ScopedSymbol> for CompletionItem {
    fn from(scoped: &ScopedSymbol) -> Self {
        let symbol = &scoped.symbol;
        let label = match symbol.kind {
            SymbolKind::Variable => format!("${}", symbol.name),
            SymbolKind::Mixin | SymbolKind::Function => symbol.name.clone(),
        };
        Self {
            label,
            // `$` and the namespace are already typed
            insert_text: symbol.name.clone(),
            kind: symbol.kind,
            detail: symbol.detail.clone(),
            source_file: symbol.file.clone(),
            documentation: symbol.documentation.clone(),
        }
    }
}

/// Candidates for `context`, first declaration winning per name.
pub fn complete(graph: &ModuleGraph<'_>, file: &Path, context: &CompletionContext) -> Vec<CompletionItem> {
    let candidates = graph
        .reachable_symbols(file)
        .into_iter()
        .filter(|s| {
            s.namespace == context.namespace
                && s.symbol.kind == context.kind
                && s.symbol.name.starts_with(&context.prefix)
        })
        .collect();

    dedupe_scoped(candidates)
        .iter()
        .map(CompletionItem::from)
        .collect()
}

/// Completion at `position` of `file` whose current text is `text`.
pub fn completion_at(
    graph: &ModuleGraph<'_>,
    file: &Path,
    text: &str,
    position: Position,
) -> Vec<CompletionItem> {
    let Some(line) = text.lines().nth(position.line) else {
        return Vec::new();
    };
    let before_cursor = &line[..byte_offset(line, position.column)];
    match classify(before_cursor) {
        Some(context) => complete(graph, file, &context),
        None => Vec::new(),
    }
}
