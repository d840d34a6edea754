use std::collections::HashSet;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::indexer::cache::DefinitionKey;
use crate::indexer::graph::ModuleGraph;
use crate::indexer::imports::{extract_line_directives, resolve_import_path};
use crate::indexer::{
    byte_offset, char_column, is_private_name, DirectiveKind, Location, Position, SymbolKind,
};
use crate::vfs::normalize_path;

fn compile_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid regex literal {pattern}: {err}"))
}

static INCLUDE_REGEX: Lazy<Regex> = Lazy::new(|| {
    compile_regex(r"@include\s+(?:([A-Za-z_][\w-]*)\.)?([A-Za-z_-][\w-]*)")
});
static DECLARATION_REGEX: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"@(mixin|function)\s+([A-Za-z_-][\w-]*)"));
static VARIABLE_REGEX: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"(?:([A-Za-z_][\w-]*)\.)?\$([A-Za-z_-][\w-]*)"));
static CALL_REGEX: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"(?:([A-Za-z_][\w-]*)\.)?([A-Za-z_-][\w-]*)\("));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Symbol {
        name: String,
        kind: SymbolKind,
        namespace: Option<String>,
    },
    Import {
        path: String,
        kind: DirectiveKind,
    },
}

/// A reference and its character span on the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedReference {
    pub reference: Reference,
    pub start_column: usize,
    pub end_column: usize,
}

/// All references on one line, without overlaps. Import paths win over
/// `@include`, which wins over declarations, variables and calls.
pub fn references_in_line(line: &str) -> Vec<LocatedReference> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("//") || trimmed.starts_with("/*") {
        return Vec::new();
    }

    let mut found: Vec<(usize, usize, Reference)> = extract_line_directives(line, 0)
        .into_iter()
        .map(|d| {
            (
                byte_offset(line, d.start_column),
                byte_offset(line, d.end_column),
                Reference::Import {
                    path: d.path,
                    kind: d.kind,
                },
            )
        })
        .collect();

    let mut push = |start: usize, end: usize, reference: Reference| {
        let overlaps = found.iter().any(|(s, e, _)| start < *e && *s < end);
        if !overlaps {
            found.push((start, end, reference));
        }
    };

    for caps in INCLUDE_REGEX.captures_iter(line) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else { continue };
        push(
            whole.start(),
            name.end(),
            Reference::Symbol {
                name: name.as_str().to_string(),
                kind: SymbolKind::Mixin,
                namespace: caps.get(1).map(|m| m.as_str().to_string()),
            },
        );
    }

    for caps in DECLARATION_REGEX.captures_iter(line) {
        let (Some(keyword), Some(name)) = (caps.get(1), caps.get(2)) else { continue };
        let kind = if keyword.as_str() == "mixin" {
            SymbolKind::Mixin
        } else {
            SymbolKind::Function
        };
        push(
            keyword.start() - 1,
            name.end(),
            Reference::Symbol {
                name: name.as_str().to_string(),
                kind,
                namespace: None,
            },
        );
    }

    for caps in VARIABLE_REGEX.captures_iter(line) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else { continue };
        push(
            whole.start(),
            name.end(),
            Reference::Symbol {
                name: name.as_str().to_string(),
                kind: SymbolKind::Variable,
                namespace: caps.get(1).map(|m| m.as_str().to_string()),
            },
        );
    }

    for caps in CALL_REGEX.captures_iter(line) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else { continue };
        push(
            whole.start(),
            name.end(),
            Reference::Symbol {
                name: name.as_str().to_string(),
                kind: SymbolKind::Function,
                namespace: caps.get(1).map(|m| m.as_str().to_string()),
            },
        );
    }

    found.sort_by_key(|(start, _, _)| *start);
    found
        .into_iter()
        .map(|(start, end, reference)| LocatedReference {
            reference,
            start_column: char_column(line, start),
            end_column: char_column(line, end),
        })
        .collect()
}

/// The reference under `column`. A cursor right after the last character of
/// a reference still counts as on it.
pub fn reference_at(line: &str, column: usize) -> Option<Reference> {
    references_in_line(line)
        .into_iter()
        .find(|r| r.start_column <= column && column <= r.end_column)
        .map(|r| r.reference)
}

/// Find where `name` of `kind` is declared, as seen from `from_file`.
///
/// With a namespace, only the target of the matching `@use` edge and its
/// forwards are searched. Without one, the file itself and its forwards come
/// first, then unscoped `@use ... as *` and `@import` edges in order. Private
/// members are never found outside their own file.
pub fn resolve_definition(
    graph: &ModuleGraph<'_>,
    from_file: &Path,
    name: &str,
    kind: SymbolKind,
    namespace: Option<&str>,
) -> Option<Location> {
    let from_file = normalize_path(from_file);
    let repo = &graph.repository().root;
    let key = DefinitionKey {
        file: from_file.clone(),
        name: name.to_string(),
        kind,
        namespace: namespace.map(str::to_string),
    };
    if let Some(cached) = graph.cache().definition(repo, &key) {
        return cached;
    }

    let mut visited = HashSet::new();
    let result = match namespace {
        Some(ns) => {
            visited.insert(from_file.clone());
            graph
                .imports(&from_file)
                .iter()
                .find(|edge| edge.namespace.as_deref() == Some(ns))
                .and_then(|edge| search_file(graph, &edge.target, name, kind, &from_file, &mut visited))
        }
        None => search_file(graph, &from_file, name, kind, &from_file, &mut visited).or_else(|| {
            graph
                .imports(&from_file)
                .iter()
                .filter(|edge| edge.namespace.is_none() && edge.kind != DirectiveKind::Forward)
                .find_map(|edge| search_file(graph, &edge.target, name, kind, &from_file, &mut visited))
        }),
    };

    debug!(
        "Definition of {} `{}` from {}: {:?}",
        kind,
        name,
        from_file.display(),
        result
    );
    graph.cache().store_definition(repo, key, result.clone());
    result
}

fn search_file(
    graph: &ModuleGraph<'_>,
    file: &Path,
    name: &str,
    kind: SymbolKind,
    origin: &Path,
    visited: &mut HashSet<PathBuf>,
) -> Option<Location> {
    let file = normalize_path(file);
    if !visited.insert(file.clone()) {
        return None;
    }
    if file != origin && is_private_name(name) {
        return None;
    }

    if let Some(symbol) = graph
        .symbols(&file)
        .iter()
        .find(|s| s.kind == kind && s.name == name)
    {
        return Some(symbol.location());
    }

    let forwards = graph.forwards(&file);
    forwards
        .iter()
        .find_map(|target| search_file(graph, target, name, kind, origin, visited))
}

/// Go-to-definition for the cursor `position` in `file` whose text is `text`.
/// An import path jumps to the top of the imported file.
pub fn definition_at(
    graph: &ModuleGraph<'_>,
    file: &Path,
    text: &str,
    position: Position,
) -> Option<Location> {
    let line = text.lines().nth(position.line)?;
    match reference_at(line, position.column)? {
        Reference::Import { path, .. } => {
            if path.starts_with("sass:") {
                return None;
            }
            resolve_import_path(graph.fs(), &graph.repository().aliases, file, &path).map(|target| {
                Location {
                    file: target,
                    line: 0,
                    column: 0,
                }
            })
        }
        Reference::Symbol {
            name,
            kind,
            namespace,
        } => resolve_definition(graph, file, &name, kind, namespace.as_deref()),
    }
}
