use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use super::find_definition::{references_in_line, resolve_definition, Reference};
use crate::indexer::graph::ModuleGraph;
use crate::indexer::imports::resolve_directives;
use crate::indexer::{DirectiveKind, SymbolKind};
use crate::vfs::normalize_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: PathBuf,
    pub line: usize,
    pub start_column: usize,
    pub end_column: usize,
    pub severity: Severity,
    pub message: String,
}

fn display_name(name: &str, kind: SymbolKind) -> String {
    match kind {
        SymbolKind::Variable => format!("${name}"),
        SymbolKind::Mixin | SymbolKind::Function => name.to_string(),
    }
}

/// Unresolvable imports and namespaced references in one file.
///
/// Bare references are not reported: they may be locals, parameters or plain
/// CSS functions.
pub fn file_diagnostics(graph: &ModuleGraph<'_>, file: &Path) -> Vec<Diagnostic> {
    let file = normalize_path(file);
    let Some(text) = graph.read_text(&file) else {
        return Vec::new();
    };

    let resolved = resolve_directives(graph.fs(), &graph.repository().aliases, &file, &text);
    let mut diagnostics = Vec::new();

    for import in resolved.iter().filter(|r| r.is_unresolved()) {
        let directive = &import.directive;
        diagnostics.push(Diagnostic {
            file: file.clone(),
            line: directive.line,
            start_column: directive.start_column,
            end_column: directive.end_column,
            severity: Severity::Error,
            message: format!(
                "Cannot resolve {} \"{}\"",
                directive.kind.keyword(),
                directive.path
            ),
        });
    }

    // Namespace -> whether its members can be looked up. Built-in modules and
    // unresolved imports are known but not searchable.
    let mut namespaces: HashMap<String, bool> = HashMap::new();
    for import in &resolved {
        if import.directive.kind != DirectiveKind::Use {
            continue;
        }
        if let Some(ref ns) = import.directive.namespace {
            namespaces
                .entry(ns.clone())
                .or_insert(import.target.is_some());
        }
    }

    for (line_no, line) in text.lines().enumerate() {
        for located in references_in_line(line) {
            let Reference::Symbol {
                name,
                kind,
                namespace: Some(ns),
            } = located.reference
            else {
                continue;
            };

            let problem = match namespaces.get(&ns) {
                None => Some((Severity::Error, format!("Unknown namespace `{ns}`"))),
                Some(false) => None,
                Some(true) => resolve_definition(graph, &file, &name, kind, Some(&ns))
                    .is_none()
                    .then(|| {
                        (
                            Severity::Warning,
                            format!(
                                "Cannot find {} `{}` in namespace `{}`",
                                kind,
                                display_name(&name, kind),
                                ns
                            ),
                        )
                    }),
            };

            if let Some((severity, message)) = problem {
                diagnostics.push(Diagnostic {
                    file: file.clone(),
                    line: line_no,
                    start_column: located.start_column,
                    end_column: located.end_column,
                    severity,
                    message,
                });
            }
        }
    }

    diagnostics.sort_by_key(|d| (d.line, d.start_column));
    diagnostics
}

/// Diagnostics for many files of one repository, checked in parallel.
pub fn check_files(graph: &ModuleGraph<'_>, files: &[PathBuf]) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = files
        .par_iter()
        .flat_map_iter(|file| file_diagnostics(graph, file))
        .collect();
    diagnostics.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then(a.line.cmp(&b.line))
            .then(a.start_column.cmp(&b.start_column))
    });
    diagnostics
}
