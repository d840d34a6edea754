use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{char_column, DirectiveKind, ImportEdge};
use crate::config::AliasMap;
use crate::vfs::{normalize_path, FileSystem};

fn compile_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid regex literal {pattern}: {err}"))
}

static USE_REGEX: Lazy<Regex> = Lazy::new(|| {
    compile_regex(r#"@use\s+['"]([^'"]+)['"](?:\s+as\s+(\*|[A-Za-z_-][\w-]*))?"#)
});
static FORWARD_REGEX: Lazy<Regex> = Lazy::new(|| compile_regex(r#"@forward\s+['"]([^'"]+)['"]"#));
static IMPORT_REGEX: Lazy<Regex> =
    Lazy::new(|| compile_regex(r#"@import\s+((?:['"][^'"]+['"]\s*,?\s*)+)"#));
static QUOTED_REGEX: Lazy<Regex> = Lazy::new(|| compile_regex(r#"['"]([^'"]+)['"]"#));

const BUILTIN_PREFIX: &str = "sass:";

/// One `@use`, `@forward` or `@import` statement as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDirective {
    pub kind: DirectiveKind,
    pub path: String,
    pub namespace: Option<String>,
    pub line: usize,
    /// Character span of the path between the quotes.
    pub start_column: usize,
    pub end_column: usize,
}

impl ImportDirective {
    /// `sass:` modules are provided by the compiler, not by project files.
    pub fn is_builtin(&self) -> bool {
        self.path.starts_with(BUILTIN_PREFIX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImport {
    pub directive: ImportDirective,
    pub target: Option<PathBuf>,
}

impl ResolvedImport {
    pub fn is_unresolved(&self) -> bool {
        self.target.is_none() && !self.directive.is_builtin()
    }
}

pub fn extract_directives(text: &str) -> Vec<ImportDirective> {
    text.lines()
        .enumerate()
        .flat_map(|(line_no, line)| extract_line_directives(line, line_no))
        .collect()
}

/// Directives on a single line, in textual order.
pub fn extract_line_directives(line: &str, line_no: usize) -> Vec<ImportDirective> {
    if line.trim_start().starts_with("//") || !line.contains('@') {
        return Vec::new();
    }

    let mut directives = Vec::new();

    for caps in USE_REGEX.captures_iter(line) {
        let Some(path) = caps.get(1) else { continue };
        let namespace = match caps.get(2).map(|m| m.as_str()) {
            Some("*") => None,
            Some(name) => Some(name.to_string()),
            None => Some(derive_namespace(path.as_str())),
        };
        directives.push(directive(DirectiveKind::Use, line, line_no, path, namespace));
    }

    for caps in FORWARD_REGEX.captures_iter(line) {
        let Some(path) = caps.get(1) else { continue };
        directives.push(directive(DirectiveKind::Forward, line, line_no, path, None));
    }

    for caps in IMPORT_REGEX.captures_iter(line) {
        let Some(list) = caps.get(1) else { continue };
        for quoted in QUOTED_REGEX.captures_iter(list.as_str()) {
            let Some(inner) = quoted.get(1) else { continue };
            if is_plain_css_import(inner.as_str()) {
                continue;
            }
            let start = list.start() + inner.start();
            let end = list.start() + inner.end();
            directives.push(ImportDirective {
                kind: DirectiveKind::Import,
                path: inner.as_str().to_string(),
                namespace: None,
                line: line_no,
                start_column: char_column(line, start),
                end_column: char_column(line, end),
            });
        }
    }

    directives.sort_by_key(|d| d.start_column);
    directives
}

fn directive(
    kind: DirectiveKind,
    line: &str,
    line_no: usize,
    path: regex::Match<'_>,
    namespace: Option<String>,
) -> ImportDirective {
    ImportDirective {
        kind,
        path: path.as_str().to_string(),
        namespace,
        line: line_no,
        start_column: char_column(line, path.start()),
        end_column: char_column(line, path.end()),
    }
}

/// `@import` of a CSS file or URL stays a plain CSS import.
fn is_plain_css_import(path: &str) -> bool {
    path.ends_with(".css")
        || path.starts_with("http://")
        || path.starts_with("https://")
        || path.starts_with("//")
        || path.starts_with("url(")
}

/// Default `@use` namespace: the last path segment without a leading
/// underscore or stylesheet extension.
pub fn derive_namespace(import_path: &str) -> String {
    let module = import_path
        .strip_prefix(BUILTIN_PREFIX)
        .unwrap_or(import_path);
    let segment = module.rsplit('/').next().unwrap_or(module);
    let segment = segment.strip_prefix('_').unwrap_or(segment);
    [".scss", ".sass", ".css"]
        .iter()
        .find_map(|ext| segment.strip_suffix(ext))
        .unwrap_or(segment)
        .to_string()
}

/// Resolve an import path as written in `importing_file` to an existing
/// stylesheet.
///
/// Paths starting with `.` are relative. Anything else goes through the alias
/// map first and falls back to relative resolution when no pattern matches.
pub fn resolve_import_path(
    fs: &dyn FileSystem,
    aliases: &AliasMap,
    importing_file: &Path,
    import_path: &str,
) -> Option<PathBuf> {
    let dir = importing_file.parent().unwrap_or_else(|| Path::new(""));
    let relative = || vec![normalize_path(&dir.join(import_path))];

    let bases = if import_path.starts_with('.') {
        relative()
    } else {
        let aliased = aliases.candidates(import_path);
        if aliased.is_empty() {
            relative()
        } else {
            aliased
        }
    };

    bases
        .iter()
        .flat_map(|base| stylesheet_candidates(base))
        .find(|candidate| fs.is_file(candidate))
}

/// Files probed for an import base path, in priority order.
pub fn stylesheet_candidates(base: &Path) -> Vec<PathBuf> {
    let Some(file_name) = base.file_name().and_then(|n| n.to_str()) else {
        return Vec::new();
    };
    let dir = base.parent().unwrap_or_else(|| Path::new(""));

    let has_extension = [".scss", ".sass", ".css"]
        .iter()
        .any(|ext| file_name.ends_with(ext));
    if has_extension {
        return vec![base.to_path_buf(), dir.join(format!("_{file_name}"))];
    }

    let mut candidates = vec![
        dir.join(format!("{file_name}.scss")),
        dir.join(format!("{file_name}.sass")),
        dir.join(format!("_{file_name}.scss")),
        dir.join(format!("_{file_name}.sass")),
    ];
    if !file_name.ends_with("index") {
        for index in ["index.scss", "_index.scss", "index.sass", "_index.sass"] {
            candidates.push(base.join(index));
        }
    }
    candidates
}

/// Extract and resolve every directive in `text`.
pub fn resolve_directives(
    fs: &dyn FileSystem,
    aliases: &AliasMap,
    file: &Path,
    text: &str,
) -> Vec<ResolvedImport> {
    extract_directives(text)
        .into_iter()
        .map(|directive| {
            let target = if directive.is_builtin() {
                None
            } else {
                resolve_import_path(fs, aliases, file, &directive.path)
            };
            if target.is_none() && !directive.is_builtin() {
                debug!(
                    "Unresolved {} \"{}\" in {}:{}",
                    directive.kind.keyword(),
                    directive.path,
                    file.display(),
                    directive.line
                );
            }
            ResolvedImport { directive, target }
        })
        .collect()
}

/// Edges to resolved project files. Built-in modules and unresolved paths
/// are left out.
pub fn import_edges(resolved: &[ResolvedImport]) -> Vec<ImportEdge> {
    resolved
        .iter()
        .filter_map(|r| {
            r.target.as_ref().map(|target| ImportEdge {
                target: target.clone(),
                namespace: r.directive.namespace.clone(),
                kind: r.directive.kind,
            })
        })
        .collect()
}
