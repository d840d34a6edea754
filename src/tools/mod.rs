pub mod completion;
pub mod diagnostics;
pub mod find_definition;

use std::path::Path;

use crate::indexer::Location;
use completion::CompletionItem;
use diagnostics::Diagnostic;

fn relative<'a>(file: &'a Path, project_root: &Path) -> std::path::Display<'a> {
    file.strip_prefix(project_root).unwrap_or(file).display()
}

/// Format a go-to-definition result into a human-readable string.
pub fn format_location(location: Option<&Location>, project_root: &Path) -> String {
    match location {
        Some(loc) => format!(
            "Definition: {}:{}:{}",
            relative(&loc.file, project_root),
            loc.line,
            loc.column
        ),
        None => "No definition found.".to_string(),
    }
}

pub fn format_completions(items: &[CompletionItem], project_root: &Path) -> String {
    if items.is_empty() {
        return "No completions.".to_string();
    }

    let mut lines = Vec::new();
    lines.push(format!("Found {} completion(s):\n", items.len()));

    for item in items {
        let detail = if item.detail.is_empty() {
            String::new()
        } else {
            format!(" {}", item.detail)
        };
        let doc = item
            .documentation
            .as_deref()
            .map(|d| format!(" - {}", d.replace('\n', " ")))
            .unwrap_or_default();

        lines.push(format!(
            "  {} `{}`{} ({}){}",
            item.kind,
            item.label,
            detail,
            relative(&item.source_file, project_root),
            doc,
        ));
    }

    lines.join("\n")
}

pub fn format_diagnostics(diagnostics: &[Diagnostic], project_root: &Path) -> String {
    if diagnostics.is_empty() {
        return "No problems found.".to_string();
    }

    let mut lines = Vec::new();
    lines.push(format!("Found {} problem(s):\n", diagnostics.len()));

    for d in diagnostics {
        lines.push(format!(
            "  {}:{}:{} - {}: {}",
            relative(&d.file, project_root),
            d.line,
            d.start_column,
            d.severity,
            d.message,
        ));
    }

    lines.join("\n")
}
