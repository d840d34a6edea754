use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use super::cache::ResolverCache;
use super::imports::{import_edges, resolve_directives, ResolvedImport};
use super::parser::extract_symbols;
use super::{DirectiveKind, ImportEdge, Symbol};
use crate::config::repository::RepositoryContext;
use crate::vfs::{normalize_path, FileSystem};

/// Cached view of the module graph of one repository, for the duration of a
/// single request.
pub struct ModuleGraph<'a> {
    fs: &'a dyn FileSystem,
    repo: &'a RepositoryContext,
    cache: &'a ResolverCache,
}

impl<'a> ModuleGraph<'a> {
    pub fn new(fs: &'a dyn FileSystem, repo: &'a RepositoryContext, cache: &'a ResolverCache) -> Self {
        Self { fs, repo, cache }
    }

    pub fn fs(&self) -> &'a dyn FileSystem {
        self.fs
    }

    pub fn repository(&self) -> &'a RepositoryContext {
        self.repo
    }

    pub fn cache(&self) -> &'a ResolverCache {
        self.cache
    }

    /// File text, or `None` (logged) when it cannot be read.
    pub fn read_text(&self, file: &Path) -> Option<String> {
        match self.fs.read_to_string(file) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Failed to read {}: {}", file.display(), e);
                None
            }
        }
    }

    /// Every directive of `file` with its resolution, built-ins and
    /// unresolved paths included. Not cached.
    pub fn resolved_imports(&self, file: &Path) -> Vec<ResolvedImport> {
        let file = normalize_path(file);
        match self.read_text(&file) {
            Some(text) => resolve_directives(self.fs, &self.repo.aliases, &file, &text),
            None => Vec::new(),
        }
    }

    pub fn imports(&self, file: &Path) -> Arc<Vec<ImportEdge>> {
        let file = normalize_path(file);
        if let Some(edges) = self.cache.imports(&self.repo.root, &file) {
            return edges;
        }
        let edges = Arc::new(import_edges(&self.resolved_imports(&file)));
        self.cache.store_imports(&self.repo.root, &file, Arc::clone(&edges));
        edges
    }

    /// Resolved `@forward` targets of `file`, in declared order.
    pub fn forwards(&self, file: &Path) -> Arc<Vec<PathBuf>> {
        let file = normalize_path(file);
        if let Some(targets) = self.cache.forwards(&self.repo.root, &file) {
            return targets;
        }
        let targets: Arc<Vec<PathBuf>> = Arc::new(
            self.imports(&file)
                .iter()
                .filter(|edge| edge.kind == DirectiveKind::Forward)
                .map(|edge| edge.target.clone())
                .collect(),
        );
        self.cache.store_forwards(&self.repo.root, &file, Arc::clone(&targets));
        targets
    }

    /// Declarations of `file` itself, private ones included.
    pub fn symbols(&self, file: &Path) -> Arc<Vec<Symbol>> {
        let file = normalize_path(file);
        if let Some(symbols) = self.cache.symbols(&self.repo.root, &file) {
            return symbols;
        }
        let symbols = Arc::new(
            self.read_text(&file)
                .map(|text| extract_symbols(&file, &text))
                .unwrap_or_default(),
        );
        self.cache.store_symbols(&self.repo.root, &file, Arc::clone(&symbols));
        symbols
    }
}
