//! The long-lived navigation state behind the server and the CLI.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::repository::{RepositoryContext, RepositoryEntry, RepositoryResolver};
use crate::config::CONFIG_FILE_NAMES;
use crate::indexer::cache::{CacheStats, ResolverCache};
use crate::indexer::graph::ModuleGraph;
use crate::indexer::{Location, Position};
use crate::tools::completion::{completion_at, CompletionItem};
use crate::tools::diagnostics::{check_files, file_diagnostics, Diagnostic};
use crate::tools::find_definition::definition_at;
use crate::vfs::{is_stylesheet, normalize_path, path_from_uri, path_key, DocumentOverlay, FileSystem, OsFileSystem};

pub struct Workspace {
    root: PathBuf,
    base: Arc<dyn FileSystem>,
    documents: DocumentOverlay,
    entries: RwLock<Vec<RepositoryEntry>>,
    repositories: RwLock<RepositoryResolver>,
    cache: ResolverCache,
}

impl Workspace {
    pub fn new(root: &Path, entries: Vec<RepositoryEntry>, fs: Arc<dyn FileSystem>) -> Self {
        let root = normalize_path(root);
        let documents = DocumentOverlay::new(Arc::clone(&fs));
        let repositories = RepositoryResolver::load(&documents, &root, &entries);
        info!(
            "Workspace {}: {} repository context(s)",
            root.display(),
            repositories.contexts().len()
        );

        Self {
            root,
            base: fs,
            documents,
            entries: RwLock::new(entries),
            repositories: RwLock::new(repositories),
            cache: ResolverCache::new(),
        }
    }

    /// A workspace over the real file system.
    pub fn open(root: &Path, entries: Vec<RepositoryEntry>) -> Self {
        Self::new(root, entries, Arc::new(OsFileSystem))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Turn a client-supplied path or `file://` URI into an absolute path.
    pub fn resolve_path(&self, input: &str) -> PathBuf {
        let path = path_from_uri(input);
        if path.is_relative() {
            normalize_path(&self.root.join(path))
        } else {
            normalize_path(&path)
        }
    }

    /// The owning repository of `file`. Files outside every configured root
    /// get an alias-free context rooted at their own directory.
    pub fn context_for(&self, file: &Path) -> Arc<RepositoryContext> {
        if let Some(ctx) = self.repositories.read().context_for(file) {
            return ctx;
        }
        let dir = file.parent().unwrap_or(file);
        Arc::new(RepositoryContext::detached(dir))
    }

    pub fn repositories(&self) -> Vec<Arc<RepositoryContext>> {
        self.repositories.read().contexts().to_vec()
    }

    fn read_document(&self, file: &Path) -> Option<String> {
        match self.documents.read_to_string(file) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Failed to read {}: {}", file.display(), e);
                None
            }
        }
    }

    pub fn definition(&self, file: &Path, position: Position) -> Option<Location> {
        let file = normalize_path(file);
        let text = self.read_document(&file)?;
        let repo = self.context_for(&file);
        let graph = ModuleGraph::new(&self.documents, &repo, &self.cache);
        definition_at(&graph, &file, &text, position)
    }

    pub fn completion(&self, file: &Path, position: Position) -> Vec<CompletionItem> {
        let file = normalize_path(file);
        let Some(text) = self.read_document(&file) else {
            return Vec::new();
        };
        let repo = self.context_for(&file);
        let graph = ModuleGraph::new(&self.documents, &repo, &self.cache);
        completion_at(&graph, &file, &text, position)
    }

    pub fn diagnostics(&self, file: &Path) -> Vec<Diagnostic> {
        let file = normalize_path(file);
        let repo = self.context_for(&file);
        let graph = ModuleGraph::new(&self.documents, &repo, &self.cache);
        file_diagnostics(&graph, &file)
    }

    /// Diagnostics for every stylesheet of every repository. A file is
    /// checked once, by the innermost repository that owns it.
    pub fn check_repositories(&self) -> Vec<Diagnostic> {
        let resolver = self.repositories.read().clone();
        let mut diagnostics = Vec::new();

        for ctx in resolver.contexts() {
            let files: Vec<PathBuf> = self
                .documents
                .list_files(&ctx.root)
                .into_iter()
                .filter(|file| is_stylesheet(file))
                .filter(|file| {
                    resolver
                        .context_for(file)
                        .is_some_and(|owner| Arc::ptr_eq(&owner, ctx))
                })
                .collect();
            debug!("Checking {} stylesheet(s) in {}", files.len(), ctx.root.display());

            let graph = ModuleGraph::new(&self.documents, ctx, &self.cache);
            diagnostics.extend(check_files(&graph, &files));
        }

        diagnostics.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then(a.line.cmp(&b.line))
                .then(a.start_column.cmp(&b.start_column))
        });
        diagnostics
    }

    /// Editor buffer opened or edited.
    pub fn did_change(&self, file: &Path, text: impl Into<Arc<str>>) {
        let file = normalize_path(file);
        let existed = self.documents.is_file(&file);
        self.documents.set(&file, text);
        if existed {
            self.invalidate_file(&file);
        } else {
            self.invalidate_owner(&file);
        }
        self.reload_if_config(&file);
    }

    pub fn did_save(&self, file: &Path) {
        let file = normalize_path(file);
        self.invalidate_file(&file);
        self.reload_if_config(&file);
    }

    pub fn did_close(&self, file: &Path) {
        let file = normalize_path(file);
        if !self.documents.close(&file) {
            return;
        }
        if self.base.is_file(&file) {
            self.invalidate_file(&file);
        } else {
            // An unsaved buffer disappeared, so imports that found it no longer do
            self.invalidate_owner(&file);
        }
        self.reload_if_config(&file);
    }

    pub fn did_create(&self, file: &Path) {
        let file = normalize_path(file);
        self.invalidate_owner(&file);
        self.reload_if_config(&file);
    }

    pub fn did_delete(&self, file: &Path) {
        let file = normalize_path(file);
        self.invalidate_owner(&file);
        self.reload_if_config(&file);
    }

    /// Drop what was derived from `file`, in every repository that may have
    /// imported it.
    pub fn invalidate_file(&self, file: &Path) {
        let file = normalize_path(file);
        debug!("Invalidating {}", file.display());
        self.cache.invalidate_file(&file);
    }

    fn invalidate_owner(&self, file: &Path) {
        let repo = self.context_for(file);
        debug!(
            "File set of {} changed at {}",
            repo.root.display(),
            file.display()
        );
        self.cache.invalidate_repository(&repo.root);
        self.cache.forget_resolution(file);
    }

    /// Returns false if no configured repository has this root.
    pub fn invalidate_repository(&self, root: &Path) -> bool {
        let root = if root.is_relative() {
            normalize_path(&self.root.join(root))
        } else {
            normalize_path(root)
        };
        match self.repositories.read().find_by_root(&root) {
            Some(ctx) => {
                self.cache.invalidate_repository(&ctx.root);
                true
            }
            None => false,
        }
    }

    /// Replace the repository entries. Every cached result is dropped.
    pub fn reconfigure(&self, entries: Vec<RepositoryEntry>) {
        *self.entries.write() = entries;
        self.reload();
    }

    /// Re-read every alias configuration and drop all cached results.
    pub fn reload(&self) {
        let entries = self.entries.read().clone();
        let resolver = RepositoryResolver::load(&self.documents, &self.root, &entries);
        info!(
            "Reloaded {} repository context(s) for {}",
            resolver.contexts().len(),
            self.root.display()
        );
        *self.repositories.write() = resolver;
        self.cache.clear();
    }

    /// Alias configuration edits change how every import of a repository
    /// resolves.
    fn reload_if_config(&self, file: &Path) {
        let key = path_key(file);
        let is_config_name = file
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| CONFIG_FILE_NAMES.contains(&name));

        let affected = self.repositories.read().contexts().iter().any(|ctx| {
            ctx.config_sources.iter().any(|source| path_key(source) == key)
                || (is_config_name && file.parent().is_some_and(|dir| path_key(dir) == path_key(&ctx.root)))
        });
        if affected {
            info!("Alias configuration {} changed", file.display());
            self.reload();
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn open_documents(&self) -> usize {
        self.documents.open_count()
    }
}
