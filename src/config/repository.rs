use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use super::{load_config_sources, AliasMap, CONFIG_FILE_NAMES};
use crate::vfs::{normalize_path, path_key, FileSystem};

/// One configured repository, as written in the settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RepositoryEntry {
    /// A directory whose `tsconfig.json` (or `jsconfig.json`) is discovered.
    Directory(PathBuf),
    /// A directory with an explicitly chosen configuration file.
    Explicit { root: PathBuf, tsconfig: PathBuf },
}

impl RepositoryEntry {
    pub fn root(&self) -> &Path {
        match self {
            RepositoryEntry::Directory(root) => root,
            RepositoryEntry::Explicit { root, .. } => root,
        }
    }
}

/// An isolated project root with its own alias map.
#[derive(Debug, Clone)]
pub struct RepositoryContext {
    pub root: PathBuf,
    pub aliases: AliasMap,
    pub config_sources: Vec<PathBuf>,
}

impl RepositoryContext {
    /// A context with no aliases, for files that no configured root owns.
    pub fn detached(root: impl Into<PathBuf>) -> Self {
        Self {
            root: normalize_path(&root.into()),
            aliases: AliasMap::default(),
            config_sources: Vec::new(),
        }
    }

    pub fn load(fs: &dyn FileSystem, entry: &RepositoryEntry, workspace_root: &Path) -> Self {
        let root = normalize_path(&workspace_root.join(entry.root()));

        let config_file = match entry {
            RepositoryEntry::Directory(_) => CONFIG_FILE_NAMES
                .iter()
                .map(|name| root.join(name))
                .find(|candidate| fs.is_file(candidate)),
            RepositoryEntry::Explicit { tsconfig, .. } => {
                Some(normalize_path(&workspace_root.join(tsconfig)))
            }
        };

        let Some(config_file) = config_file else {
            debug!("No alias configuration found under {}", root.display());
            return Self::detached(root);
        };

        let sources = load_config_sources(fs, &config_file);
        let aliases = AliasMap::from_sources(&sources);
        info!(
            "Repository {}: {} alias pattern(s) from {} configuration source(s)",
            root.display(),
            aliases.len(),
            sources.len()
        );

        Self {
            root,
            aliases,
            config_sources: sources.into_iter().map(|s| s.path).collect(),
        }
    }

    /// True if `file` lies under this root, ignoring case.
    pub fn owns(&self, file: &Path) -> bool {
        path_key(file).starts_with(path_key(&self.root))
    }
}

/// Picks the owning repository of a file by longest root prefix.
#[derive(Debug, Clone, Default)]
pub struct RepositoryResolver {
    contexts: Vec<Arc<RepositoryContext>>,
}

impl RepositoryResolver {
    pub fn new(contexts: Vec<RepositoryContext>) -> Self {
        Self {
            contexts: contexts.into_iter().map(Arc::new).collect(),
        }
    }

    /// Build contexts for `entries`; with no entries the workspace root is the
    /// only repository.
    pub fn load(fs: &dyn FileSystem, workspace_root: &Path, entries: &[RepositoryEntry]) -> Self {
        let default_entry = [RepositoryEntry::Directory(PathBuf::from("."))];
        let entries = if entries.is_empty() {
            &default_entry[..]
        } else {
            entries
        };

        Self::new(
            entries
                .iter()
                .map(|entry| RepositoryContext::load(fs, entry, workspace_root))
                .collect(),
        )
    }

    pub fn contexts(&self) -> &[Arc<RepositoryContext>] {
        &self.contexts
    }

    pub fn context_for(&self, file: &Path) -> Option<Arc<RepositoryContext>> {
        self.contexts
            .iter()
            .filter(|ctx| ctx.owns(file))
            .max_by_key(|ctx| ctx.root.components().count())
            .cloned()
    }

    pub fn find_by_root(&self, root: &Path) -> Option<Arc<RepositoryContext>> {
        let key = path_key(root);
        self.contexts
            .iter()
            .find(|ctx| path_key(&ctx.root) == key)
            .cloned()
    }
}
