use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::{ImportEdge, Location, Symbol, SymbolKind};

/// Key of a memoized definition lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DefinitionKey {
    pub file: PathBuf,
    pub name: String,
    pub kind: SymbolKind,
    pub namespace: Option<String>,
}

#[derive(Debug, Default)]
struct Partition {
    imports: HashMap<PathBuf, Arc<Vec<ImportEdge>>>,
    forwards: HashMap<PathBuf, Arc<Vec<PathBuf>>>,
    definitions: HashMap<DefinitionKey, Option<Location>>,
    symbols: HashMap<PathBuf, Arc<Vec<Symbol>>>,
}

impl Partition {
    fn stats(&self, root: &Path) -> PartitionStats {
        PartitionStats {
            root: root.to_path_buf(),
            imports: self.imports.len(),
            forwards: self.forwards.len(),
            definitions: self.definitions.len(),
            symbols: self.symbols.len(),
        }
    }
}

/// Memo tables for the resolver, one partition per repository root.
///
/// Values are keyed by file path only, so requests that finish out of order
/// can never store a result under the wrong key. The lock is held for single
/// map operations, never while computing a value.
#[derive(Debug, Default)]
pub struct ResolverCache {
    partitions: Mutex<HashMap<PathBuf, Partition>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolverCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup<T>(&self, repo: &Path, get: impl FnOnce(&Partition) -> Option<T>) -> Option<T> {
        let found = self.partitions.lock().get(repo).and_then(get);
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    fn update(&self, repo: &Path, apply: impl FnOnce(&mut Partition)) {
        let mut partitions = self.partitions.lock();
        apply(partitions.entry(repo.to_path_buf()).or_default());
    }

    pub fn imports(&self, repo: &Path, file: &Path) -> Option<Arc<Vec<ImportEdge>>> {
        self.lookup(repo, |p| p.imports.get(file).cloned())
    }

    pub fn store_imports(&self, repo: &Path, file: &Path, edges: Arc<Vec<ImportEdge>>) {
        self.update(repo, |p| {
            p.imports.insert(file.to_path_buf(), edges);
        });
    }

    pub fn forwards(&self, repo: &Path, file: &Path) -> Option<Arc<Vec<PathBuf>>> {
        self.lookup(repo, |p| p.forwards.get(file).cloned())
    }

    pub fn store_forwards(&self, repo: &Path, file: &Path, targets: Arc<Vec<PathBuf>>) {
        self.update(repo, |p| {
            p.forwards.insert(file.to_path_buf(), targets);
        });
    }

    pub fn symbols(&self, repo: &Path, file: &Path) -> Option<Arc<Vec<Symbol>>> {
        self.lookup(repo, |p| p.symbols.get(file).cloned())
    }

    pub fn store_symbols(&self, repo: &Path, file: &Path, symbols: Arc<Vec<Symbol>>) {
        self.update(repo, |p| {
            p.symbols.insert(file.to_path_buf(), symbols);
        });
    }

    /// `Some(None)` is a cached negative result.
    pub fn definition(&self, repo: &Path, key: &DefinitionKey) -> Option<Option<Location>> {
        self.lookup(repo, |p| p.definitions.get(key).cloned())
    }

    pub fn store_definition(&self, repo: &Path, key: DefinitionKey, location: Option<Location>) {
        self.update(repo, |p| {
            p.definitions.insert(key, location);
        });
    }

    /// Forget everything derived from `file`. A file owned by one repository
    /// can still be imported from another, so its entries are dropped from
    /// every partition. Definition results are dropped too, since any of them
    /// may have passed through the file.
    pub fn invalidate_file(&self, file: &Path) {
        let mut partitions = self.partitions.lock();
        for (root, p) in partitions.iter_mut() {
            p.imports.remove(file);
            p.forwards.remove(file);
            p.symbols.remove(file);
            p.definitions.clear();
            debug!("Invalidated {} in {}", file.display(), root.display());
        }
    }

    /// Drop every resolved import, forward and definition of every partition,
    /// plus the symbols of `file`. Used when `file` appears or disappears:
    /// any import anywhere may now resolve differently. Other symbol tables
    /// only depend on their own file text and are kept.
    pub fn forget_resolution(&self, file: &Path) {
        let mut partitions = self.partitions.lock();
        for p in partitions.values_mut() {
            p.imports.clear();
            p.forwards.clear();
            p.definitions.clear();
            p.symbols.remove(file);
        }
        debug!("File set changed at {}", file.display());
    }

    pub fn invalidate_repository(&self, repo: &Path) {
        if self.partitions.lock().remove(repo).is_some() {
            debug!("Invalidated repository {}", repo.display());
        }
    }

    pub fn clear(&self) {
        self.partitions.lock().clear();
    }

    pub fn repository_stats(&self, repo: &Path) -> PartitionStats {
        self.partitions
            .lock()
            .get(repo)
            .map(|p| p.stats(repo))
            .unwrap_or_else(|| PartitionStats {
                root: repo.to_path_buf(),
                ..PartitionStats::default()
            })
    }

    pub fn stats(&self) -> CacheStats {
        let mut repositories: Vec<PartitionStats> = self
            .partitions
            .lock()
            .iter()
            .map(|(root, p)| p.stats(root))
            .collect();
        repositories.sort_by(|a, b| a.root.cmp(&b.root));

        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            repositories,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionStats {
    pub root: PathBuf,
    pub imports: usize,
    pub forwards: usize,
    pub definitions: usize,
    pub symbols: usize,
}

impl PartitionStats {
    pub fn total(&self) -> usize {
        self.imports + self.forwards + self.definitions + self.symbols
    }
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub repositories: Vec<PartitionStats>,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cache: {} hits, {} misses", self.hits, self.misses)?;
        for repo in &self.repositories {
            writeln!(
                f,
                "  {}: {} imports, {} forwards, {} definitions, {} symbol tables",
                repo.root.display(),
                repo.imports,
                repo.forwards,
                repo.definitions,
                repo.symbols
            )?;
        }
        Ok(())
    }
}
