//! File access used by the resolver.
//!
//! Everything the engine reads goes through [`FileSystem`], so open editor
//! buffers ([`DocumentOverlay`]) and test fixtures ([`MemoryFileSystem`]) are
//! interchangeable with the disk.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use url::Url;
use walkdir::WalkDir;

pub const STYLESHEET_EXTENSIONS: &[&str] = &["scss", "sass"];

pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    fn is_file(&self, path: &Path) -> bool;

    /// All files below `dir`, recursively.
    fn list_files(&self, dir: &Path) -> Vec<PathBuf>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_files(&self, dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(dir)
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 || !e.file_type().is_dir() {
                    return true;
                }
                // Skip hidden dirs, build output and installed packages
                let name = e.file_name().to_string_lossy();
                !name.starts_with('.')
                    && name != "build"
                    && name != "dist"
                    && name != "target"
                    && name != "node_modules"
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect()
    }
}

/// In-memory file tree keyed by absolute path.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<BTreeMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<P, S>(files: impl IntoIterator<Item = (P, S)>) -> Self
    where
        P: Into<PathBuf>,
        S: Into<String>,
    {
        let fs = Self::new();
        for (path, text) in files {
            fs.insert(path, text);
        }
        fs
    }

    pub fn insert(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        let path = normalize_path(&path.into());
        self.files.write().insert(path, text.into());
    }

    pub fn remove(&self, path: &Path) -> Option<String> {
        self.files.write().remove(&normalize_path(path))
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .read()
            .get(&normalize_path(path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.read().contains_key(&normalize_path(path))
    }

    fn list_files(&self, dir: &Path) -> Vec<PathBuf> {
        let dir = normalize_path(dir);
        self.files
            .read()
            .keys()
            .filter(|p| p.starts_with(&dir))
            .cloned()
            .collect()
    }
}

/// Open editor documents layered over another file system. An open document's
/// buffer text wins over whatever is on disk.
pub struct DocumentOverlay {
    documents: RwLock<HashMap<PathBuf, Arc<str>>>,
    base: Arc<dyn FileSystem>,
}

impl DocumentOverlay {
    pub fn new(base: Arc<dyn FileSystem>) -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            base,
        }
    }

    pub fn set(&self, path: &Path, text: impl Into<Arc<str>>) {
        self.documents.write().insert(normalize_path(path), text.into());
    }

    /// Returns true if the document was open.
    pub fn close(&self, path: &Path) -> bool {
        self.documents.write().remove(&normalize_path(path)).is_some()
    }

    pub fn is_open(&self, path: &Path) -> bool {
        self.documents.read().contains_key(&normalize_path(path))
    }

    pub fn open_count(&self) -> usize {
        self.documents.read().len()
    }
}

impl FileSystem for DocumentOverlay {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        if let Some(text) = self.documents.read().get(&normalize_path(path)) {
            return Ok(text.to_string());
        }
        self.base.read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.is_open(path) || self.base.is_file(path)
    }

    fn list_files(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files: BTreeSet<PathBuf> = self.base.list_files(dir).into_iter().collect();
        let dir = normalize_path(dir);
        files.extend(
            self.documents
                .read()
                .keys()
                .filter(|p| p.starts_with(&dir))
                .cloned(),
        );
        files.into_iter().collect()
    }
}

/// Lexically resolve `.` and `..` components without touching the disk.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Case-folded form of a path, for comparisons that ignore case.
pub fn path_key(path: &Path) -> PathBuf {
    PathBuf::from(normalize_path(path).to_string_lossy().to_lowercase())
}

pub fn is_stylesheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| STYLESHEET_EXTENSIONS.contains(&ext))
}

/// Accepts either a plain path or a `file://` URI. URIs are percent-decoded;
/// one that does not name a local file is kept as a plain path.
pub fn path_from_uri(input: &str) -> PathBuf {
    if input.starts_with("file://") {
        if let Some(path) = Url::parse(input).ok().and_then(|url| url.to_file_path().ok()) {
            return path;
        }
    }
    PathBuf::from(input)
}
