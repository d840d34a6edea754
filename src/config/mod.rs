pub mod parser;
pub mod repository;
pub mod settings;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::vfs::{normalize_path, path_key, FileSystem};

use self::parser::RawConfig;

/// File names probed when a repository entry only names a directory.
pub const CONFIG_FILE_NAMES: &[&str] = &["tsconfig.json", "jsconfig.json"];

/// One alias-bearing configuration file, with its templates already
/// resolved to absolute roots.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub base_url: PathBuf,
    pub paths: Vec<(String, Vec<PathBuf>)>,
}

/// Load `entry` and everything it extends or references, in discovery order.
///
/// Extended configurations come before the file that extends them, referenced
/// projects after it, so a last-wins merge lets the most specific source win.
/// Unreadable or malformed files are logged and skipped.
pub fn load_config_sources(fs: &dyn FileSystem, entry: &Path) -> Vec<ConfigSource> {
    let mut visited = HashSet::new();
    let mut sources = Vec::new();
    visit_config(fs, &normalize_path(entry), &mut visited, &mut sources);
    debug!(
        "Loaded {} configuration source(s) starting at {}",
        sources.len(),
        entry.display()
    );
    sources
}

fn visit_config(
    fs: &dyn FileSystem,
    path: &Path,
    visited: &mut HashSet<PathBuf>,
    sources: &mut Vec<ConfigSource>,
) {
    if !visited.insert(path_key(path)) {
        return;
    }

    let raw = match read_config(fs, path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Skipping configuration: {}", e);
            return;
        }
    };
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    if let Some(ref extends) = raw.extends {
        for target in extends.targets() {
            // Package-style `extends` would need node module resolution
            if !target.starts_with('.') && !Path::new(target).is_absolute() {
                debug!("Ignoring non-relative extends '{}' in {}", target, path.display());
                continue;
            }
            let mut extended = normalize_path(&dir.join(target));
            if extended.extension().map_or(true, |ext| ext != "json") {
                extended.as_mut_os_string().push(".json");
            }
            visit_config(fs, &extended, visited, sources);
        }
    }

    sources.push(config_source(path, &dir, &raw));

    for reference in &raw.references {
        let mut target = normalize_path(&dir.join(&reference.path));
        if target.extension().map_or(true, |ext| ext != "json") {
            target = target.join("tsconfig.json");
        }
        visit_config(fs, &target, visited, sources);
    }
}

fn read_config(fs: &dyn FileSystem, path: &Path) -> Result<RawConfig, ConfigError> {
    if !fs.is_file(path) {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let text = fs.read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    parser::parse_config_text(&text).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

fn config_source(path: &Path, dir: &Path, raw: &RawConfig) -> ConfigSource {
    let options = raw.compiler_options.as_ref();
    let base_url = normalize_path(
        &dir.join(options.and_then(|o| o.base_url.as_deref()).unwrap_or(".")),
    );

    let paths = options
        .map(|o| {
            o.paths
                .iter()
                .map(|(pattern, templates)| {
                    let roots = templates
                        .iter()
                        .map(|t| resolve_template(&base_url, t))
                        .collect();
                    (pattern.clone(), roots)
                })
                .collect()
        })
        .unwrap_or_default();

    ConfigSource {
        path: path.to_path_buf(),
        base_url,
        paths,
    }
}

fn resolve_template(base_url: &Path, template: &str) -> PathBuf {
    let trimmed = template
        .strip_suffix("/*")
        .or_else(|| template.strip_suffix('*'))
        .unwrap_or(template);
    normalize_path(&base_url.join(trimmed))
}

#[derive(Debug, Clone)]
pub struct AliasEntry {
    pub pattern: String,
    pub prefix: String,
    pub roots: Vec<PathBuf>,
}

/// Alias patterns of one repository, kept sorted longest prefix first.
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    entries: Vec<AliasEntry>,
}

impl AliasMap {
    /// Merge sources in order; a later source replaces an earlier source's
    /// roots for the same pattern.
    pub fn from_sources(sources: &[ConfigSource]) -> Self {
        let mut merged: HashMap<String, Vec<PathBuf>> = HashMap::new();
        for source in sources {
            for (pattern, roots) in &source.paths {
                merged.insert(pattern.clone(), roots.clone());
            }
        }
        Self::from_entries(merged)
    }

    pub fn from_entries<P: Into<String>>(entries: impl IntoIterator<Item = (P, Vec<PathBuf>)>) -> Self {
        let mut entries: Vec<AliasEntry> = entries
            .into_iter()
            .map(|(pattern, roots)| {
                let pattern: String = pattern.into();
                let prefix = pattern.strip_suffix('*').unwrap_or(pattern.as_str()).to_string();
                AliasEntry {
                    pattern,
                    prefix,
                    roots,
                }
            })
            .collect();
        entries.sort_by(|a, b| {
            b.prefix
                .len()
                .cmp(&a.prefix.len())
                .then_with(|| a.pattern.cmp(&b.pattern))
        });
        Self { entries }
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every root of the longest matching pattern joined with the rest of the
    /// import path. Empty when no pattern matches.
    pub fn candidates(&self, import_path: &str) -> Vec<PathBuf> {
        let Some(entry) = self
            .entries
            .iter()
            .find(|e| import_path.starts_with(e.prefix.as_str()))
        else {
            return Vec::new();
        };

        let rest = import_path[entry.prefix.len()..].trim_start_matches('/');
        entry
            .roots
            .iter()
            .map(|root| {
                if rest.is_empty() {
                    root.clone()
                } else {
                    normalize_path(&root.join(rest))
                }
            })
            .collect()
    }

    pub fn resolve(&self, import_path: &str) -> Option<PathBuf> {
        self.candidates(import_path).into_iter().next()
    }
}
