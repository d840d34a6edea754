use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::parser::strip_jsonc;
use super::repository::RepositoryEntry;
use crate::error::NavError;

/// Server settings file, e.g.
///
/// ```json
/// { "repositories": ["packages/site", { "root": "packages/app", "tsconfig": "packages/app/tsconfig.app.json" }] }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub repositories: Vec<RepositoryEntry>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, NavError> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&strip_jsonc(&text))
            .map_err(|e| NavError::SettingsError(format!("{}: {}", path.display(), e)))
    }

    /// Settings-file entries followed by bare directories given on the command line.
    pub fn with_directories(mut self, dirs: &[PathBuf]) -> Self {
        self.repositories
            .extend(dirs.iter().cloned().map(RepositoryEntry::Directory));
        self
    }
}
