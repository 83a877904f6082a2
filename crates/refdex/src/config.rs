//! TOML configuration parsing and validation.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub library: LibraryConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub notes: NotesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LibraryConfig {
    /// The Zotero data folder: contains `zotero.sqlite` and `storage/`.
    pub path: PathBuf,
    /// Where the private snapshot copy lives. Defaults to
    /// `<data-dir>/refdex/snapshot.sqlite`.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Queries shorter than this are refused by the CLI before they
    /// reach the index. The index itself accepts any query.
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,
}

fn default_min_query_length() -> usize {
    3
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_length: default_min_query_length(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct NotesConfig {
    /// Directory of Markdown notes. Unset disables note lookup.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

impl LibraryConfig {
    pub fn database_path(&self) -> PathBuf {
        self.path.join("zotero.sqlite")
    }

    pub fn storage_path(&self) -> PathBuf {
        self.path.join("storage")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_path
            .clone()
            .unwrap_or_else(default_snapshot_path)
    }
}

fn default_snapshot_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("refdex")
        .join("snapshot.sqlite")
}

/// Whether `path` looks like a Zotero data folder.
pub fn is_zotero_folder(path: &Path) -> bool {
    path.join("zotero.sqlite").exists()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.library.path.as_os_str().is_empty() {
        anyhow::bail!("library.path must not be empty");
    }

    Ok(config)
}
