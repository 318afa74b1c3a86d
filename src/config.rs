//! Configuration
//!
//! Priority, highest first: CLI flags, YAML config file, compiled defaults.
//! A missing default config file is not an error; an explicit `--config`
//! path that doesn't exist is.

use crate::durable::{DurableStore, MemoryStore};
use crate::file::FileStore;
use crate::store::SqliteStore;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const APP_DIR: &str = "todostore";
const CONFIG_FILE: &str = "config.yaml";

/// Which durable store backs the task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// SQLite database under `<store_path>/.todostore`
    #[default]
    Sqlite,
    /// One JSON file per key under `<store_path>`
    File,
    /// Process memory only, nothing survives exit
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_path: PathBuf,
    pub backend: Backend,
}

/// On-disk shape; every field optional so a file can override selectively
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    store_path: Option<PathBuf>,
    backend: Option<Backend>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            backend: Backend::default(),
        }
    }
}

impl Config {
    /// Load from an explicit file, or the default location if it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                info!(path = ?path, "Loading config");
                Self::from_file(path)
            }
            None => match default_config_path() {
                Some(path) if path.exists() => {
                    info!(path = ?path, "Loading config");
                    Self::from_file(&path)
                }
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Parse a YAML config file layered over the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut config = Self::default();

        // An empty document deserializes to unit, not a map
        if content.trim().is_empty() {
            return Ok(config);
        }

        let file: ConfigFile = serde_yaml::from_str(content)?;
        if let Some(store_path) = file.store_path {
            config.store_path = store_path;
        }
        if let Some(backend) = file.backend {
            config.backend = backend;
        }
        Ok(config)
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, store_path: Option<PathBuf>, backend: Option<Backend>) -> Self {
        if let Some(store_path) = store_path {
            self.store_path = store_path;
        }
        if let Some(backend) = backend {
            self.backend = backend;
        }
        self
    }

    /// Open the configured backend
    pub fn open_durable(&self) -> Result<Box<dyn DurableStore>> {
        debug!(backend = ?self.backend, path = ?self.store_path, "Opening durable store");

        Ok(match self.backend {
            Backend::Sqlite => Box::new(SqliteStore::open(&self.store_path)?),
            Backend::File => Box::new(FileStore::open(&self.store_path)?),
            Backend::Memory => {
                warn!("Using in-memory store, changes will not be kept");
                Box::new(MemoryStore::new())
            }
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend, Backend::Sqlite);
        assert!(!config.store_path.as_os_str().is_empty());
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = Config::from_yaml("backend: file\n").unwrap();
        assert_eq!(config.backend, Backend::File);
        assert_eq!(config.store_path, default_store_path());

        let config = Config::from_yaml("store_path: /tmp/todos\nbackend: memory\n").unwrap();
        assert_eq!(config.store_path, PathBuf::from("/tmp/todos"));
        assert_eq!(config.backend, Backend::Memory);
    }

    #[test]
    fn test_from_yaml_empty_and_invalid() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
        assert!(Config::from_yaml("backend: postgres\n").is_err());
        assert!(Config::from_yaml("colour: blue\n").is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.yaml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_explicit_file_and_overrides() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "backend: file\nstore_path: from-file\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.backend, Backend::File);
        assert_eq!(config.store_path, PathBuf::from("from-file"));

        let config = config.with_overrides(Some(PathBuf::from("from-cli")), None);
        assert_eq!(config.store_path, PathBuf::from("from-cli"));
        assert_eq!(config.backend, Backend::File);
    }

    #[test]
    fn test_open_durable_backends() {
        let temp = TempDir::new().unwrap();

        for backend in [Backend::Sqlite, Backend::File, Backend::Memory] {
            let config = Config {
                store_path: temp.path().join(format!("{:?}", backend)),
                backend,
            };
            let mut durable = config.open_durable().unwrap();
            durable.set("theme", "dark").unwrap();
            assert_eq!(durable.get("theme").unwrap().as_deref(), Some("dark"));
        }
    }
}
