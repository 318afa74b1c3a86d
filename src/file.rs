// File-per-key durable store

use crate::durable::{DurableStore, validate_key};
use eyre::{Context, Result};
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores each key as `{key}.json` inside a directory
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Open or create a file store rooted at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }
}

impl DurableStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let path = self.key_path(key);

        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        let path = self.key_path(key);
        let tmp_path = self.base_path.join(format!("{}.json.tmp", key));

        // Serializes writers of the same key; held until the rename lands
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.base_path.join(format!("{}.lock", key)))
            .context("Failed to open lock file")?;
        lock.lock_exclusive().context("Failed to acquire file lock")?;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .with_context(|| format!("Failed to open {} for writing", tmp_path.display()))?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        // The old value stays intact until this replaces it
        fs::rename(&tmp_path, &path).with_context(|| format!("Failed to replace {}", path.display()))?;

        debug!(key, bytes = value.len(), file = ?path, "Wrote value");

        // Lock is released when the lock file is dropped
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_missing_key() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        assert_eq!(store.get("dashboard_todos").unwrap(), None);
    }

    #[test]
    fn test_file_store_overwrites() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::open(temp.path()).unwrap();

        store.set("theme", "light-and-long").unwrap();
        store.set("theme", "dark").unwrap();

        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        let on_disk = fs::read_to_string(temp.path().join("theme.json")).unwrap();
        assert_eq!(on_disk, "dark");
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let temp = TempDir::new().unwrap();
        {
            let mut store = FileStore::open(temp.path()).unwrap();
            store.set("dashboard_todos", "[]").unwrap();
        }

        let store = FileStore::open(temp.path()).unwrap();
        assert_eq!(store.get("dashboard_todos").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_failed_write_keeps_previous_value() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::open(temp.path()).unwrap();
        store.set("dashboard_todos", r#"[{"id":"a","text":"keep me","completed":false}]"#).unwrap();

        // A directory in the way of the temp file makes the next write fail
        fs::create_dir(temp.path().join("dashboard_todos.json.tmp")).unwrap();
        assert!(store.set("dashboard_todos", &"x".repeat(8192)).is_err());

        let value = store.get("dashboard_todos").unwrap().unwrap();
        assert_eq!(value, r#"[{"id":"a","text":"keep me","completed":false}]"#);
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::open(temp.path()).unwrap();

        store.set("theme", "dark").unwrap();
        assert!(!temp.path().join("theme.json.tmp").exists());
        assert!(temp.path().join("theme.json").exists());
    }

    #[test]
    fn test_file_store_rejects_bad_key() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::open(temp.path()).unwrap();

        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("").is_err());
    }
}
