// Durable key-value persistence

use eyre::{Result, eyre};
use std::collections::HashMap;

/// Key under which the serialized task list lives
pub const TASKS_KEY: &str = "dashboard_todos";

/// Key under which the theme preference lives
pub const THEME_KEY: &str = "theme";

/// Best-effort key-value storage surviving across sessions
///
/// Callers treat a missing key as "nothing stored yet". Implementations
/// report I/O problems as errors and leave it to the caller whether to
/// propagate or swallow them.
pub trait DurableStore {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: DurableStore + ?Sized> DurableStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Keys double as file names and table keys, so keep them tame
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}

/// In-process store, gone when dropped
///
/// Counts successful writes and can be switched into a failing mode, which
/// makes it handy for observing what a service persists.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    writes: usize,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key without counting it as a write
    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    /// Number of successful `set` calls so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Make every subsequent `get` fail (or succeed again)
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Make every subsequent `set` fail (or succeed again)
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Raw stored value, bypassing the trait
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads {
            return Err(eyre!("Read of {} rejected: store is failing reads", key));
        }
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(eyre!("Write to {} rejected: store is failing writes", key));
        }
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}
