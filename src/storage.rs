//! Key-value snapshot storage
//!
//! The task store persists its whole mapping into a single named slot.
//! [`FileStorage`] keeps one JSON file per slot under a data directory:
//!
//! ```text
//! <data_dir>/
//!   taskcal.toml        # Optional configuration
//!   tasks.json          # Snapshot for slot "tasks"
//!   tasks.json.lock     # Advisory lock guarding the snapshot
//! ```
//!
//! [`MemoryStorage`] keeps slots in memory for tests and embedding.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{Error, Result};
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};

/// Slot holding the serialized task mapping
pub const TASKS_SLOT: &str = "tasks";

/// Fallback data directory when no platform data dir is available
pub const LOCAL_DIR: &str = ".taskcal";

/// External key-value storage for whole snapshots.
pub trait SnapshotStorage {
    /// Read the value stored under `key`, `None` if never written.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// File-backed slots: `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn slot_path(&self, key: &str) -> Result<PathBuf> {
        validate_slot_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SnapshotStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        lock::read_locked_str(&path, self.lock_timeout_ms)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        lock::write_atomic_locked(&path, value.as_bytes(), self.lock_timeout_ms)
    }
}

/// In-memory slots
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a slot without counting it as a write.
    pub fn with_slot(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.slots.insert(key.into(), value.into());
        self
    }

    /// Raw value of a slot.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }

    /// Number of writes performed through [`SnapshotStorage::write`].
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Slot keys become file names, so keep them to a safe alphabet.
pub fn validate_slot_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidConfig("storage slot cannot be empty".to_string()));
    }
    if !key
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Err(Error::InvalidConfig(format!(
            "storage slot '{key}' must be alphanumeric, '-' or '_'"
        )));
    }
    Ok(())
}

/// Resolve the data directory: explicit path, platform data dir, or `./.taskcal`.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    ProjectDirs::from("", "", "taskcal")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(LOCAL_DIR))
}
