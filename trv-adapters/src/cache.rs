//! Local snapshot of the last successful remote response
//!
//! A single JSON file holding the verbatim envelope. Saving replaces the file
//! wholesale through a temporary sibling and a rename, so a reader never sees
//! a half-written snapshot. There is no expiry, versioning or checksum.

use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use trv_core::{CacheError, CacheMiss};

/// Raw envelope as received from the remote store
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot(Value);

impl CacheSnapshot {
    pub fn new(envelope: Value) -> Self {
        Self(envelope)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// The cache file owned by one source
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot. Absent or unparseable files are a miss, not an error.
    pub fn load(&self) -> Result<CacheSnapshot, CacheMiss> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(CacheMiss::Absent),
            Err(e) => return Err(CacheMiss::Unreadable(e.to_string())),
        };

        serde_json::from_str(&content)
            .map(CacheSnapshot)
            .map_err(|e| CacheMiss::Corrupt(e.to_string()))
    }

    /// Replace the snapshot
    pub fn save(&self, snapshot: &CacheSnapshot) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&snapshot.0)?;
        let temp_path = self.temp_path();

        if let Err(e) = write_then_rename(&temp_path, &self.path, content.as_bytes()) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_then_rename(temp_path: &Path, path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut temp_file = fs::File::create(temp_path)?;
    temp_file.write_all(content)?;
    temp_file.sync_all()?;
    fs::rename(temp_path, path)
}
