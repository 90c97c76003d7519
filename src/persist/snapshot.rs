//! Snapshot encode/decode
//!
//! The persisted layout is a single JSON object mapping every key to its
//! value: self-describing, so values round-trip without losing the semantic
//! type information the caller relied on. The file is replaced wholesale by
//! writing to a temp file in the same directory and renaming it over the
//! old one, so a crash mid-write can never leave a truncated snapshot.

use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, error, info};

/// Writes whole-store snapshots to a fixed path
pub struct SnapshotWriter {
    path: PathBuf,
    sync_on_flush: bool,
}

impl SnapshotWriter {
    /// Create a writer targeting the given path
    pub fn new(path: impl Into<PathBuf>, sync_on_flush: bool) -> Self {
        SnapshotWriter {
            path: path.into(),
            sync_on_flush,
        }
    }

    /// Serialize the records and atomically replace the snapshot file
    pub fn write<T: Serialize>(&self, records: &HashMap<String, T>) -> Result<()> {
        let data = serde_json::to_vec(records)?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&data)?;
        if self.sync_on_flush {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        debug!(
            "flushed snapshot: {} records, {} bytes",
            records.len(),
            data.len()
        );
        Ok(())
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Loads whole-store snapshots from a fixed path
pub struct SnapshotReader {
    path: PathBuf,
}

impl SnapshotReader {
    /// Create a reader targeting the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotReader { path: path.into() }
    }

    /// Load and decode the snapshot.
    ///
    /// Returns `Ok(None)` when no file exists yet. A file that exists but
    /// does not decode is a fatal error, never a silent empty start.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<HashMap<String, T>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let data = fs::read_to_string(&self.path)?;
        let records: HashMap<String, T> = serde_json::from_str(&data).map_err(|e| {
            error!("snapshot at {} is malformed: {}", self.path.display(), e);
            StoreError::Codec(e)
        })?;

        info!(
            "loaded snapshot from {}: {} records",
            self.path.display(),
            records.len()
        );
        Ok(Some(records))
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
