//! Disk persistence module
//!
//! Provides write-through durability by mirroring the full store contents
//! to a JSON snapshot file on every mutation, and rehydrating from that
//! file on startup. The whole-file rewrite is O(total store size) per
//! write; acceptable for the small datasets this store targets, a scaling
//! limit beyond them.

mod snapshot;
mod store;

pub use snapshot::{SnapshotReader, SnapshotWriter};
pub use store::PersistentStore;

use std::path::PathBuf;

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistConfig {
    /// Path to the snapshot file
    pub path: PathBuf,

    /// Fsync the snapshot before it replaces the previous file.
    ///
    /// Disabling trades crash durability for write latency; the replacement
    /// itself stays atomic either way.
    pub sync_on_flush: bool,
}

impl PersistConfig {
    /// Configuration for the given snapshot path, fsync enabled
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PersistConfig {
            path: path.into(),
            sync_on_flush: true,
        }
    }
}

impl Default for PersistConfig {
    fn default() -> Self {
        PersistConfig {
            path: PathBuf::from("stratakv.json"),
            sync_on_flush: true,
        }
    }
}
