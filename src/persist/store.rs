//! Write-through persistent store

use super::snapshot::{SnapshotReader, SnapshotWriter};
use super::PersistConfig;
use crate::error::Result;
use crate::store::{KeyScan, SharedStore, Store};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Concurrency-safe store mirrored to a snapshot file on every mutation.
///
/// Construction hydrates the in-memory store from an existing snapshot
/// before any operation is accepted. Both `set` and `delete` rewrite the
/// snapshot *before* the in-memory store changes and before the call
/// returns, so any value visible to a subsequent `get` has already reached
/// disk, and a failed flush leaves memory untouched.
///
/// Flushes are serialized by a mutex and the file is replaced atomically;
/// concurrent writers never interleave file bytes. The instance owns its
/// file path exclusively; two instances must not target the same path.
///
/// Expiration metadata is not persisted: this layer composes with the plain
/// concurrency-safe store.
pub struct PersistentStore<T> {
    inner: SharedStore<T>,
    writer: SnapshotWriter,
    /// Serializes the mutate-and-flush sequence of set/delete
    flush_lock: Mutex<()>,
}

impl<T> PersistentStore<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Open a persistent store backed by the given snapshot path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(PersistConfig::new(path.as_ref()))
    }

    /// Open a persistent store with explicit configuration.
    ///
    /// Fails with [`Codec`](crate::StoreError::Codec) if the snapshot file
    /// exists but is malformed, and with [`Io`](crate::StoreError::Io) if
    /// it cannot be read. A missing file starts the store empty.
    pub fn with_config(config: PersistConfig) -> Result<Self> {
        let inner = match SnapshotReader::new(&config.path).load()? {
            Some(records) => SharedStore::hydrate(records),
            None => {
                info!(
                    "no snapshot at {}, starting empty",
                    config.path.display()
                );
                SharedStore::new()
            }
        };

        Ok(PersistentStore {
            inner,
            writer: SnapshotWriter::new(config.path, config.sync_on_flush),
            flush_lock: Mutex::new(()),
        })
    }

    /// Path of the backing snapshot file
    pub fn path(&self) -> &Path {
        self.writer.path()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the store holds no live entries
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T> Store<T> for PersistentStore<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    fn get(&self, key: &str) -> Result<T> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: T) -> Result<()> {
        let _guard = self.flush_lock.lock();

        // Flush the post-mutation snapshot first: a value only becomes
        // visible in memory once it is durable on disk
        let mut records = self.inner.export();
        records.insert(key.to_string(), value.clone());
        self.writer.write(&records)?;

        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let _guard = self.flush_lock.lock();

        let mut records = self.inner.export();
        if records.remove(key).is_some() {
            self.writer.write(&records)?;
        }

        self.inner.delete(key)
    }
}

impl<T> KeyScan for PersistentStore<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }
}
