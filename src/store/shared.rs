//! Concurrency-safe core store
//!
//! Wraps the single-threaded engine behind a read-write lock so that
//! parallel threads can share one store instance. Single-key `get`, `set`
//! and `delete` are each atomic with respect to one another.

use super::entry::Entry;
use super::memory::MemoryStore;
use super::{KeyScan, Store};
use crate::error::{Result, StoreError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;

/// Thread-safe in-memory key-value store.
///
/// Reads take the read lock; an expired entry is evicted under the write
/// lock after a re-check, so the check-then-evict sequence is a single
/// critical section per key and a reader can never observe a value both
/// present and then resurrected.
pub struct SharedStore<T> {
    inner: RwLock<MemoryStore<T>>,
}

impl<T: Clone> SharedStore<T> {
    /// Create a new empty store
    pub fn new() -> Self {
        SharedStore {
            inner: RwLock::new(MemoryStore::new()),
        }
    }

    /// Create a new store with the given initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        SharedStore {
            inner: RwLock::new(MemoryStore::with_capacity(capacity)),
        }
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if the store holds no live entries
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Remove every expired entry, returning the number removed
    pub fn sweep_expired(&self) -> usize {
        self.inner.write().sweep_expired()
    }

    /// Remove all entries
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Insert an entry with an explicit expiration, used by the cache layer
    pub(crate) fn set_with_ttl(&self, key: &str, value: T, ttl: Duration) {
        self.inner
            .write()
            .insert_entry(key, Entry::with_ttl(value, ttl));
    }

    /// Remaining TTL for a live entry.
    ///
    /// `Ok(None)` means the entry never expires. Follows the same atomic
    /// eviction discipline as `get`.
    pub(crate) fn remaining_ttl(&self, key: &str) -> Result<Option<Duration>> {
        {
            let guard = self.inner.read();
            match guard.peek(key) {
                Some(entry) if !entry.is_expired() => return Ok(entry.remaining_ttl()),
                None => return Err(StoreError::not_found(key)),
                Some(_) => {}
            }
        }

        let mut guard = self.inner.write();
        guard.remove_expired(key);
        match guard.peek(key) {
            Some(entry) if !entry.is_expired() => Ok(entry.remaining_ttl()),
            _ => Err(StoreError::not_found(key)),
        }
    }

    /// Snapshot of all live values, used by the persistence layer
    pub(crate) fn export(&self) -> HashMap<String, T> {
        self.inner
            .read()
            .iter_live()
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    /// Hydrate from a decoded snapshot, used by the persistence layer
    pub(crate) fn hydrate(records: HashMap<String, T>) -> Self {
        let mut inner = MemoryStore::with_capacity(records.len().max(1024));
        for (key, value) in records {
            inner.set(key, value);
        }
        SharedStore {
            inner: RwLock::new(inner),
        }
    }
}

impl<T: Clone> Store<T> for SharedStore<T> {
    fn get(&self, key: &str) -> Result<T> {
        // Fast path under the read lock
        {
            let guard = self.inner.read();
            match guard.peek(key) {
                Some(entry) if !entry.is_expired() => return Ok(entry.value.clone()),
                None => return Err(StoreError::not_found(key)),
                Some(_) => {}
            }
        }

        // Expired: evict under the write lock with a re-check, since a
        // concurrent set may have replaced the entry in between
        let mut guard = self.inner.write();
        guard.remove_expired(key);
        match guard.peek(key) {
            Some(entry) if !entry.is_expired() => Ok(entry.value.clone()),
            _ => Err(StoreError::not_found(key)),
        }
    }

    fn set(&self, key: &str, value: T) -> Result<()> {
        self.inner.write().set(key, value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.inner.write().delete(key))
    }
}

impl<T: Clone> KeyScan for SharedStore<T> {
    fn keys(&self) -> Vec<String> {
        self.inner.read().keys()
    }

    fn contains(&self, key: &str) -> bool {
        self.inner
            .read()
            .peek(key)
            .is_some_and(|entry| !entry.is_expired())
    }
}

impl<T: Clone> Default for SharedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
