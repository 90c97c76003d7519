//! Single-threaded in-memory storage engine
//!
//! The core map every other layer is built from. Not safe for concurrent
//! access; wrap it in [`SharedStore`](super::SharedStore) for that.

use super::entry::Entry;
use crate::error::{Result, StoreError};
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::time::Duration;

/// Type alias for the store map with SipHasher
type StoreMap<T> = HashMap<String, Entry<T>, BuildHasherDefault<SipHasher13>>;

/// Single-threaded in-memory key-value store.
///
/// Expiration is enforced lazily: an expired entry stays in the map until a
/// read touches it or [`sweep_expired`](MemoryStore::sweep_expired) runs.
/// Expired-but-unaccessed entries therefore hold memory; that is the
/// documented tradeoff of having no background sweep.
///
/// Keys are not validated for emptiness; that is the caller's
/// responsibility.
pub struct MemoryStore<T> {
    records: StoreMap<T>,
}

impl<T> MemoryStore<T> {
    /// Create a new store with default capacity
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create a new store with the given initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        MemoryStore {
            records: HashMap::with_capacity_and_hasher(
                capacity,
                BuildHasherDefault::<SipHasher13>::default(),
            ),
        }
    }

    /// Get a value by key.
    ///
    /// An expired entry is removed before `NotFound` is reported, so it can
    /// never resurrect on a later read.
    pub fn get(&mut self, key: &str) -> Result<&T> {
        if self
            .records
            .get(key)
            .is_some_and(|entry| entry.is_expired())
        {
            self.records.remove(key);
            return Err(StoreError::not_found(key));
        }

        self.records
            .get(key)
            .map(|entry| &entry.value)
            .ok_or_else(|| StoreError::not_found(key))
    }

    /// Set a key-value pair without expiration. Last writer wins.
    pub fn set(&mut self, key: impl Into<String>, value: T) {
        self.records.insert(key.into(), Entry::new(value));
    }

    /// Set a key-value pair that expires `ttl` from now
    pub fn set_with_ttl(&mut self, key: impl Into<String>, value: T, ttl: Duration) {
        self.records.insert(key.into(), Entry::with_ttl(value, ttl));
    }

    /// Delete a key, returns true if a live (non-expired) entry existed
    pub fn delete(&mut self, key: &str) -> bool {
        match self.records.remove(key) {
            Some(entry) => !entry.is_expired(),
            None => false,
        }
    }

    /// Check if a live entry exists for the key, evicting it if expired
    pub fn exists(&mut self, key: &str) -> bool {
        self.get(key).is_ok()
    }

    /// All keys with a live entry
    pub fn keys(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.records
            .values()
            .filter(|entry| !entry.is_expired())
            .count()
    }

    /// Check if the store holds no live entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Remove every expired entry, returning the number removed
    pub fn sweep_expired(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|_, entry| !entry.is_expired());
        before - self.records.len()
    }

    /// Look at the raw entry without evicting
    pub(crate) fn peek(&self, key: &str) -> Option<&Entry<T>> {
        self.records.get(key)
    }

    /// Remove the entry only if it is present and expired.
    ///
    /// Returns true if an entry was removed. A fresh entry written by a
    /// concurrent `set` is left untouched.
    pub(crate) fn remove_expired(&mut self, key: &str) -> bool {
        match self.records.get(key) {
            Some(entry) if entry.is_expired() => {
                self.records.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Insert a pre-built entry
    pub(crate) fn insert_entry(&mut self, key: impl Into<String>, entry: Entry<T>) {
        self.records.insert(key.into(), entry);
    }

    /// Iterate over live entries
    pub(crate) fn iter_live(&self) -> impl Iterator<Item = (&String, &Entry<T>)> {
        self.records
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
