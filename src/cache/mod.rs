//! Expiration layer
//!
//! Adds per-set time-to-live on top of the concurrency-safe core store.
//! Expiration is enforced lazily on access; there is no background sweep,
//! so expired-but-unaccessed entries keep holding memory until a read or an
//! explicit [`sweep`](CacheStore::sweep) removes them.

use crate::error::{Result, StoreError};
use crate::store::{KeyScan, SharedStore, Store};
use std::time::Duration;
use tracing::debug;

/// Concurrency-safe store with time-based expiration, for caching
/// scenarios.
///
/// A `get` that finds an expired entry removes it and reports
/// [`NotFound`](StoreError::NotFound) in a single per-key critical section:
/// the freshness check and the eviction cannot interleave with another
/// reader, so an item is never observed as present and then resurrected.
pub struct CacheStore<T> {
    inner: SharedStore<T>,
}

impl<T: Clone> CacheStore<T> {
    /// Create a new empty cache
    pub fn new() -> Self {
        CacheStore {
            inner: SharedStore::new(),
        }
    }

    /// Store a value that expires `ttl` from now.
    ///
    /// A zero TTL is rejected with
    /// [`InvalidArgument`](StoreError::InvalidArgument): the entry would be
    /// born expired.
    pub fn set_with_ttl(&self, key: &str, value: T, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return Err(StoreError::InvalidArgument(
                "TTL must be greater than zero".to_string(),
            ));
        }

        self.inner.set_with_ttl(key, value, ttl);
        Ok(())
    }

    /// Remaining time-to-live for a key.
    ///
    /// `Ok(None)` means the entry never expires. An absent or expired key
    /// fails with [`NotFound`](StoreError::NotFound), evicting the expired
    /// entry like `get` does.
    pub fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        self.inner.remaining_ttl(key)
    }

    /// Remove every expired entry now, returning the number removed.
    ///
    /// Optional helper for long-lived caches with many short-lived keys;
    /// correctness never depends on it.
    pub fn sweep(&self) -> usize {
        let removed = self.inner.sweep_expired();
        if removed > 0 {
            debug!("swept {} expired entries", removed);
        }
        removed
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the cache holds no live entries
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Clone> Store<T> for CacheStore<T> {
    fn get(&self, key: &str) -> Result<T> {
        self.inner.get(key)
    }

    /// Store a value without expiration
    fn set(&self, key: &str, value: T) -> Result<()> {
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.inner.delete(key)
    }
}

impl<T: Clone> KeyScan for CacheStore<T> {
    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }
}

impl<T: Clone> Default for CacheStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
