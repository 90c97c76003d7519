//! Core storage module
//!
//! Provides the uniform store contract and the two core variants: the
//! single-threaded engine and its concurrency-safe wrapper. Higher layers
//! (caching, indexing, persistence) compose over these through the
//! [`Store`] trait rather than inheriting from them.

mod entry;
mod memory;
mod shared;

pub use entry::Entry;
pub use memory::MemoryStore;
pub use shared::SharedStore;

use crate::error::Result;

/// The uniform contract every assembled store satisfies.
///
/// Single-key operations on concurrency-safe implementations are
/// linearizable with respect to each other. There is no ordering guarantee
/// across keys.
pub trait Store<T> {
    /// Retrieve a value by key.
    ///
    /// Fails with [`NotFound`](crate::StoreError::NotFound) when the key is
    /// absent or expired; there is no default-value fallback.
    fn get(&self, key: &str) -> Result<T>;

    /// Store or replace the value for a key. Last writer wins.
    fn set(&self, key: &str, value: T) -> Result<()>;

    /// Delete a key-value pair.
    ///
    /// Returns `Ok(true)` if a live entry existed, `Ok(false)` otherwise;
    /// deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<bool>;
}

/// Key-enumeration capability of a backing store.
///
/// The index layer needs this to evaluate wildcard searches against the
/// live key set and to filter dangling index references.
pub trait KeyScan {
    /// Snapshot of all live keys
    fn keys(&self) -> Vec<String>;

    /// Check whether a live entry exists for the key
    fn contains(&self, key: &str) -> bool;
}
