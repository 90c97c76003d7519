//! StrataKV - a layered, type-generic key-value store
//!
//! A small set of composable storage behaviors for lightweight caching and
//! embedded-storage scenarios: plain in-memory storage, concurrency-safe
//! storage, time-based expiration, secondary indexing with pattern search,
//! write-through disk persistence, and a multi-key transaction buffer.
//!
//! Behaviors are layered by composition over one uniform [`Store`]
//! contract, never by inheritance: each layer owns the layer below and adds
//! its behavior around the calls. A typical assembly:
//!
//! ```no_run
//! use stratakv::{IndexedStore, PersistentStore, Store};
//!
//! # fn main() -> stratakv::Result<()> {
//! let store = IndexedStore::new(PersistentStore::open("users.json")?);
//! store.set("u1", "alice".to_string())?;
//! store.add_to_index("city", "u1", "NYC");
//! # Ok(())
//! # }
//! ```
//!
//! Stores are explicitly constructed and caller-owned; there is no ambient
//! global instance.

pub mod cache;
pub mod error;
pub mod index;
pub mod persist;
pub mod store;
pub mod txn;

/// Re-export commonly used types
pub use cache::CacheStore;
pub use error::{Result, StoreError};
pub use index::IndexedStore;
pub use persist::{PersistConfig, PersistentStore};
pub use store::{Entry, KeyScan, MemoryStore, SharedStore, Store};
pub use txn::{Transaction, TxnOp};
