//! Secondary indexing and pattern search layer
//!
//! Maintains named secondary mappings from an application-chosen value to
//! the set of keys sharing that value, plus wildcard search over the
//! backing store's key set.
//!
//! Index maintenance is explicit: nothing is derived from `set`/`delete` of
//! the backing store, and deleting a key does not touch the indexes.
//! Dangling references are instead filtered out when an index is read (see
//! [`get_from_index`](IndexedStore::get_from_index)). Removing entries from
//! an index is not part of the public contract.

mod pattern;

use crate::error::Result;
use crate::store::{KeyScan, Store};
use parking_lot::RwLock;
use pattern::matches_pattern;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Map from index value to the set of keys indexed under it
type IndexMap = HashMap<String, BTreeSet<String>>;

/// A store decorated with secondary indexes and wildcard key search.
///
/// Wraps any concurrency-safe store that can enumerate its keys. Index
/// reads observe a snapshot that may be stale relative to concurrent
/// writers; consistency is eventual, not linearizable.
pub struct IndexedStore<S> {
    inner: S,
    indexes: RwLock<HashMap<String, IndexMap>>,
}

impl<S> IndexedStore<S> {
    /// Wrap a backing store
    pub fn new(inner: S) -> Self {
        IndexedStore {
            inner,
            indexes: RwLock::new(HashMap::new()),
        }
    }

    /// Access the backing store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Insert `(index_value, key)` into the named index.
    ///
    /// Idempotent: inserting the same pair twice is a no-op. Safe under
    /// concurrent calls against the same index name.
    pub fn add_to_index(&self, index_name: &str, key: &str, index_value: &str) {
        let mut indexes = self.indexes.write();
        let index = indexes.entry(index_name.to_string()).or_insert_with(|| {
            debug!("creating index '{}'", index_name);
            IndexMap::new()
        });
        index
            .entry(index_value.to_string())
            .or_default()
            .insert(key.to_string());
    }
}

impl<S: KeyScan> IndexedStore<S> {
    /// Exact-match lookup: the keys indexed under `(index_name,
    /// index_value)`.
    ///
    /// Returns an empty set, not an error, for an unknown index or value.
    /// Keys that no longer exist in the backing store are filtered out
    /// here, since deletion does not maintain the indexes.
    pub fn get_from_index(&self, index_name: &str, index_value: &str) -> BTreeSet<String> {
        let indexes = self.indexes.read();
        match indexes.get(index_name).and_then(|index| index.get(index_value)) {
            Some(keys) => keys
                .iter()
                .filter(|key| self.inner.contains(key))
                .cloned()
                .collect(),
            None => BTreeSet::new(),
        }
    }

    /// Find keys of the backing store matching a glob pattern.
    ///
    /// `*` matches any substring (including the empty one), anchored at
    /// both ends. Evaluated against a snapshot of the backing store's
    /// current key set, not the index structures.
    pub fn find_keys(&self, pattern: &str) -> Vec<String> {
        self.inner
            .keys()
            .into_iter()
            .filter(|key| matches_pattern(key, pattern))
            .collect()
    }
}

impl<T, S: Store<T>> Store<T> for IndexedStore<S> {
    fn get(&self, key: &str) -> Result<T> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: T) -> Result<()> {
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.inner.delete(key)
    }
}

impl<S: KeyScan> KeyScan for IndexedStore<S> {
    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SharedStore;
    use std::sync::Arc;

    fn store_with_users() -> IndexedStore<SharedStore<String>> {
        let store = IndexedStore::new(SharedStore::new());
        store.set("u1", "alice".to_string()).unwrap();
        store.set("u2", "bob".to_string()).unwrap();
        store.set("u3", "carol".to_string()).unwrap();
        store
    }

    #[test]
    fn test_index_lookup() {
        let store = store_with_users();
        store.add_to_index("city", "u1", "NYC");
        store.add_to_index("city", "u2", "NYC");
        store.add_to_index("city", "u3", "LA");

        let nyc = store.get_from_index("city", "NYC");
        assert_eq!(
            nyc.into_iter().collect::<Vec<_>>(),
            vec!["u1".to_string(), "u2".to_string()]
        );

        let la = store.get_from_index("city", "LA");
        assert_eq!(la.into_iter().collect::<Vec<_>>(), vec!["u3".to_string()]);
    }

    #[test]
    fn test_idempotent_add() {
        let store = store_with_users();
        store.add_to_index("city", "u1", "NYC");
        store.add_to_index("city", "u1", "NYC");

        assert_eq!(store.get_from_index("city", "NYC").len(), 1);
    }

    #[test]
    fn test_unknown_index_or_value() {
        let store = store_with_users();
        store.add_to_index("city", "u1", "NYC");

        assert!(store.get_from_index("age", "25").is_empty());
        assert!(store.get_from_index("city", "Tokyo").is_empty());
    }

    #[test]
    fn test_index_value_with_separator() {
        let store = store_with_users();
        // Values containing ':' must not bleed into other lookups
        store.add_to_index("name", "u1", "a:b");
        store.add_to_index("name", "u2", "a");

        let keys = store.get_from_index("name", "a");
        assert_eq!(keys.into_iter().collect::<Vec<_>>(), vec!["u2".to_string()]);
    }

    #[test]
    fn test_dangling_reference_filtered() {
        let store = store_with_users();
        store.add_to_index("city", "u1", "NYC");
        store.add_to_index("city", "u2", "NYC");

        store.delete("u1").unwrap();

        let keys = store.get_from_index("city", "NYC");
        assert_eq!(keys.into_iter().collect::<Vec<_>>(), vec!["u2".to_string()]);
    }

    #[test]
    fn test_find_keys() {
        let store = IndexedStore::new(SharedStore::new());
        store.set("user:42:name", 1).unwrap();
        store.set("user:42:nickname", 2).unwrap();
        store.set("user:7:name", 3).unwrap();

        let mut keys = store.find_keys("user:*:name");
        keys.sort();
        assert_eq!(keys, vec!["user:42:name", "user:7:name"]);
    }

    #[test]
    fn test_find_keys_skips_expired() {
        let inner: SharedStore<i32> = SharedStore::new();
        inner.set_with_ttl("dead:1", 0, std::time::Duration::from_millis(0));
        let store = IndexedStore::new(inner);
        store.set("live:1", 1).unwrap();

        assert_eq!(store.find_keys("*"), vec!["live:1".to_string()]);
    }

    #[test]
    fn test_concurrent_add_to_index() {
        let store = Arc::new(store_with_users());
        let mut handles = Vec::new();

        for _ in 0..4 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..50 {
                    store.add_to_index("city", "u1", "NYC");
                    store.add_to_index("city", "u2", "NYC");
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get_from_index("city", "NYC").len(), 2);
    }
}
