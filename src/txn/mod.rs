//! Transaction buffer
//!
//! An independent staging area that accumulates set/delete operations and
//! applies them to a target store only on commit, through the same uniform
//! [`Store`] contract every layer satisfies.

use crate::error::{Result, StoreError};
use crate::store::Store;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// One operation replayed by a commit, as reported in
/// [`PartialCommit`](StoreError::PartialCommit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxnOp {
    /// A buffered set reached the target store
    Set(String),
    /// A buffered delete reached the target store
    Delete(String),
}

impl TxnOp {
    fn key(&self) -> &str {
        match self {
            TxnOp::Set(key) | TxnOp::Delete(key) => key,
        }
    }
}

/// A staging buffer of pending writes and deletes.
///
/// The most recent operation on a key wins: buffering a set evicts a
/// pending delete of the same key and vice versa, so a key is never in both
/// buffers at once.
///
/// Commit replays buffered sets, then buffered deletes, in that fixed
/// order. A caller needing per-key delete-then-set ordering simply buffers
/// the set last; the last-operation-wins rule resolves the rest.
pub struct Transaction<T> {
    pending_sets: HashMap<String, T>,
    pending_deletes: HashSet<String>,
    committed: bool,
}

impl<T: Clone> Transaction<T> {
    /// Create an empty buffer
    pub fn new() -> Self {
        Transaction {
            pending_sets: HashMap::new(),
            pending_deletes: HashSet::new(),
            committed: false,
        }
    }

    /// Buffer a set.
    ///
    /// Fails with [`AlreadyCommitted`](StoreError::AlreadyCommitted) after
    /// a commit; a committed buffer cannot stage further work.
    pub fn set(&mut self, key: impl Into<String>, value: T) -> Result<()> {
        if self.committed {
            return Err(StoreError::AlreadyCommitted);
        }
        let key = key.into();
        self.pending_deletes.remove(&key);
        self.pending_sets.insert(key, value);
        Ok(())
    }

    /// Buffer a delete.
    ///
    /// Fails with [`AlreadyCommitted`](StoreError::AlreadyCommitted) after
    /// a commit.
    pub fn delete(&mut self, key: impl Into<String>) -> Result<()> {
        if self.committed {
            return Err(StoreError::AlreadyCommitted);
        }
        let key = key.into();
        self.pending_sets.remove(&key);
        self.pending_deletes.insert(key);
        Ok(())
    }

    /// Number of buffered operations
    pub fn len(&self) -> usize {
        self.pending_sets.len() + self.pending_deletes.len()
    }

    /// Check if nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.pending_sets.is_empty() && self.pending_deletes.is_empty()
    }

    /// Apply the buffered operations to a target store: all sets, then all
    /// deletes.
    ///
    /// Idempotent at the buffer level: a second commit on an
    /// already-committed buffer is a no-op.
    ///
    /// Commit is all-or-nothing against the target store: the prior value
    /// of every touched key is captured first, and if a replay step fails,
    /// the operations already applied are rolled back. The failure surfaces
    /// as [`PartialCommit`](StoreError::PartialCommit), listing exactly the
    /// operations that had applied and whether the rollback succeeded.
    /// Against *concurrent* writers of the same keys the rollback is best
    /// effort only.
    pub fn commit<S: Store<T>>(&mut self, store: &S) -> Result<()> {
        if self.committed {
            return Ok(());
        }

        // Capture the prior state of every touched key for rollback
        let mut priors: HashMap<String, Option<T>> = HashMap::new();
        for key in self.pending_sets.keys().chain(self.pending_deletes.iter()) {
            let prior = match store.get(key) {
                Ok(value) => Some(value),
                Err(StoreError::NotFound(_)) => None,
                Err(e) => return Err(e),
            };
            priors.insert(key.clone(), prior);
        }

        let mut applied: Vec<TxnOp> = Vec::with_capacity(self.len());
        let failure = self.replay(store, &mut applied);

        match failure {
            None => {
                self.committed = true;
                Ok(())
            }
            Some(source) => {
                let rolled_back = Self::undo(store, &priors, &applied);
                if !rolled_back {
                    warn!(
                        "commit rollback incomplete after {} applied operation(s)",
                        applied.len()
                    );
                }
                Err(StoreError::PartialCommit {
                    applied,
                    rolled_back,
                    source: Box::new(source),
                })
            }
        }
    }

    /// Discard all pending operations.
    ///
    /// Before commit this empties the buffer, which stays usable. After
    /// commit it is a no-op, not an error: committed state already lives in
    /// the target store.
    pub fn rollback(&mut self) {
        if self.committed {
            return;
        }
        self.pending_sets.clear();
        self.pending_deletes.clear();
    }

    /// Check whether the buffer has committed
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    fn replay<S: Store<T>>(&self, store: &S, applied: &mut Vec<TxnOp>) -> Option<StoreError> {
        for (key, value) in &self.pending_sets {
            if let Err(e) = store.set(key, value.clone()) {
                return Some(e);
            }
            applied.push(TxnOp::Set(key.clone()));
        }
        for key in &self.pending_deletes {
            if let Err(e) = store.delete(key) {
                return Some(e);
            }
            applied.push(TxnOp::Delete(key.clone()));
        }
        None
    }

    /// Restore captured priors for the applied operations, newest first.
    /// Returns true if every restore succeeded.
    fn undo<S: Store<T>>(
        store: &S,
        priors: &HashMap<String, Option<T>>,
        applied: &[TxnOp],
    ) -> bool {
        let mut complete = true;
        for op in applied.iter().rev() {
            let key = op.key();
            let restored = match priors.get(key) {
                Some(Some(prior)) => store.set(key, prior.clone()).is_ok(),
                Some(None) => store.delete(key).is_ok(),
                None => false,
            };
            if !restored {
                complete = false;
            }
        }
        complete
    }
}

impl<T: Clone> Default for Transaction<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SharedStore;

    /// Store wrapper that fails every mutation of one key
    struct FailingStore {
        inner: SharedStore<i32>,
        poison: String,
    }

    impl Store<i32> for FailingStore {
        fn get(&self, key: &str) -> Result<i32> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: i32) -> Result<()> {
            if key == self.poison {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            self.inner.set(key, value)
        }

        fn delete(&self, key: &str) -> Result<bool> {
            if key == self.poison {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            self.inner.delete(key)
        }
    }

    #[test]
    fn test_commit_applies_sets_then_deletes() {
        let store = SharedStore::new();
        store.set("old", 0).unwrap();

        let mut txn = Transaction::new();
        txn.set("a", 1).unwrap();
        txn.set("b", 2).unwrap();
        txn.delete("old").unwrap();
        txn.commit(&store).unwrap();

        assert_eq!(store.get("a").unwrap(), 1);
        assert_eq!(store.get("b").unwrap(), 2);
        assert!(store.get("old").is_err());
        assert!(txn.is_committed());
    }

    #[test]
    fn test_last_operation_per_key_wins() {
        let store = SharedStore::new();
        store.set("k", 0).unwrap();

        let mut txn = Transaction::new();
        txn.set("k", 1).unwrap();
        txn.delete("k").unwrap();
        txn.set("k", 2).unwrap();
        assert_eq!(txn.len(), 1);
        txn.commit(&store).unwrap();

        // Only the final set replayed; the earlier delete was evicted
        assert_eq!(store.get("k").unwrap(), 2);
    }

    #[test]
    fn test_delete_evicts_pending_set() {
        let store = SharedStore::new();
        store.set("k", 0).unwrap();

        let mut txn = Transaction::new();
        txn.set("k", 1).unwrap();
        txn.delete("k").unwrap();
        txn.commit(&store).unwrap();

        assert!(store.get("k").is_err());
    }

    #[test]
    fn test_commit_is_idempotent() {
        let store = SharedStore::new();

        let mut txn = Transaction::new();
        txn.set("k", 1).unwrap();
        txn.commit(&store).unwrap();

        store.set("k", 99).unwrap();
        // Second commit must not replay anything
        txn.commit(&store).unwrap();
        assert_eq!(store.get("k").unwrap(), 99);
    }

    #[test]
    fn test_staging_after_commit_fails() {
        let store: SharedStore<i32> = SharedStore::new();

        let mut txn = Transaction::new();
        txn.set("k", 1).unwrap();
        txn.commit(&store).unwrap();

        assert!(matches!(
            txn.set("k2", 2),
            Err(StoreError::AlreadyCommitted)
        ));
        assert!(matches!(
            txn.delete("k"),
            Err(StoreError::AlreadyCommitted)
        ));
    }

    #[test]
    fn test_rollback_clears_buffer() {
        let store: SharedStore<i32> = SharedStore::new();

        let mut txn = Transaction::new();
        txn.set("a", 1).unwrap();
        txn.delete("b").unwrap();
        txn.rollback();

        assert!(txn.is_empty());
        txn.commit(&store).unwrap();
        assert!(store.get("a").is_err());
    }

    #[test]
    fn test_rollback_after_commit_is_noop() {
        let store = SharedStore::new();

        let mut txn = Transaction::new();
        txn.set("k", 1).unwrap();
        txn.commit(&store).unwrap();
        txn.rollback();

        assert!(txn.is_committed());
        assert_eq!(store.get("k").unwrap(), 1);
    }

    #[test]
    fn test_failed_commit_rolls_back() {
        let store = FailingStore {
            inner: SharedStore::new(),
            poison: "bad".to_string(),
        };
        store.inner.set("a", 0).unwrap();
        store.inner.set("doomed", 7).unwrap();

        let mut txn = Transaction::new();
        txn.set("a", 1).unwrap();
        txn.set("bad", 2).unwrap();
        txn.delete("doomed").unwrap();

        let err = txn.commit(&store).unwrap_err();
        match err {
            StoreError::PartialCommit {
                applied,
                rolled_back,
                ..
            } => {
                assert!(rolled_back);
                // Only non-poisoned sets could have applied before failure
                assert!(!applied.contains(&TxnOp::Set("bad".to_string())));
            }
            other => panic!("expected PartialCommit, got {other}"),
        }

        // Every touched key is back to its prior state
        assert_eq!(store.get("a").unwrap(), 0);
        assert_eq!(store.get("doomed").unwrap(), 7);
        assert!(store.get("bad").is_err());
        assert!(!txn.is_committed());
    }

    #[test]
    fn test_commit_through_any_store_layer() {
        use crate::index::IndexedStore;

        let store = IndexedStore::new(SharedStore::new());
        let mut txn = Transaction::new();
        txn.set("u1", 30).unwrap();
        txn.commit(&store).unwrap();

        assert_eq!(store.get("u1").unwrap(), 30);
    }
}
