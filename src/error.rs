//! Error taxonomy for the store layers
//!
//! Every layer surfaces failures to the caller; nothing is swallowed except
//! the documented no-ops (delete of a missing key, rollback or commit after
//! commit).

use crate::txn::TxnOp;
use thiserror::Error;

/// Errors returned by the store layers and the transaction buffer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The key is absent, or present but past its expiration instant.
    #[error("key '{0}' not found")]
    NotFound(String),

    /// A write was given an argument the layer cannot accept.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Reserved for future index-consistency checks.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Staging into a transaction buffer that has already committed.
    #[error("transaction already committed")]
    AlreadyCommitted,

    /// Disk read or write failure during persistence.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted snapshot could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// A transaction commit failed partway through its replay.
    ///
    /// `applied` lists the operations that reached the target store before
    /// the failure; `rolled_back` reports whether they were all undone.
    #[error(
        "commit failed after {0} applied operation(s), rolled back: {1}: {2}",
        .applied.len(),
        .rolled_back,
        .source
    )]
    PartialCommit {
        applied: Vec<TxnOp>,
        rolled_back: bool,
        #[source]
        source: Box<StoreError>,
    },
}

/// A specialized Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Convenience constructor for a missing-key error.
    pub(crate) fn not_found(key: &str) -> Self {
        StoreError::NotFound(key.to_string())
    }
}
