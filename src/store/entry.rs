//! Entry structure for stored records

use std::time::{Duration, Instant};

/// A single stored record: the value plus its optional expiration instant.
///
/// An entry whose expiration instant is in the past is logically absent and
/// must never be returned by a read.
#[derive(Debug, Clone)]
pub struct Entry<T> {
    /// The stored value
    pub value: T,

    /// Optional expiration time (absolute); `None` means never expires
    pub expires_at: Option<Instant>,
}

impl<T> Entry<T> {
    /// Create a new entry without expiration
    pub fn new(value: T) -> Self {
        Entry {
            value,
            expires_at: None,
        }
    }

    /// Create a new entry that expires `ttl` from now
    pub fn with_ttl(value: T, ttl: Duration) -> Self {
        Entry {
            value,
            expires_at: Some(Instant::now() + ttl),
        }
    }

    /// Check if the entry has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Instant::now() >= expires_at,
            None => false,
        }
    }

    /// Remaining time before expiration
    ///
    /// Returns `None` for an entry with no expiration, and a zero duration
    /// for an entry that has already expired.
    pub fn remaining_ttl(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires_at| expires_at.saturating_duration_since(Instant::now()))
    }
}
