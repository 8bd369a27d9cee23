//! Cache Entry Module
//!
//! Defines the timestamped envelope the store keeps for every value.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A stored value together with the instant it was inserted.
///
/// Entries are never mutated after construction: replacing a value builds a
/// new entry with a new `stored_at`.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insertion instant
    pub stored_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Wraps `value` with the current instant.
    pub fn new(value: V) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived `ttl`.
    ///
    /// Boundary condition: the entry is still fresh when its age equals the
    /// TTL exactly and expires strictly after it.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() > ttl
    }
}
