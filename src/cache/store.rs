//! Cache Store Module
//!
//! Bounded, TTL-expiring key/value store shared by every read path.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use super::entry::CacheEntry;
use super::order::InsertionOrder;
use super::stats::CacheStats;

// == Store State ==
/// Everything guarded by the store's single lock.
#[derive(Debug)]
struct StoreState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    order: InsertionOrder,
    stats: CacheStats,
}

impl<V> StoreState<V> {
    fn drop_key(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
            true
        } else {
            false
        }
    }

    fn sync_len(&mut self) {
        let len = self.entries.len();
        self.stats.set_total_entries(len);
    }
}

// == Cache Store ==
/// Thread-safe cache with insertion-order eviction and TTL expiry.
///
/// All methods take `&self`; one mutex serializes every access so that
/// neither readers nor the janitor ever see a half-written entry. Share it
/// between components with `Arc<CacheStore<V>>`.
#[derive(Debug)]
pub struct CacheStore<V> {
    state: Mutex<StoreState<V>>,
    /// Maximum number of entries allowed (at least 1)
    max_entries: usize,
    /// Age after which an entry is no longer served
    ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and TTL.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries; values below 1 are raised to 1
    /// * `ttl` - How long an entry stays visible after insertion
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            state: Mutex::new(StoreState {
                entries: HashMap::new(),
                order: InsertionOrder::new(),
                stats: CacheStats::new(),
            }),
            max_entries: max_entries.max(1),
            ttl,
        }
    }

    // == Put ==
    /// Inserts or replaces the value for `key` with a fresh timestamp.
    ///
    /// A replaced key keeps its place in the insertion order. If a new key
    /// pushes the store past capacity, the oldest inserted entries are
    /// evicted; the key just written is never the one evicted.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let mut state = self.state.lock();

        let replaced = state.entries.insert(key.clone(), CacheEntry::new(value));
        if replaced.is_none() {
            state.order.record(&key);
        }

        while state.entries.len() > self.max_entries {
            match state.order.evict_oldest() {
                Some(oldest) if oldest == key => {
                    // Only possible if the order queue drifted; keep the new entry.
                    state.order.record(&oldest);
                    break;
                }
                Some(oldest) => {
                    state.entries.remove(&oldest);
                    state.stats.record_eviction();
                    debug!(key = %oldest, "Evicted oldest cache entry");
                }
                None => break,
            }
        }

        state.sync_len();
    }

    // == Get ==
    /// Returns a clone of the value if present and fresh.
    ///
    /// An expired entry is dropped on the spot and reported as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut state = self.state.lock();

        let expired = match state.entries.get(key) {
            Some(entry) if !entry.is_expired(self.ttl) => {
                let value = entry.value.clone();
                state.stats.record_hit();
                return Some(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            state.drop_key(key);
            state.stats.record_expired(1);
            state.sync_len();
        }
        state.stats.record_miss();
        None
    }

    // == Contains Key ==
    /// Whether a fresh entry exists for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        let state = self.state.lock();
        state
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(self.ttl))
    }

    // == Remove ==
    /// Removes `key`; no-op when absent.
    pub fn remove(&self, key: &str) {
        let mut state = self.state.lock();
        if state.drop_key(key) {
            state.sync_len();
        }
    }

    // == Remove Prefixed ==
    /// Removes every key starting with `prefix`, returning how many went.
    pub fn remove_prefixed(&self, prefix: &str) -> usize {
        let mut state = self.state.lock();
        let before = state.entries.len();

        state.entries.retain(|key, _| !key.starts_with(prefix));
        state.order.retain(|key| !key.starts_with(prefix));

        let removed = before - state.entries.len();
        state.sync_len();
        removed
    }

    // == Clear ==
    /// Removes all entries.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.order.clear();
        state.sync_len();
    }

    // == Purge Expired ==
    /// Removes all expired entries, returning the number removed.
    pub fn purge_expired(&self) -> usize {
        let mut state = self.state.lock();
        let ttl = self.ttl;

        let expired_keys: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            state.drop_key(key);
        }

        let count = expired_keys.len();
        state.stats.record_expired(count);
        state.sync_len();
        count
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }

    /// Number of physically stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
