//! Cache Module
//!
//! In-memory read cache with TTL expiration and insertion-order eviction.

mod entry;
mod order;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

use std::time::Duration;

// Re-export public types
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Default maximum number of cached views
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Default entry lifetime (10 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_millis(600_000);
