//! Domain services
//!
//! Read paths go through the shared cache; write paths go to the repository
//! and then hand the written entity to the invalidation orchestrator.

mod cities;
mod countries;
mod logs;
mod nations;
mod visits;

pub use cities::CityService;
pub use countries::CountryService;
pub use logs::{LogExporter, LogTask, TaskStatus};
pub use nations::NationService;
pub use visits::VisitCounter;

use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::models::CachedValue;

/// Typed cache lookup.
///
/// A value of the wrong variant under `key` is removed and reported as a
/// miss, so the caller falls back to the repository.
pub(crate) fn cached<T>(
    cache: &CacheStore<CachedValue>,
    key: &str,
    extract: fn(CachedValue) -> Option<T>,
) -> Option<T> {
    let value = cache.get(key)?;
    let kind = value.kind();

    match extract(value) {
        Some(found) => {
            debug!(key, "Cache hit");
            Some(found)
        }
        None => {
            warn!(key, kind, "Discarding cached value of unexpected shape");
            cache.remove(key);
            None
        }
    }
}
