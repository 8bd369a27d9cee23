//! Shared application state.

use std::sync::Arc;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::invalidation::InvalidationOrchestrator;
use crate::models::CachedValue;
use crate::repository::Repository;
use crate::services::{CityService, CountryService, LogExporter, NationService, VisitCounter};

/// State cloned into every handler.
///
/// All services share one repository, one cache and one orchestrator.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheStore<CachedValue>>,
    pub countries: CountryService,
    pub cities: CityService,
    pub nations: NationService,
    pub visits: Arc<VisitCounter>,
    pub logs: Arc<LogExporter>,
}

impl AppState {
    /// Log exports use the default paths; see [`AppState::with_log_exporter`].
    pub fn new(cache: Arc<CacheStore<CachedValue>>, repository: Arc<Repository>) -> Self {
        let invalidation = InvalidationOrchestrator::new(cache.clone());

        Self {
            countries: CountryService::new(
                repository.clone(),
                cache.clone(),
                invalidation.clone(),
            ),
            cities: CityService::new(repository.clone(), cache.clone(), invalidation.clone()),
            nations: NationService::new(repository, cache.clone(), invalidation),
            visits: Arc::new(VisitCounter::new()),
            logs: Arc::new(LogExporter::from_config(&Config::default())),
            cache,
        }
    }

    pub fn with_log_exporter(mut self, logs: LogExporter) -> Self {
        self.logs = Arc::new(logs);
        self
    }

    /// Builds an empty catalog with a cache sized from the Config.
    pub fn from_config(config: &Config) -> Self {
        let cache = Arc::new(CacheStore::new(
            config.cache_max_entries,
            config.cache_ttl(),
        ));
        Self::new(cache, Arc::new(Repository::new()))
            .with_log_exporter(LogExporter::from_config(config))
    }
}
