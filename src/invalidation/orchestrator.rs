//! Invalidation orchestrator
//!
//! Called by every write path once the repository has accepted the change.
//! Turns the written entity into a key set and drops those keys from the
//! shared cache.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::invalidation::keys::{self, KeySet};
use crate::models::{CachedValue, City, CountryDto, CountryGraph, EntityId, Linked, NationGraph};

/// What the write did to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Add,
    Update,
    Delete,
}

/// The entity a write touched, with its relationships as the caller knows them.
///
/// For updates and link changes callers pass the union of the pre- and
/// post-mutation relationship sets (see [`Linked::union`]); for deletes,
/// the pre-mutation set.
#[derive(Debug, Clone, Copy)]
pub enum Written<'a> {
    Country(&'a CountryGraph),
    City {
        city: &'a City,
        /// Nations linked to the city's owning country
        owner_nations: &'a Linked,
    },
    Nation(&'a NationGraph),
    Link {
        country_id: EntityId,
        nation_id: EntityId,
    },
    /// Several cities of one country removed at once
    CitiesOfCountry {
        country_id: EntityId,
        nations: &'a Linked,
        cities: &'a Linked,
    },
}

// == Invalidation Orchestrator ==
#[derive(Debug, Clone)]
pub struct InvalidationOrchestrator {
    cache: Arc<CacheStore<CachedValue>>,
    /// Serializes invalidations with the repository reads of write-throughs
    write_lock: Arc<Mutex<()>>,
}

impl InvalidationOrchestrator {
    pub fn new(cache: Arc<CacheStore<CachedValue>>) -> Self {
        Self {
            cache,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    // == Affected Keys ==
    /// Every key whose view could have observed the pre-write state.
    pub fn affected_keys(written: &Written<'_>, kind: ChangeKind) -> KeySet {
        match *written {
            Written::Country(graph) => {
                let mut set = keys::country_keys(graph.country.id, &graph.nations);
                if kind == ChangeKind::Delete {
                    // Former cities lose their owner.
                    set.extend(keys::city_entity_keys(&graph.cities));
                }
                set
            }
            Written::City {
                city,
                owner_nations,
            } => keys::city_keys(city.id, city.country_id.map(|c| (c, owner_nations))),
            Written::Nation(graph) => keys::nation_keys(graph.nation.id, &graph.countries),
            Written::Link {
                country_id,
                nation_id,
            } => keys::link_keys(country_id, nation_id),
            Written::CitiesOfCountry {
                country_id,
                nations,
                cities,
            } => {
                let mut set = keys::city_listing_keys(country_id, nations);
                set.extend(keys::city_entity_keys(cities));
                set
            }
        }
    }

    // == Invalidate ==
    /// Drops every affected key.
    ///
    /// Never fails: unresolved relationships widen the key set instead.
    pub fn invalidate(&self, written: &Written<'_>, kind: ChangeKind) {
        let _guard = self.write_lock.lock();
        let removed = self.apply(&Self::affected_keys(written, kind));
        debug!(?kind, removed, "Invalidated cache keys");
    }

    // == Invalidate And Refresh ==
    /// Drops every affected key, then re-populates `country_<id>` with the
    /// country as `load` reads it from the repository.
    ///
    /// `written` may carry merged pre/post relationships for key
    /// computation; the cached projection only ever comes from `load`.
    /// `load` runs under the same lock as every other invalidation, so a
    /// concurrent write that commits after the load is applied after the
    /// put and removes it.
    pub fn invalidate_and_refresh<F>(&self, written: &Written<'_>, kind: ChangeKind, load: F)
    where
        F: FnOnce() -> Option<CountryGraph>,
    {
        let _guard = self.write_lock.lock();
        let removed = self.apply(&Self::affected_keys(written, kind));

        let fresh = load();
        match fresh.as_ref().and_then(CountryDto::from_graph) {
            Some(dto) => {
                self.cache
                    .put(keys::country(dto.id), CachedValue::Country(dto));
            }
            None => debug!("Skipping write-through, country missing or relationships not loaded"),
        }

        debug!(?kind, removed, "Invalidated cache keys");
    }

    // == Invalidate All ==
    /// Empties the cache; used by bulk deletes.
    pub fn invalidate_all(&self) {
        let _guard = self.write_lock.lock();
        self.cache.clear();
        info!("Cleared all cache entries");
    }

    fn apply(&self, set: &KeySet) -> usize {
        let mut removed = 0;
        for key in set.exact() {
            if self.cache.contains_key(key) {
                removed += 1;
            }
            self.cache.remove(key);
        }
        for prefix in set.families() {
            removed += self.cache.remove_prefixed(prefix);
        }
        removed
    }
}
