//! Nations and their links to countries.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::CacheStore;
use crate::error::{CatalogError, Result};
use crate::invalidation::{keys, ChangeKind, InvalidationOrchestrator, Written};
use crate::models::{
    CachedValue, CountryDto, CountryGraph, EntityId, Nation, NationGraph, NationRequest,
    NationUpdate,
};
use crate::repository::Repository;

use super::cached;

fn country_not_found(id: EntityId) -> CatalogError {
    CatalogError::NotFound(format!("Country not found with ID: {}", id))
}

fn nation_not_found(id: EntityId) -> CatalogError {
    CatalogError::NotFound(format!("Nation not found with ID: {}", id))
}

fn already_linked(name: &str, country: &str) -> CatalogError {
    CatalogError::Conflict(format!(
        "Nation with name {} already exists in the country {}",
        name, country
    ))
}

#[derive(Debug, Clone)]
pub struct NationService {
    repository: Arc<Repository>,
    cache: Arc<CacheStore<CachedValue>>,
    invalidation: InvalidationOrchestrator,
}

impl NationService {
    pub fn new(
        repository: Arc<Repository>,
        cache: Arc<CacheStore<CachedValue>>,
        invalidation: InvalidationOrchestrator,
    ) -> Self {
        Self {
            repository,
            cache,
            invalidation,
        }
    }

    fn require_country(&self, country_id: EntityId) -> Result<CountryGraph> {
        self.repository
            .find_country(country_id)
            .ok_or_else(|| country_not_found(country_id))
    }

    fn is_linked(&self, graph: &CountryGraph, name: &str) -> bool {
        self.repository
            .find_nation_by_name(name)
            .is_some_and(|nation| graph.nations.ids().is_some_and(|ids| ids.contains(&nation.id)))
    }

    // == Reads ==

    pub fn get_nations(&self) -> Vec<Nation> {
        if let Some(nations) = cached(&self.cache, keys::ALL_NATIONS, CachedValue::into_nations) {
            return nations;
        }

        let nations = self.repository.list_nations();
        self.cache
            .put(keys::ALL_NATIONS, CachedValue::Nations(nations.clone()));
        nations
    }

    pub fn get_nations_by_country(&self, country_id: EntityId) -> Result<Vec<Nation>> {
        let key = keys::nations_of_country(country_id);
        if let Some(nations) = cached(&self.cache, &key, CachedValue::into_nations) {
            return Ok(nations);
        }

        if !self.repository.country_exists(country_id) {
            return Err(country_not_found(country_id));
        }
        let nations = self.repository.nations_of_country(country_id);
        self.cache.put(key, CachedValue::Nations(nations.clone()));
        Ok(nations)
    }

    pub fn get_countries_by_nation(&self, nation_id: EntityId) -> Result<Vec<CountryDto>> {
        let key = keys::countries_of_nation(nation_id);
        if let Some(countries) = cached(&self.cache, &key, CachedValue::into_countries) {
            return Ok(countries);
        }

        if self.repository.find_nation(nation_id).is_none() {
            return Err(nation_not_found(nation_id));
        }
        let countries: Vec<CountryDto> = self
            .repository
            .countries_of_nation(nation_id)
            .iter()
            .filter_map(CountryDto::from_graph)
            .collect();
        self.cache
            .put(key, CachedValue::Countries(countries.clone()));
        Ok(countries)
    }

    // == Writes ==

    /// Links a nation to a country, creating the nation if no nation with
    /// that name exists yet.
    pub fn add_nation_to_country(
        &self,
        country_id: EntityId,
        request: NationRequest,
    ) -> Result<Nation> {
        if let Some(msg) = request.validate() {
            return Err(CatalogError::InvalidRequest(msg));
        }
        let graph = self.require_country(country_id)?;
        if self.is_linked(&graph, &request.name) {
            return Err(already_linked(&request.name, &graph.country.name));
        }

        let nation = match self.repository.find_nation_by_name(&request.name) {
            Some(existing) => existing,
            None => self.repository.insert_nation(Nation {
                id: 0,
                name: request.name.trim().to_string(),
                language: request.language,
                religion: request.religion,
            }),
        };

        if !self.repository.link(country_id, nation.id) {
            return Err(already_linked(&nation.name, &graph.country.name));
        }
        self.invalidation.invalidate(
            &Written::Link {
                country_id,
                nation_id: nation.id,
            },
            ChangeKind::Add,
        );
        info!(
            "Linked nation {} (ID: {}) to country ID: {}",
            nation.name, nation.id, country_id
        );
        Ok(nation)
    }

    /// Links several nations; nothing is linked unless every request is
    /// valid and new to the country.
    pub fn add_nations_to_country(
        &self,
        country_id: EntityId,
        requests: Vec<NationRequest>,
    ) -> Result<Vec<Nation>> {
        let graph = self.require_country(country_id)?;

        let mut names = HashSet::new();
        for request in &requests {
            if let Some(msg) = request.validate() {
                return Err(CatalogError::InvalidRequest(msg));
            }
            if !names.insert(request.name.trim().to_lowercase())
                || self.is_linked(&graph, &request.name)
            {
                return Err(already_linked(&request.name, &graph.country.name));
            }
        }

        requests
            .into_iter()
            .map(|request| self.add_nation_to_country(country_id, request))
            .collect()
    }

    pub fn update_nation(&self, id: EntityId, update: NationUpdate) -> Result<Nation> {
        if let Some(msg) = update.validate() {
            return Err(CatalogError::InvalidRequest(msg));
        }
        let before = self
            .repository
            .find_nation(id)
            .ok_or_else(|| nation_not_found(id))?;
        let mut nation = before.nation.clone();

        if let Some(name) = update.name.filter(|n| !n.is_empty()) {
            let name = name.trim().to_string();
            let taken = self
                .repository
                .find_nation_by_name(&name)
                .is_some_and(|other| other.id != id);
            if taken {
                warn!("Nation name conflict: {}", name);
                return Err(CatalogError::Conflict(
                    "Nation with this name exists".to_string(),
                ));
            }
            nation.name = name;
        }
        if let Some(language) = update.language.filter(|l| !l.is_empty()) {
            nation.language = Some(language);
        }
        if let Some(religion) = update.religion.filter(|r| !r.is_empty()) {
            nation.religion = Some(religion);
        }

        if !self.repository.save_nation(nation.clone()) {
            return Err(nation_not_found(id));
        }
        let countries = self
            .repository
            .find_nation(id)
            .map_or_else(|| before.countries.clone(), |after| {
                after.countries.union(&before.countries)
            });

        self.invalidation.invalidate(
            &Written::Nation(&NationGraph {
                nation: nation.clone(),
                countries,
            }),
            ChangeKind::Update,
        );
        info!("Updated nation ID: {}", id);
        Ok(nation)
    }

    pub fn delete_nation(&self, id: EntityId) -> Result<()> {
        let before = self
            .repository
            .delete_nation(id)
            .ok_or_else(|| nation_not_found(id))?;

        self.invalidation
            .invalidate(&Written::Nation(&before), ChangeKind::Delete);
        info!("Deleted nation ID: {}", id);
        Ok(())
    }

    /// Unlinks a nation from a country. Both must exist; a missing link is
    /// not an error.
    pub fn remove_nation_from_country(
        &self,
        country_id: EntityId,
        nation_id: EntityId,
    ) -> Result<()> {
        self.require_country(country_id)?;
        if self.repository.find_nation(nation_id).is_none() {
            return Err(nation_not_found(nation_id));
        }

        if !self.repository.unlink(country_id, nation_id) {
            warn!(
                "Nation {} was not linked to country {}",
                nation_id, country_id
            );
        }
        self.invalidation.invalidate(
            &Written::Link {
                country_id,
                nation_id,
            },
            ChangeKind::Delete,
        );
        Ok(())
    }
}
