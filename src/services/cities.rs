//! City reads and writes.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::CacheStore;
use crate::error::{CatalogError, Result};
use crate::invalidation::{keys, ChangeKind, InvalidationOrchestrator, Written};
use crate::models::{
    CachedValue, City, CityDto, CityRequest, CityUpdate, CountryGraph, EntityId, Linked,
};
use crate::repository::Repository;

use super::cached;

fn country_not_found(id: EntityId) -> CatalogError {
    CatalogError::NotFound(format!("Country not found with ID: {}", id))
}

fn city_not_found(id: EntityId) -> CatalogError {
    CatalogError::NotFound(format!("City not found with ID: {}", id))
}

#[derive(Debug, Clone)]
pub struct CityService {
    repository: Arc<Repository>,
    cache: Arc<CacheStore<CachedValue>>,
    invalidation: InvalidationOrchestrator,
}

impl CityService {
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

    fn owning_country(&self, city: &City) -> Option<CountryGraph> {
        city.country_id
            .and_then(|country_id| self.repository.find_country(country_id))
    }

    fn project(&self, city: &City) -> CityDto {
        let owner = self.owning_country(city);
        CityDto::new(city, owner.as_ref().map(|graph| &graph.country))
    }

    fn require_country(&self, country_id: EntityId) -> Result<CountryGraph> {
        self.repository
            .find_country(country_id)
            .ok_or_else(|| country_not_found(country_id))
    }

    // == Reads ==

    pub fn get_cities(&self) -> Vec<CityDto> {
        if let Some(cities) = cached(&self.cache, keys::ALL_CITIES, CachedValue::into_cities) {
            info!("Retrieved {} cities from cache", cities.len());
            return cities;
        }

        let cities: Vec<CityDto> = self
            .repository
            .list_cities()
            .iter()
            .map(|city| self.project(city))
            .collect();
        self.cache
            .put(keys::ALL_CITIES, CachedValue::Cities(cities.clone()));
        info!("Cities loaded from repository and cached");
        cities
    }

    pub fn get_city(&self, id: EntityId) -> Result<CityDto> {
        let key = keys::city(id);
        if let Some(city) = cached(&self.cache, &key, CachedValue::into_city) {
            return Ok(self.project(&city));
        }

        let city = self.repository.find_city(id).ok_or_else(|| city_not_found(id))?;
        self.cache.put(key, CachedValue::City(city.clone()));
        Ok(self.project(&city))
    }

    pub fn get_cities_by_country(&self, country_id: EntityId) -> Result<Vec<CityDto>> {
        let key = keys::cities_of_country(country_id);
        if let Some(cities) = cached(&self.cache, &key, CachedValue::into_cities) {
            info!("Getting cities of country {} from cache", country_id);
            return Ok(cities);
        }

        let graph = self.require_country(country_id)?;
        let cities: Vec<CityDto> = self
            .repository
            .cities_of_country(country_id)
            .iter()
            .map(|city| CityDto::new(city, Some(&graph.country)))
            .collect();
        self.cache.put(key, CachedValue::Cities(cities.clone()));
        info!(
            "Cities of country {} loaded from repository and cached",
            country_id
        );
        Ok(cities)
    }

    pub fn city_ids_of_country(&self, country_id: EntityId) -> Result<BTreeSet<EntityId>> {
        let key = keys::city_ids_of_country(country_id);
        if let Some(ids) = cached(&self.cache, &key, CachedValue::into_city_ids) {
            return Ok(ids);
        }

        let graph = self.require_country(country_id)?;
        let ids = graph.cities.ids().cloned().unwrap_or_default();
        self.cache.put(key, CachedValue::CityIds(ids.clone()));
        Ok(ids)
    }

    // == Writes ==

    /// Adds cities to a country. Names must be unique within the country,
    /// ignoring case; nothing is stored if any request is rejected.
    pub fn add_cities(
        &self,
        country_id: EntityId,
        requests: Vec<CityRequest>,
    ) -> Result<Vec<CityDto>> {
        let graph = self.require_country(country_id)?;

        let mut names: HashSet<String> = self
            .repository
            .cities_of_country(country_id)
            .iter()
            .map(|city| city.name.to_lowercase())
            .collect();
        for request in &requests {
            if let Some(msg) = request.validate() {
                return Err(CatalogError::InvalidRequest(msg));
            }
            if !names.insert(request.name.trim().to_lowercase()) {
                warn!("City already exists: {}", request.name);
                return Err(CatalogError::Conflict(format!(
                    "City with name {} already exists",
                    request.name
                )));
            }
        }

        let mut added = Vec::with_capacity(requests.len());
        for request in requests {
            let city = self.repository.insert_city(City {
                id: 0,
                name: request.name.trim().to_string(),
                population: request.population,
                area_square_km: request.area_square_km,
                country_id: Some(country_id),
            });
            self.invalidation.invalidate(
                &Written::City {
                    city: &city,
                    owner_nations: &graph.nations,
                },
                ChangeKind::Add,
            );
            info!(
                "Added city with ID: {} to country with ID: {}",
                city.id, country_id
            );
            added.push(CityDto::new(&city, Some(&graph.country)));
        }
        Ok(added)
    }

    pub fn update_city(&self, id: EntityId, update: CityUpdate) -> Result<CityDto> {
        if let Some(msg) = update.validate() {
            return Err(CatalogError::InvalidRequest(msg));
        }
        let mut city = self.repository.find_city(id).ok_or_else(|| city_not_found(id))?;
        let owner = self.owning_country(&city);

        if let Some(name) = update.name.filter(|n| !n.is_empty()) {
            let name = name.trim().to_string();
            if !name.eq_ignore_ascii_case(&city.name) {
                let taken = city.country_id.is_some_and(|country_id| {
                    self.repository
                        .cities_of_country(country_id)
                        .iter()
                        .any(|other| other.id != id && other.name.eq_ignore_ascii_case(&name))
                });
                if taken {
                    return Err(CatalogError::Conflict(format!(
                        "City name {} already exists in this country",
                        name
                    )));
                }
            }
            city.name = name;
        }
        if let Some(population) = update.population {
            city.population = Some(population);
        }
        if let Some(area) = update.area_square_km {
            city.area_square_km = Some(area);
        }

        if !self.repository.save_city(city.clone()) {
            return Err(city_not_found(id));
        }

        let owner_nations = owner
            .as_ref()
            .map_or_else(Linked::empty, |graph| graph.nations.clone());
        self.invalidation.invalidate(
            &Written::City {
                city: &city,
                owner_nations: &owner_nations,
            },
            ChangeKind::Update,
        );
        info!("Updated city with ID: {}", id);

        Ok(CityDto::new(&city, owner.as_ref().map(|graph| &graph.country)))
    }

    pub fn delete_city(&self, id: EntityId) -> Result<()> {
        let owner_nations = self
            .repository
            .find_city(id)
            .and_then(|city| self.owning_country(&city))
            .map_or_else(Linked::empty, |graph| graph.nations);
        let city = self
            .repository
            .delete_city(id)
            .ok_or_else(|| city_not_found(id))?;

        self.invalidation.invalidate(
            &Written::City {
                city: &city,
                owner_nations: &owner_nations,
            },
            ChangeKind::Delete,
        );
        info!("Deleted city with ID: {}", id);
        Ok(())
    }

    /// Deletes every city of a country; returns how many were removed.
    pub fn delete_cities_of_country(&self, country_id: EntityId) -> Result<usize> {
        let graph = self.require_country(country_id)?;
        let removed = self.repository.delete_cities_of_country(country_id);
        info!(
            "Deleting {} cities from country with ID: {}",
            removed.len(),
            country_id
        );

        let cities: Linked = removed.iter().map(|city| city.id).collect();
        self.invalidation.invalidate(
            &Written::CitiesOfCountry {
                country_id,
                nations: &graph.nations,
                cities: &cities.union(&graph.cities),
            },
            ChangeKind::Delete,
        );
        Ok(removed.len())
    }

    pub fn delete_city_of_country(&self, country_id: EntityId, city_id: EntityId) -> Result<()> {
        let graph = self.require_country(country_id)?;
        let city = self
            .repository
            .find_city(city_id)
            .ok_or_else(|| city_not_found(city_id))?;
        if city.country_id != Some(country_id) {
            return Err(CatalogError::NotFound(
                "City does not belong to the specified country".to_string(),
            ));
        }

        self.repository.delete_city(city_id);
        self.invalidation.invalidate(
            &Written::City {
                city: &city,
                owner_nations: &graph.nations,
            },
            ChangeKind::Delete,
        );
        info!(
            "City with ID: {} deleted from country with ID: {}",
            city_id, country_id
        );
        Ok(())
    }
}
