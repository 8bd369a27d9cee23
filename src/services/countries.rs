//! Country reads and writes.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::error::{CatalogError, Result};
use crate::invalidation::{keys, ChangeKind, InvalidationOrchestrator, Written};
use crate::models::{
    CachedValue, Country, CountryDto, CountryGraph, CountryRequest, CountryUpdate, EntityId,
    Linked,
};
use crate::repository::Repository;

use super::cached;

fn country_not_found(id: EntityId) -> CatalogError {
    CatalogError::NotFound(format!("Country not found with ID: {}", id))
}

fn project(graphs: Vec<CountryGraph>) -> Vec<CountryDto> {
    graphs.iter().filter_map(CountryDto::from_graph).collect()
}

#[derive(Debug, Clone)]
pub struct CountryService {
    repository: Arc<Repository>,
    cache: Arc<CacheStore<CachedValue>>,
    invalidation: InvalidationOrchestrator,
}

impl CountryService {
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

    pub fn get_countries(&self) -> Vec<CountryDto> {
        if let Some(countries) = cached(&self.cache, keys::ALL_COUNTRIES, CachedValue::into_countries)
        {
            info!("Retrieved {} countries from cache", countries.len());
            return countries;
        }

        let countries = project(self.repository.list_countries());
        self.cache
            .put(keys::ALL_COUNTRIES, CachedValue::Countries(countries.clone()));
        info!("Fetched {} countries from repository and cached", countries.len());
        countries
    }

    pub fn get_country(&self, id: EntityId) -> Result<CountryDto> {
        let key = keys::country(id);
        if let Some(country) = cached(&self.cache, &key, CachedValue::into_country) {
            return Ok(country);
        }

        let dto = self
            .repository
            .find_country(id)
            .as_ref()
            .and_then(CountryDto::from_graph)
            .ok_or_else(|| country_not_found(id))?;

        self.cache.put(key, CachedValue::Country(dto.clone()));
        debug!(country_id = id, "Country loaded from repository and cached");
        Ok(dto)
    }

    pub fn add_country(&self, request: CountryRequest) -> Result<CountryDto> {
        if let Some(msg) = request.validate() {
            return Err(CatalogError::InvalidRequest(msg));
        }
        if self.repository.find_country_by_name(&request.name).is_some() {
            warn!("Country already exists: {}", request.name);
            return Err(CatalogError::Conflict(format!(
                "Country '{}' already exists",
                request.name
            )));
        }

        let country = self.repository.insert_country(Country {
            id: 0,
            name: request.name.trim().to_string(),
            capital: request.capital,
            population: request.population,
            area_square_km: request.area_square_km,
            gdp: request.gdp,
        });
        let graph = CountryGraph {
            country,
            cities: Linked::empty(),
            nations: Linked::empty(),
        };

        self.invalidation
            .invalidate(&Written::Country(&graph), ChangeKind::Add);
        info!(
            "Created country: {} (ID: {})",
            graph.country.name, graph.country.id
        );

        CountryDto::from_graph(&graph)
            .ok_or_else(|| CatalogError::Internal("Country projection failed".to_string()))
    }

    /// Adds several countries; nothing is stored unless every one is valid.
    pub fn add_countries(&self, requests: Vec<CountryRequest>) -> Result<Vec<CountryDto>> {
        let mut names = HashSet::new();
        for request in &requests {
            if let Some(msg) = request.validate() {
                return Err(CatalogError::InvalidRequest(msg));
            }
            if !names.insert(request.name.trim().to_lowercase()) {
                return Err(CatalogError::Conflict(format!(
                    "Country '{}' appears more than once",
                    request.name
                )));
            }
            if self.repository.find_country_by_name(&request.name).is_some() {
                return Err(CatalogError::Conflict(format!(
                    "Country '{}' already exists",
                    request.name
                )));
            }
        }

        let added = requests
            .into_iter()
            .map(|request| self.add_country(request))
            .collect::<Result<Vec<_>>>()?;
        info!("Added {} countries", added.len());
        Ok(added)
    }

    pub fn update_country(&self, id: EntityId, update: CountryUpdate) -> Result<CountryDto> {
        if let Some(msg) = update.validate() {
            return Err(CatalogError::InvalidRequest(msg));
        }
        let before = self
            .repository
            .find_country(id)
            .ok_or_else(|| country_not_found(id))?;

        let mut country = before.country.clone();
        if let Some(name) = update.name.map(|n| n.trim().to_string()) {
            if !name.eq_ignore_ascii_case(&country.name)
                && self.repository.find_country_by_name(&name).is_some()
            {
                warn!("Country name conflict: {}", name);
                return Err(CatalogError::Conflict(format!(
                    "Country '{}' already exists",
                    name
                )));
            }
            country.name = name;
        }
        if let Some(capital) = update.capital {
            country.capital = Some(capital);
        }
        if let Some(population) = update.population {
            country.population = Some(population);
        }
        if let Some(area) = update.area_square_km {
            country.area_square_km = Some(area);
        }
        if let Some(gdp) = update.gdp {
            country.gdp = Some(gdp);
        }

        if !self.repository.save_country(country) {
            return Err(country_not_found(id));
        }
        let after = self
            .repository
            .find_country(id)
            .ok_or_else(|| country_not_found(id))?;

        // Keys cover both snapshots; the cached value is re-read at put time.
        self.invalidation.invalidate_and_refresh(
            &Written::Country(&after.clone().with_previous(&before)),
            ChangeKind::Update,
            || self.repository.find_country(id),
        );
        info!("Updated country ID: {}", id);

        CountryDto::from_graph(&after)
            .ok_or_else(|| CatalogError::Internal("Country projection failed".to_string()))
    }

    pub fn delete_country(&self, id: EntityId) -> Result<()> {
        warn!("Deleting country ID: {}", id);
        let before = self
            .repository
            .delete_country(id)
            .ok_or_else(|| country_not_found(id))?;

        self.invalidation
            .invalidate(&Written::Country(&before), ChangeKind::Delete);
        info!("Deleted country ID: {}", id);
        Ok(())
    }

    pub fn delete_countries(&self) {
        warn!("Deleting all countries");
        let removed = self.repository.delete_all_countries();
        self.invalidation.invalidate_all();
        info!("Deleted {} countries", removed);
    }

    /// Countries that own a city with the given name (case-insensitive).
    pub fn search_by_city_name(&self, city_name: &str) -> Result<Vec<CountryDto>> {
        if city_name.trim().is_empty() {
            return Err(CatalogError::InvalidRequest(
                "City name cannot be empty".to_string(),
            ));
        }
        let key = keys::search_by_city(city_name);
        if let Some(countries) = cached(&self.cache, &key, CachedValue::into_countries) {
            return Ok(countries);
        }

        let countries = project(self.repository.countries_by_city_name(city_name));
        self.cache
            .put(key, CachedValue::Countries(countries.clone()));
        Ok(countries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::City;
    use std::time::Duration;

    struct Fixture {
        repository: Arc<Repository>,
        cache: Arc<CacheStore<CachedValue>>,
        service: CountryService,
    }

    fn fixture() -> Fixture {
        let repository = Arc::new(Repository::new());
        let cache = Arc::new(CacheStore::new(100, Duration::from_secs(600)));
        let service = CountryService::new(
            repository.clone(),
            cache.clone(),
            InvalidationOrchestrator::new(cache.clone()),
        );
        Fixture {
            repository,
            cache,
            service,
        }
    }

    fn request(name: &str) -> CountryRequest {
        CountryRequest {
            name: name.to_string(),
            capital: None,
            population: Some(1.0e6),
            area_square_km: None,
            gdp: None,
        }
    }

    #[test]
    fn test_get_countries_populates_cache() {
        let f = fixture();
        f.service.add_country(request("Belarus")).unwrap();

        assert_eq!(f.service.get_countries().len(), 1);
        assert!(f.cache.contains_key("all_countries"));

        // Served from cache even if the repository changes behind its back.
        f.repository.delete_all_countries();
        assert_eq!(f.service.get_countries().len(), 1);
    }

    #[test]
    fn test_add_country_invalidates_list() {
        let f = fixture();
        f.service.add_country(request("Belarus")).unwrap();
        f.service.get_countries();

        f.service.add_country(request("Poland")).unwrap();

        assert!(!f.cache.contains_key("all_countries"));
        assert_eq!(f.service.get_countries().len(), 2);
    }

    #[test]
    fn test_add_country_conflict() {
        let f = fixture();
        f.service.add_country(request("Belarus")).unwrap();

        let err = f.service.add_country(request("belarus")).unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));
    }

    #[test]
    fn test_add_countries_is_all_or_nothing() {
        let f = fixture();
        let err = f
            .service
            .add_countries(vec![request("A"), request("B"), request("a")])
            .unwrap_err();

        assert!(matches!(err, CatalogError::Conflict(_)));
        assert!(f.repository.list_countries().is_empty());

        let added = f
            .service
            .add_countries(vec![request("A"), request("B")])
            .unwrap();
        assert_eq!(added.len(), 2);
    }

    #[test]
    fn test_update_writes_through_without_repository() {
        let f = fixture();
        let dto = f.service.add_country(request("Belarus")).unwrap();
        f.service.get_country(dto.id).unwrap();

        let updated = f
            .service
            .update_country(
                dto.id,
                CountryUpdate {
                    capital: Some("Minsk".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.capital.as_deref(), Some("Minsk"));

        // The repository is gone, yet the fresh value is served.
        f.repository.delete_country(dto.id);
        let cached = f.service.get_country(dto.id).unwrap();
        assert_eq!(cached.capital.as_deref(), Some("Minsk"));
    }

    #[test]
    fn test_update_racing_city_delete_never_caches_removed_city() {
        let f = fixture();
        let invalidation = InvalidationOrchestrator::new(f.cache.clone());
        let service =
            CountryService::new(f.repository.clone(), f.cache.clone(), invalidation.clone());
        let cities =
            crate::services::CityService::new(f.repository.clone(), f.cache.clone(), invalidation);
        let country = service.add_country(request("Belarus")).unwrap();

        for round in 0..200 {
            let city = f.repository.insert_city(City {
                id: 0,
                name: format!("City {}", round),
                population: None,
                area_square_km: None,
                country_id: Some(country.id),
            });

            std::thread::scope(|s| {
                s.spawn(|| {
                    service
                        .update_country(
                            country.id,
                            CountryUpdate {
                                gdp: Some(round as f64),
                                ..Default::default()
                            },
                        )
                        .unwrap();
                });
                s.spawn(|| cities.delete_city(city.id).unwrap());
            });

            let stored = match f.repository.find_country(country.id).unwrap().cities {
                Linked::Loaded(ids) => ids,
                Linked::Unresolved => panic!("cities not loaded"),
            };
            let served = service.get_country(country.id).unwrap();
            assert_eq!(served.city_ids, stored, "stale city ids in round {}", round);
            assert!(!served.city_ids.contains(&city.id));
        }
    }

    #[test]
    fn test_update_invalidates_nation_and_city_views() {
        let f = fixture();
        let dto = f.service.add_country(request("Belarus")).unwrap();
        let nation = f.repository.insert_nation(crate::models::Nation {
            id: 0,
            name: "Belarusian".into(),
            language: None,
            religion: None,
        });
        f.repository.link(dto.id, nation.id);
        for key in [
            keys::countries_of_nation(nation.id),
            keys::cities_of_country(dto.id),
            keys::city_ids_of_country(dto.id),
            keys::ALL_CITIES.to_string(),
        ] {
            f.cache.put(key, CachedValue::Countries(Vec::new()));
        }

        f.service
            .update_country(
                dto.id,
                CountryUpdate {
                    name: Some("Republic of Belarus".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(!f.cache.contains_key(&keys::countries_of_nation(nation.id)));
        assert!(!f.cache.contains_key(&keys::cities_of_country(dto.id)));
        assert!(!f.cache.contains_key(&keys::city_ids_of_country(dto.id)));
        assert!(!f.cache.contains_key(keys::ALL_CITIES));
    }

    #[test]
    fn test_update_missing_country() {
        let f = fixture();
        let err = f
            .service
            .update_country(9, CountryUpdate::default())
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test]
    fn test_delete_country_then_get_is_not_found() {
        let f = fixture();
        let dto = f.service.add_country(request("Belarus")).unwrap();
        f.service.get_country(dto.id).unwrap();

        f.service.delete_country(dto.id).unwrap();

        assert!(matches!(
            f.service.get_country(dto.id),
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            f.service.delete_country(dto.id),
            Err(CatalogError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_countries_clears_cache() {
        let f = fixture();
        f.service.add_country(request("Belarus")).unwrap();
        f.service.get_countries();
        f.cache.put("city_1", CachedValue::CityIds(Default::default()));

        f.service.delete_countries();

        assert!(f.cache.is_empty());
        assert!(f.service.get_countries().is_empty());
    }

    #[test]
    fn test_search_by_city_name() {
        let f = fixture();
        let dto = f.service.add_country(request("Belarus")).unwrap();
        f.repository.insert_city(City {
            id: 0,
            name: "Minsk".into(),
            population: None,
            area_square_km: None,
            country_id: Some(dto.id),
        });

        let found = f.service.search_by_city_name("minsk").unwrap();
        assert_eq!(found.len(), 1);
        assert!(f.cache.contains_key("search_city_minsk"));

        assert!(matches!(
            f.service.search_by_city_name("  "),
            Err(CatalogError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_malformed_cache_entry_falls_back_to_repository() {
        let f = fixture();
        let dto = f.service.add_country(request("Belarus")).unwrap();
        f.cache
            .put(keys::country(dto.id), CachedValue::Nations(Vec::new()));

        let loaded = f.service.get_country(dto.id).unwrap();

        assert_eq!(loaded.name, "Belarus");
        assert!(matches!(
            f.cache.get(&keys::country(dto.id)),
            Some(CachedValue::Country(_))
        ));
    }
}
