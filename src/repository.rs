//! Repository
//!
//! In-memory system of record for countries, cities and nations. Tables are
//! keyed by id, the country-nation relation is an edge set, and every query
//! hands back entities with their relationships already loaded.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;

use crate::models::{City, Country, CountryGraph, EntityId, Linked, Nation, NationGraph};

#[derive(Debug, Default)]
struct Tables {
    countries: BTreeMap<EntityId, Country>,
    cities: BTreeMap<EntityId, City>,
    nations: BTreeMap<EntityId, Nation>,
    /// (country id, nation id)
    links: BTreeSet<(EntityId, EntityId)>,
    last_country_id: EntityId,
    last_city_id: EntityId,
    last_nation_id: EntityId,
}

impl Tables {
    fn country_graph(&self, country: &Country) -> CountryGraph {
        CountryGraph {
            country: country.clone(),
            cities: self
                .cities
                .values()
                .filter(|city| city.country_id == Some(country.id))
                .map(|city| city.id)
                .collect(),
            nations: self
                .links
                .iter()
                .filter(|(c, _)| *c == country.id)
                .map(|(_, n)| *n)
                .collect(),
        }
    }

    fn nation_graph(&self, nation: &Nation) -> NationGraph {
        NationGraph {
            nation: nation.clone(),
            countries: self.countries_linked_to(nation.id),
        }
    }

    fn countries_linked_to(&self, nation_id: EntityId) -> Linked {
        self.links
            .iter()
            .filter(|(_, n)| *n == nation_id)
            .map(|(c, _)| *c)
            .collect()
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

// == Repository ==
#[derive(Debug, Default)]
pub struct Repository {
    tables: RwLock<Tables>,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    // == Countries ==

    pub fn list_countries(&self) -> Vec<CountryGraph> {
        let tables = self.tables.read();
        tables
            .countries
            .values()
            .map(|country| tables.country_graph(country))
            .collect()
    }

    pub fn find_country(&self, id: EntityId) -> Option<CountryGraph> {
        let tables = self.tables.read();
        tables
            .countries
            .get(&id)
            .map(|country| tables.country_graph(country))
    }

    pub fn country_exists(&self, id: EntityId) -> bool {
        self.tables.read().countries.contains_key(&id)
    }

    pub fn find_country_by_name(&self, name: &str) -> Option<Country> {
        self.tables
            .read()
            .countries
            .values()
            .find(|country| same_name(&country.name, name))
            .cloned()
    }

    /// Stores a new country under a fresh id; the id on `country` is ignored.
    pub fn insert_country(&self, mut country: Country) -> Country {
        let mut tables = self.tables.write();
        tables.last_country_id += 1;
        country.id = tables.last_country_id;
        tables.countries.insert(country.id, country.clone());
        country
    }

    /// Overwrites an existing country; false if it does not exist.
    pub fn save_country(&self, country: Country) -> bool {
        let mut tables = self.tables.write();
        match tables.countries.get_mut(&country.id) {
            Some(slot) => {
                *slot = country;
                true
            }
            None => false,
        }
    }

    /// Deletes a country, detaching its cities and dropping its links.
    ///
    /// Returns the country as it was before deletion.
    pub fn delete_country(&self, id: EntityId) -> Option<CountryGraph> {
        let mut tables = self.tables.write();
        let country = tables.countries.remove(&id)?;
        let before = tables.country_graph(&country);

        for city in tables.cities.values_mut() {
            if city.country_id == Some(id) {
                city.country_id = None;
            }
        }
        tables.links.retain(|(c, _)| *c != id);
        Some(before)
    }

    /// Deletes every country; returns how many were removed.
    pub fn delete_all_countries(&self) -> usize {
        let mut tables = self.tables.write();
        let count = tables.countries.len();
        tables.countries.clear();
        tables.links.clear();
        for city in tables.cities.values_mut() {
            city.country_id = None;
        }
        count
    }

    /// Countries owning at least one city with the given name.
    pub fn countries_by_city_name(&self, city_name: &str) -> Vec<CountryGraph> {
        let tables = self.tables.read();
        let owners: BTreeSet<EntityId> = tables
            .cities
            .values()
            .filter(|city| same_name(&city.name, city_name))
            .filter_map(|city| city.country_id)
            .collect();

        owners
            .iter()
            .filter_map(|id| tables.countries.get(id))
            .map(|country| tables.country_graph(country))
            .collect()
    }

    // == Cities ==

    pub fn list_cities(&self) -> Vec<City> {
        self.tables.read().cities.values().cloned().collect()
    }

    pub fn find_city(&self, id: EntityId) -> Option<City> {
        self.tables.read().cities.get(&id).cloned()
    }

    pub fn cities_of_country(&self, country_id: EntityId) -> Vec<City> {
        self.tables
            .read()
            .cities
            .values()
            .filter(|city| city.country_id == Some(country_id))
            .cloned()
            .collect()
    }

    /// Stores a new city under a fresh id.
    pub fn insert_city(&self, mut city: City) -> City {
        let mut tables = self.tables.write();
        tables.last_city_id += 1;
        city.id = tables.last_city_id;
        tables.cities.insert(city.id, city.clone());
        city
    }

    pub fn save_city(&self, city: City) -> bool {
        let mut tables = self.tables.write();
        match tables.cities.get_mut(&city.id) {
            Some(slot) => {
                *slot = city;
                true
            }
            None => false,
        }
    }

    pub fn delete_city(&self, id: EntityId) -> Option<City> {
        self.tables.write().cities.remove(&id)
    }

    /// Deletes every city owned by `country_id`, returning them.
    pub fn delete_cities_of_country(&self, country_id: EntityId) -> Vec<City> {
        let mut tables = self.tables.write();
        let doomed: Vec<EntityId> = tables
            .cities
            .values()
            .filter(|city| city.country_id == Some(country_id))
            .map(|city| city.id)
            .collect();

        doomed
            .iter()
            .filter_map(|id| tables.cities.remove(id))
            .collect()
    }

    // == Nations ==

    pub fn list_nations(&self) -> Vec<Nation> {
        self.tables.read().nations.values().cloned().collect()
    }

    pub fn find_nation(&self, id: EntityId) -> Option<NationGraph> {
        let tables = self.tables.read();
        tables
            .nations
            .get(&id)
            .map(|nation| tables.nation_graph(nation))
    }

    pub fn find_nation_by_name(&self, name: &str) -> Option<Nation> {
        self.tables
            .read()
            .nations
            .values()
            .find(|nation| same_name(&nation.name, name))
            .cloned()
    }

    pub fn insert_nation(&self, mut nation: Nation) -> Nation {
        let mut tables = self.tables.write();
        tables.last_nation_id += 1;
        nation.id = tables.last_nation_id;
        tables.nations.insert(nation.id, nation.clone());
        nation
    }

    pub fn save_nation(&self, nation: Nation) -> bool {
        let mut tables = self.tables.write();
        match tables.nations.get_mut(&nation.id) {
            Some(slot) => {
                *slot = nation;
                true
            }
            None => false,
        }
    }

    /// Deletes a nation and its links, returning its pre-deletion graph.
    pub fn delete_nation(&self, id: EntityId) -> Option<NationGraph> {
        let mut tables = self.tables.write();
        let nation = tables.nations.remove(&id)?;
        let before = tables.nation_graph(&nation);
        tables.links.retain(|(_, n)| *n != id);
        Some(before)
    }

    pub fn nations_of_country(&self, country_id: EntityId) -> Vec<Nation> {
        let tables = self.tables.read();
        tables
            .links
            .iter()
            .filter(|(c, _)| *c == country_id)
            .filter_map(|(_, n)| tables.nations.get(n))
            .cloned()
            .collect()
    }

    pub fn countries_of_nation(&self, nation_id: EntityId) -> Vec<CountryGraph> {
        let tables = self.tables.read();
        tables
            .links
            .iter()
            .filter(|(_, n)| *n == nation_id)
            .filter_map(|(c, _)| tables.countries.get(c))
            .map(|country| tables.country_graph(country))
            .collect()
    }

    // == Links ==

    /// Links a country and a nation; false if either is missing or the
    /// link already exists.
    pub fn link(&self, country_id: EntityId, nation_id: EntityId) -> bool {
        let mut tables = self.tables.write();
        if !tables.countries.contains_key(&country_id) || !tables.nations.contains_key(&nation_id)
        {
            return false;
        }
        tables.links.insert((country_id, nation_id))
    }

    /// Removes a link; false if it did not exist.
    pub fn unlink(&self, country_id: EntityId, nation_id: EntityId) -> bool {
        self.tables.write().links.remove(&(country_id, nation_id))
    }
}
