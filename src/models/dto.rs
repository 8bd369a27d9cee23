//! Read-side projections returned by the API and kept in the cache.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::entities::{City, Country, CountryGraph, EntityId, Linked};

/// Country with the ids of everything linked to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryDto {
    pub id: EntityId,
    pub name: String,
    pub capital: Option<String>,
    pub population: Option<f64>,
    pub area_square_km: Option<f64>,
    pub gdp: Option<f64>,
    pub city_ids: BTreeSet<EntityId>,
    pub nation_ids: BTreeSet<EntityId>,
}

impl CountryDto {
    /// Projects a graph; `None` if either relationship is unresolved.
    pub fn from_graph(graph: &CountryGraph) -> Option<Self> {
        let (Linked::Loaded(city_ids), Linked::Loaded(nation_ids)) =
            (&graph.cities, &graph.nations)
        else {
            return None;
        };
        let country = &graph.country;

        Some(Self {
            id: country.id,
            name: country.name.clone(),
            capital: country.capital.clone(),
            population: country.population,
            area_square_km: country.area_square_km,
            gdp: country.gdp,
            city_ids: city_ids.clone(),
            nation_ids: nation_ids.clone(),
        })
    }
}

/// Short form of a country embedded in city listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountrySummary {
    pub id: EntityId,
    pub name: String,
    pub capital: Option<String>,
}

impl From<&Country> for CountrySummary {
    fn from(country: &Country) -> Self {
        Self {
            id: country.id,
            name: country.name.clone(),
            capital: country.capital.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityDto {
    pub id: EntityId,
    pub name: String,
    pub population: Option<f64>,
    pub area_square_km: Option<f64>,
    pub country: Option<CountrySummary>,
}

impl CityDto {
    pub fn new(city: &City, country: Option<&Country>) -> Self {
        Self {
            id: city.id,
            name: city.name.clone(),
            population: city.population,
            area_square_km: city.area_square_km,
            country: country.map(CountrySummary::from),
        }
    }
}
