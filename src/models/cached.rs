//! Tagged payloads stored in the shared cache.
//!
//! Each read path expects exactly one variant; anything else found under its
//! key is treated as a miss by the caller.

use std::collections::BTreeSet;

use super::dto::{CityDto, CountryDto};
use super::entities::{City, EntityId, Nation};

#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Country(CountryDto),
    Countries(Vec<CountryDto>),
    City(City),
    Cities(Vec<CityDto>),
    CityIds(BTreeSet<EntityId>),
    Nations(Vec<Nation>),
}

impl CachedValue {
    /// Short variant name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            CachedValue::Country(_) => "country",
            CachedValue::Countries(_) => "countries",
            CachedValue::City(_) => "city",
            CachedValue::Cities(_) => "cities",
            CachedValue::CityIds(_) => "city_ids",
            CachedValue::Nations(_) => "nations",
        }
    }

    pub fn into_country(self) -> Option<CountryDto> {
        match self {
            CachedValue::Country(dto) => Some(dto),
            _ => None,
        }
    }

    pub fn into_countries(self) -> Option<Vec<CountryDto>> {
        match self {
            CachedValue::Countries(list) => Some(list),
            _ => None,
        }
    }

    pub fn into_city(self) -> Option<City> {
        match self {
            CachedValue::City(city) => Some(city),
            _ => None,
        }
    }

    pub fn into_cities(self) -> Option<Vec<CityDto>> {
        match self {
            CachedValue::Cities(list) => Some(list),
            _ => None,
        }
    }

    pub fn into_city_ids(self) -> Option<BTreeSet<EntityId>> {
        match self {
            CachedValue::CityIds(ids) => Some(ids),
            _ => None,
        }
    }

    pub fn into_nations(self) -> Option<Vec<Nation>> {
        match self {
            CachedValue::Nations(list) => Some(list),
            _ => None,
        }
    }
}
