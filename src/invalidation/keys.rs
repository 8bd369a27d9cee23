//! Cache key space
//!
//! Every cache key in the service is built here, and so is every fan-out
//! rule that maps a write to the keys whose views could contain the old
//! state. Nothing in this module touches the cache itself.

use std::collections::BTreeSet;

use crate::models::{EntityId, Linked};

// == Key Prefixes ==
pub const ALL_COUNTRIES: &str = "all_countries";
pub const ALL_CITIES: &str = "allCities";
pub const ALL_NATIONS: &str = "allNations";

pub const COUNTRY_PREFIX: &str = "country_";
pub const CITY_PREFIX: &str = "city_";
pub const CITIES_BY_COUNTRY_PREFIX: &str = "cities_country_";
pub const CITY_IDS_BY_COUNTRY_PREFIX: &str = "allCitiesByCountryId_";
pub const NATIONS_BY_COUNTRY_PREFIX: &str = "allNationsByCountryId_";
pub const COUNTRIES_BY_NATION_PREFIX: &str = "allCountriesByNationId_";
pub const SEARCH_BY_CITY_PREFIX: &str = "search_city_";

// == Key Constructors ==
pub fn country(id: EntityId) -> String {
    format!("{}{}", COUNTRY_PREFIX, id)
}

pub fn city(id: EntityId) -> String {
    format!("{}{}", CITY_PREFIX, id)
}

pub fn cities_of_country(country_id: EntityId) -> String {
    format!("{}{}", CITIES_BY_COUNTRY_PREFIX, country_id)
}

pub fn city_ids_of_country(country_id: EntityId) -> String {
    format!("{}{}", CITY_IDS_BY_COUNTRY_PREFIX, country_id)
}

pub fn nations_of_country(country_id: EntityId) -> String {
    format!("{}{}", NATIONS_BY_COUNTRY_PREFIX, country_id)
}

pub fn countries_of_nation(nation_id: EntityId) -> String {
    format!("{}{}", COUNTRIES_BY_NATION_PREFIX, nation_id)
}

/// Search results are keyed case-insensitively.
pub fn search_by_city(city_name: &str) -> String {
    format!("{}{}", SEARCH_BY_CITY_PREFIX, city_name.trim().to_lowercase())
}

// == Key Set ==
/// Keys to drop after a write: exact keys plus whole key families.
///
/// A family (a key prefix) stands in for keys that cannot be enumerated,
/// either because they are parameterised by free text or because the
/// relationship that would name them is unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    exact: BTreeSet<String>,
    families: BTreeSet<&'static str>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&mut self, key: impl Into<String>) -> &mut Self {
        self.exact.insert(key.into());
        self
    }

    pub fn family(&mut self, prefix: &'static str) -> &mut Self {
        self.families.insert(prefix);
        self
    }

    pub fn extend(&mut self, other: KeySet) -> &mut Self {
        self.exact.extend(other.exact);
        self.families.extend(other.families);
        self
    }

    pub fn exact(&self) -> impl Iterator<Item = &str> {
        self.exact.iter().map(String::as_str)
    }

    pub fn families(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.families.iter().copied()
    }

    /// Whether `key` is dropped by this set, directly or through a family.
    #[cfg(test)]
    pub fn covers(&self, key: &str) -> bool {
        self.exact.contains(key) || self.families.iter().any(|p| key.starts_with(p))
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.families.is_empty()
    }
}

// == Fan-out Rules ==

/// Views that embed country `country_id` or its link to `nations`.
pub fn country_keys(country_id: EntityId, nations: &Linked) -> KeySet {
    let mut keys = KeySet::new();
    keys.key(country(country_id))
        .key(cities_of_country(country_id))
        .key(city_ids_of_country(country_id))
        .key(nations_of_country(country_id))
        .key(ALL_COUNTRIES)
        .key(ALL_CITIES)
        .family(SEARCH_BY_CITY_PREFIX);

    match nations {
        Linked::Loaded(ids) => {
            for &nation_id in ids {
                keys.key(countries_of_nation(nation_id));
            }
        }
        Linked::Unresolved => {
            keys.key(ALL_NATIONS).family(COUNTRIES_BY_NATION_PREFIX);
        }
    }
    keys
}

/// Views that list city `city_id`.
///
/// `owner` is the owning country and the nations linked to it.
pub fn city_keys(city_id: EntityId, owner: Option<(EntityId, &Linked)>) -> KeySet {
    let mut keys = KeySet::new();
    keys.key(ALL_CITIES)
        .key(city(city_id))
        .family(SEARCH_BY_CITY_PREFIX);

    if let Some((country_id, nations)) = owner {
        keys.extend(city_listing_keys(country_id, nations));
    }
    keys
}

/// Views that enumerate the cities of `country_id`.
///
/// Country listings per nation carry city ids, so the nations linked to the
/// country matter here as well.
pub fn city_listing_keys(country_id: EntityId, nations: &Linked) -> KeySet {
    let mut keys = KeySet::new();
    keys.key(ALL_CITIES)
        .key(cities_of_country(country_id))
        .key(city_ids_of_country(country_id))
        .key(country(country_id))
        .key(ALL_COUNTRIES)
        .family(SEARCH_BY_CITY_PREFIX);

    match nations {
        Linked::Loaded(ids) => {
            for &nation_id in ids {
                keys.key(countries_of_nation(nation_id));
            }
        }
        Linked::Unresolved => {
            keys.family(COUNTRIES_BY_NATION_PREFIX);
        }
    }
    keys
}

/// Individual views of the given cities; unresolved means all of them.
pub fn city_entity_keys(cities: &Linked) -> KeySet {
    let mut keys = KeySet::new();
    match cities {
        Linked::Loaded(ids) => {
            for &city_id in ids {
                keys.key(city(city_id));
            }
        }
        Linked::Unresolved => {
            keys.family(CITY_PREFIX);
        }
    }
    keys
}

/// Views that embed nation `nation_id` or its link to `countries`.
pub fn nation_keys(nation_id: EntityId, countries: &Linked) -> KeySet {
    let mut keys = KeySet::new();
    keys.key(ALL_NATIONS).key(countries_of_nation(nation_id));

    match countries {
        Linked::Loaded(ids) => {
            for &country_id in ids {
                keys.key(nations_of_country(country_id))
                    .key(country(country_id));
            }
            if !ids.is_empty() {
                keys.key(ALL_COUNTRIES);
            }
        }
        Linked::Unresolved => {
            keys.key(ALL_COUNTRIES)
                .family(NATIONS_BY_COUNTRY_PREFIX)
                .family(COUNTRY_PREFIX);
        }
    }
    keys
}

/// Views touched by adding or removing the edge country `c` - nation `n`.
pub fn link_keys(country_id: EntityId, nation_id: EntityId) -> KeySet {
    let mut keys = KeySet::new();
    keys.key(country(country_id))
        .key(nations_of_country(country_id))
        .key(countries_of_nation(nation_id))
        .key(ALL_NATIONS)
        .key(ALL_COUNTRIES)
        .family(SEARCH_BY_CITY_PREFIX);
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked(ids: &[EntityId]) -> Linked {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_key_constructors() {
        assert_eq!(country(7), "country_7");
        assert_eq!(city(3), "city_3");
        assert_eq!(cities_of_country(7), "cities_country_7");
        assert_eq!(city_ids_of_country(7), "allCitiesByCountryId_7");
        assert_eq!(nations_of_country(7), "allNationsByCountryId_7");
        assert_eq!(countries_of_nation(2), "allCountriesByNationId_2");
        assert_eq!(search_by_city("  Minsk "), "search_city_minsk");
    }

    #[test]
    fn test_country_keys_with_loaded_nations() {
        let keys = country_keys(1, &linked(&[10, 11]));

        for key in [
            "country_1",
            "cities_country_1",
            "allCitiesByCountryId_1",
            "allNationsByCountryId_1",
            "all_countries",
            "allCities",
            "allCountriesByNationId_10",
            "allCountriesByNationId_11",
            "search_city_minsk",
        ] {
            assert!(keys.covers(key), "{} should be covered", key);
        }
        assert!(!keys.covers("allCountriesByNationId_12"));
        assert!(!keys.covers("city_1"));
        assert!(!keys.covers("country_2"));
    }

    #[test]
    fn test_country_keys_with_unresolved_nations_widen() {
        let keys = country_keys(1, &Linked::Unresolved);

        assert!(keys.covers("allNations"));
        assert!(keys.covers("allCountriesByNationId_99"));
        assert!(keys.families().any(|f| f == COUNTRIES_BY_NATION_PREFIX));
    }

    #[test]
    fn test_city_keys_with_owner() {
        let nations = linked(&[9]);
        let keys = city_keys(5, Some((1, &nations)));

        for key in [
            "allCities",
            "city_5",
            "cities_country_1",
            "allCitiesByCountryId_1",
            "country_1",
            "all_countries",
            "allCountriesByNationId_9",
        ] {
            assert!(keys.covers(key), "{} should be covered", key);
        }
        assert!(!keys.covers("city_6"));
        assert!(!keys.covers("allCountriesByNationId_8"));
    }

    #[test]
    fn test_city_keys_owner_with_unresolved_nations() {
        let keys = city_keys(5, Some((1, &Linked::Unresolved)));
        assert!(keys.covers("allCountriesByNationId_8"));
    }

    #[test]
    fn test_city_keys_without_owner() {
        let keys = city_keys(5, None);

        assert!(keys.covers("city_5"));
        assert!(keys.covers("allCities"));
        assert!(!keys.covers("all_countries"));
        assert!(!keys.covers("country_1"));
    }

    #[test]
    fn test_city_listing_keys() {
        let keys = city_listing_keys(3, &linked(&[4]));
        assert!(keys.covers("cities_country_3"));
        assert!(keys.covers("allCountriesByNationId_4"));
        assert!(!keys.covers("city_3"));
    }

    #[test]
    fn test_city_entity_keys() {
        let keys = city_entity_keys(&linked(&[1, 2]));
        assert!(keys.covers("city_1"));
        assert!(keys.covers("city_2"));
        assert!(!keys.covers("city_3"));

        let all = city_entity_keys(&Linked::Unresolved);
        assert!(all.covers("city_3"));
        assert!(!all.covers("cities_country_3"));
    }

    #[test]
    fn test_nation_keys() {
        let keys = nation_keys(4, &linked(&[1, 2]));

        for key in [
            "allNations",
            "allCountriesByNationId_4",
            "allNationsByCountryId_1",
            "allNationsByCountryId_2",
            "country_1",
            "country_2",
            "all_countries",
        ] {
            assert!(keys.covers(key), "{} should be covered", key);
        }
        assert!(!keys.covers("country_3"));
    }

    #[test]
    fn test_nation_keys_unlinked_leaves_countries_alone() {
        let keys = nation_keys(4, &Linked::empty());
        assert!(keys.covers("allNations"));
        assert!(!keys.covers("all_countries"));
    }

    #[test]
    fn test_nation_keys_unresolved_widen() {
        let keys = nation_keys(4, &Linked::Unresolved);
        assert!(keys.covers("country_123"));
        assert!(keys.covers("allNationsByCountryId_123"));
        assert!(keys.covers("all_countries"));
    }

    #[test]
    fn test_link_keys() {
        let keys = link_keys(1, 2);
        assert!(keys.covers("country_1"));
        assert!(keys.covers("allNationsByCountryId_1"));
        assert!(keys.covers("allCountriesByNationId_2"));
        assert!(keys.covers("allNations"));
        assert!(!keys.covers("country_2"));
    }

    #[test]
    fn test_key_set_extend() {
        let mut keys = KeySet::new();
        assert!(keys.is_empty());

        keys.extend(city_keys(1, None)).extend(link_keys(1, 1));
        assert!(keys.covers("city_1"));
        assert!(keys.covers("allCountriesByNationId_1"));
    }
}
