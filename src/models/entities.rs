//! Catalog entities as held by the repository.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Identifier assigned by the repository.
pub type EntityId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: EntityId,
    pub name: String,
    pub capital: Option<String>,
    pub population: Option<f64>,
    pub area_square_km: Option<f64>,
    pub gdp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: EntityId,
    pub name: String,
    pub population: Option<f64>,
    pub area_square_km: Option<f64>,
    /// Owning country; `None` once the country has been deleted
    pub country_id: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nation {
    pub id: EntityId,
    pub name: String,
    pub language: Option<String>,
    pub religion: Option<String>,
}

// == Linked ==
/// Ids on the other side of a relationship.
///
/// `Unresolved` means the collection was not loaded, so nothing can be said
/// about which entities are linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Linked {
    Loaded(BTreeSet<EntityId>),
    Unresolved,
}

impl Linked {
    pub fn empty() -> Self {
        Linked::Loaded(BTreeSet::new())
    }

    /// Combines two snapshots of the same relationship.
    ///
    /// Unknown on either side stays unknown.
    pub fn union(&self, other: &Linked) -> Linked {
        match (self, other) {
            (Linked::Loaded(a), Linked::Loaded(b)) => Linked::Loaded(a | b),
            _ => Linked::Unresolved,
        }
    }

    pub fn ids(&self) -> Option<&BTreeSet<EntityId>> {
        match self {
            Linked::Loaded(ids) => Some(ids),
            Linked::Unresolved => None,
        }
    }
}

impl FromIterator<EntityId> for Linked {
    fn from_iter<I: IntoIterator<Item = EntityId>>(iter: I) -> Self {
        Linked::Loaded(iter.into_iter().collect())
    }
}

/// A country with the ids of its cities and nations.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryGraph {
    pub country: Country,
    pub cities: Linked,
    pub nations: Linked,
}

impl CountryGraph {
    /// Merges the relationships of a pre-mutation snapshot into this one.
    pub fn with_previous(mut self, previous: &CountryGraph) -> Self {
        self.cities = self.cities.union(&previous.cities);
        self.nations = self.nations.union(&previous.nations);
        self
    }
}

/// A nation with the ids of the countries it is linked to.
#[derive(Debug, Clone, PartialEq)]
pub struct NationGraph {
    pub nation: Nation,
    pub countries: Linked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linked_union() {
        let a: Linked = [1, 2].into_iter().collect();
        let b: Linked = [2, 3].into_iter().collect();

        assert_eq!(a.union(&b), [1, 2, 3].into_iter().collect());
        assert_eq!(a.union(&Linked::Unresolved), Linked::Unresolved);
        assert_eq!(Linked::Unresolved.union(&Linked::empty()), Linked::Unresolved);
    }

    #[test]
    fn test_country_graph_with_previous() {
        let country = Country {
            id: 1,
            name: "Belarus".into(),
            capital: None,
            population: None,
            area_square_km: None,
            gdp: None,
        };
        let before = CountryGraph {
            country: country.clone(),
            cities: [10].into_iter().collect(),
            nations: [5].into_iter().collect(),
        };
        let after = CountryGraph {
            country,
            cities: [10, 11].into_iter().collect(),
            nations: Linked::empty(),
        };

        let merged = after.with_previous(&before);
        assert_eq!(merged.cities, [10, 11].into_iter().collect());
        assert_eq!(merged.nations, [5].into_iter().collect());
    }
}
