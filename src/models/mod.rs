//! Catalog data model
//!
//! Entities as stored by the repository, the projections served over HTTP,
//! request bodies, and the tagged payloads kept in the cache.

pub mod cached;
pub mod dto;
pub mod entities;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use cached::CachedValue;
pub use dto::{CityDto, CountryDto, CountrySummary};
pub use entities::{City, Country, CountryGraph, EntityId, Linked, Nation, NationGraph};
pub use requests::{
    CityRequest, CityUpdate, CountryRequest, CountryUpdate, NationRequest, NationUpdate,
    LogDateQuery, SearchQuery, VisitQuery,
};
pub use responses::{
    ErrorResponse, HealthResponse, LogTaskCreated, StatsResponse, VisitResponse,
};
