//! City endpoints, global and nested under a country.

use std::collections::BTreeSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::AppState;
use crate::error::Result;
use crate::models::{CityDto, CityRequest, CityUpdate, EntityId};

/// GET /api/cities
///
/// 204 when there are no cities at all.
pub async fn list_cities(State(state): State<AppState>) -> Response {
    let cities = state.cities.get_cities();
    if cities.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(cities).into_response()
}

/// GET /api/cities/:id
pub async fn get_city(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<Json<CityDto>> {
    state.cities.get_city(id).map(Json)
}

/// PUT /api/cities/:id
pub async fn update_city(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(update): Json<CityUpdate>,
) -> Result<Json<CityDto>> {
    state.cities.update_city(id, update).map(Json)
}

/// DELETE /api/cities/:id
pub async fn delete_city(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<StatusCode> {
    state.cities.delete_city(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/countries/:id/cities
pub async fn cities_of_country(
    State(state): State<AppState>,
    Path(country_id): Path<EntityId>,
) -> Result<Json<Vec<CityDto>>> {
    state.cities.get_cities_by_country(country_id).map(Json)
}

/// GET /api/countries/:id/city-ids
pub async fn city_ids_of_country(
    State(state): State<AppState>,
    Path(country_id): Path<EntityId>,
) -> Result<Json<BTreeSet<EntityId>>> {
    state.cities.city_ids_of_country(country_id).map(Json)
}

/// POST /api/countries/:id/cities
pub async fn add_cities(
    State(state): State<AppState>,
    Path(country_id): Path<EntityId>,
    Json(reqs): Json<Vec<CityRequest>>,
) -> Result<(StatusCode, Json<Vec<CityDto>>)> {
    let cities = state.cities.add_cities(country_id, reqs)?;
    Ok((StatusCode::CREATED, Json(cities)))
}

/// DELETE /api/countries/:id/cities
pub async fn delete_cities_of_country(
    State(state): State<AppState>,
    Path(country_id): Path<EntityId>,
) -> Result<StatusCode> {
    state.cities.delete_cities_of_country(country_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/countries/:id/cities/:city_id
pub async fn delete_city_of_country(
    State(state): State<AppState>,
    Path((country_id, city_id)): Path<(EntityId, EntityId)>,
) -> Result<StatusCode> {
    state.cities.delete_city_of_country(country_id, city_id)?;
    Ok(StatusCode::NO_CONTENT)
}
