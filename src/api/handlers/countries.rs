//! Country endpoints and city-name search.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::api::AppState;
use crate::error::{CatalogError, Result};
use crate::models::{CountryDto, CountryRequest, CountryUpdate, EntityId, SearchQuery};

/// GET /api/country
pub async fn list_countries(State(state): State<AppState>) -> Json<Vec<CountryDto>> {
    Json(state.countries.get_countries())
}

/// GET /api/country/:id
pub async fn get_country(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<Json<CountryDto>> {
    state.countries.get_country(id).map(Json)
}

/// POST /api/country
pub async fn create_country(
    State(state): State<AppState>,
    Json(req): Json<CountryRequest>,
) -> Result<(StatusCode, Json<CountryDto>)> {
    let country = state.countries.add_country(req)?;
    Ok((StatusCode::CREATED, Json(country)))
}

/// POST /api/country/bulk
pub async fn create_countries(
    State(state): State<AppState>,
    Json(reqs): Json<Vec<CountryRequest>>,
) -> Result<(StatusCode, Json<Vec<CountryDto>>)> {
    let countries = state.countries.add_countries(reqs)?;
    Ok((StatusCode::CREATED, Json(countries)))
}

/// PUT /api/country/:id
pub async fn update_country(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(update): Json<CountryUpdate>,
) -> Result<Json<CountryDto>> {
    state.countries.update_country(id, update).map(Json)
}

/// DELETE /api/country/:id
pub async fn delete_country(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<StatusCode> {
    state.countries.delete_country(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/country
pub async fn delete_countries(State(state): State<AppState>) -> StatusCode {
    state.countries.delete_countries();
    StatusCode::NO_CONTENT
}

/// GET /search?cityName=
///
/// Responds 404 when no country owns a city with that name.
pub async fn search_by_city(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<CountryDto>>> {
    let countries = state.countries.search_by_city_name(&query.city_name)?;
    if countries.is_empty() {
        return Err(CatalogError::NotFound(format!(
            "No countries found with city: {}",
            query.city_name
        )));
    }
    Ok(Json(countries))
}
