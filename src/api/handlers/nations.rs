use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::AppState;
use crate::error::Result;
use crate::models::{CountryDto, EntityId, Nation, NationRequest, NationUpdate};

/// GET /api/nations
pub async fn list_nations(State(state): State<AppState>) -> Json<Vec<Nation>> {
    Json(state.nations.get_nations())
}

/// GET /api/nations/:id/countries
pub async fn countries_of_nation(
    State(state): State<AppState>,
    Path(nation_id): Path<EntityId>,
) -> Result<Json<Vec<CountryDto>>> {
    state.nations.get_countries_by_nation(nation_id).map(Json)
}

/// GET /api/countries/:id/nations
pub async fn nations_of_country(
    State(state): State<AppState>,
    Path(country_id): Path<EntityId>,
) -> Result<Json<Vec<Nation>>> {
    state.nations.get_nations_by_country(country_id).map(Json)
}

/// POST /api/countries/:id/nations
pub async fn add_nation(
    State(state): State<AppState>,
    Path(country_id): Path<EntityId>,
    Json(req): Json<NationRequest>,
) -> Result<(StatusCode, Json<Nation>)> {
    let nation = state.nations.add_nation_to_country(country_id, req)?;
    Ok((StatusCode::CREATED, Json(nation)))
}

/// POST /api/countries/:id/nations/bulk
pub async fn add_nations(
    State(state): State<AppState>,
    Path(country_id): Path<EntityId>,
    Json(reqs): Json<Vec<NationRequest>>,
) -> Result<(StatusCode, Json<Vec<Nation>>)> {
    let nations = state.nations.add_nations_to_country(country_id, reqs)?;
    Ok((StatusCode::CREATED, Json(nations)))
}

/// PUT /api/nations/:id
pub async fn update_nation(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(update): Json<NationUpdate>,
) -> Result<Json<Nation>> {
    state.nations.update_nation(id, update).map(Json)
}

/// DELETE /api/nations/:id
pub async fn delete_nation(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<StatusCode> {
    state.nations.delete_nation(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/countries/:id/nations/:nation_id
pub async fn remove_nation(
    State(state): State<AppState>,
    Path((country_id, nation_id)): Path<(EntityId, EntityId)>,
) -> Result<StatusCode> {
    state
        .nations
        .remove_nation_from_country(country_id, nation_id)?;
    Ok(StatusCode::NO_CONTENT)
}
