//! Health, cache statistics and visit counting.

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
    Json,
};

use crate::api::AppState;
use crate::models::{HealthResponse, StatsResponse, VisitQuery, VisitResponse};

/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// GET /api/cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = &state.cache;
    let stats = cache.stats();

    Json(StatsResponse::new(
        &stats,
        cache.max_entries(),
        cache.ttl().as_millis() as u64,
    ))
}

/// GET /api/visits?url=
pub async fn visits_handler(
    State(state): State<AppState>,
    Query(query): Query<VisitQuery>,
) -> Json<VisitResponse> {
    let count = state.visits.count(&query.url);
    Json(VisitResponse {
        url: query.url,
        count,
    })
}

/// Counts every request by path before passing it on.
pub async fn count_visit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    state.visits.increment(request.uri().path());
    next.run(request).await
}
