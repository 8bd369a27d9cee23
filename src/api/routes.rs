//! API Routes
//!
//! Configures the Axum router with every catalog endpoint.

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{cities, countries, logs, nations, system};
use super::AppState;

/// Creates the main router.
///
/// # Middleware
/// - Visit counting: every request path is counted
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // == Countries ==
        .route(
            "/api/country",
            get(countries::list_countries)
                .post(countries::create_country)
                .delete(countries::delete_countries),
        )
        .route("/api/country/bulk", post(countries::create_countries))
        .route(
            "/api/country/:id",
            get(countries::get_country)
                .put(countries::update_country)
                .delete(countries::delete_country),
        )
        .route("/search", get(countries::search_by_city))
        // == Cities ==
        .route("/api/cities", get(cities::list_cities))
        .route(
            "/api/cities/:id",
            get(cities::get_city)
                .put(cities::update_city)
                .delete(cities::delete_city),
        )
        .route(
            "/api/countries/:id/cities",
            get(cities::cities_of_country)
                .post(cities::add_cities)
                .delete(cities::delete_cities_of_country),
        )
        .route(
            "/api/countries/:id/cities/:city_id",
            delete(cities::delete_city_of_country),
        )
        .route("/api/countries/:id/city-ids", get(cities::city_ids_of_country))
        // == Nations ==
        .route("/api/nations", get(nations::list_nations))
        .route(
            "/api/nations/:id",
            put(nations::update_nation).delete(nations::delete_nation),
        )
        .route(
            "/api/nations/:id/countries",
            get(nations::countries_of_nation),
        )
        .route(
            "/api/countries/:id/nations",
            get(nations::nations_of_country).post(nations::add_nation),
        )
        .route(
            "/api/countries/:id/nations/bulk",
            post(nations::add_nations),
        )
        .route(
            "/api/countries/:id/nations/:nation_id",
            delete(nations::remove_nation),
        )
        // == Logs ==
        .route(
            "/api/logs",
            get(logs::view_logs).post(logs::start_export),
        )
        .route("/api/logs/status/:task_id", get(logs::export_status))
        .route("/api/logs/file/:task_id", get(logs::download_export))
        // == System ==
        .route("/api/visits", get(system::visits_handler))
        .route("/api/cache/stats", get(system::stats_handler))
        .route("/health", get(system::health_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            system::count_visit,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
