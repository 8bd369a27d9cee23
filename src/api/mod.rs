//! API Module
//!
//! HTTP handlers and routing for the catalog REST API.
//!
//! # Endpoints
//! - `/api/country[/:id]`, `/api/country/bulk` - Countries
//! - `/api/cities[/:id]`, `/api/countries/:id/cities[/:city_id]` - Cities
//! - `/api/nations[/:id]`, `/api/countries/:id/nations[/:nation_id]` - Nations
//! - `GET /search?cityName=` - Countries owning a city
//! - `/api/logs`, `/api/logs/status/:task_id`, `/api/logs/file/:task_id` - Log exports
//! - `GET /api/visits?url=` - Request count per path
//! - `GET /api/cache/stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
