//! Geo Catalog - country, city and nation reference service
//!
//! Serves the catalog over HTTP with a bounded, TTL-limited read cache that
//! every write path keeps consistent through key-set invalidation.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod invalidation;
pub mod models;
pub mod repository;
pub mod services;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_janitor_task;
