//! API Handlers
//!
//! Thin adapters from HTTP to the services; every failure is a
//! [`CatalogError`](crate::error::CatalogError) rendered by its
//! `IntoResponse` impl.

pub mod cities;
pub mod countries;
pub mod logs;
pub mod nations;
pub mod system;
