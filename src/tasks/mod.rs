//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache janitor: removes expired cache entries once per TTL period

mod janitor;

pub use janitor::spawn_janitor_task;
