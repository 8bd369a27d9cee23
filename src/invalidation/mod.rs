//! Invalidation Module
//!
//! Key derivation for every cached view and the orchestrator that write
//! paths call after a successful mutation.

pub mod keys;
mod orchestrator;

pub use keys::KeySet;
pub use orchestrator::{ChangeKind, InvalidationOrchestrator, Written};
