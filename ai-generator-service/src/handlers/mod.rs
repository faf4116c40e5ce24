//! HTTP handlers for the AI generator service.

pub mod generation;
pub mod health;
pub mod metrics;

pub use generation::{generate, refine};
pub use health::{health_check, not_found, readiness_check};
