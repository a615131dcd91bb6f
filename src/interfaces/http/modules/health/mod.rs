//! Liveness endpoint.

pub mod handlers;

pub use handlers::{HealthState, health_check};
