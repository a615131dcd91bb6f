//! Agent directory and self-service endpoints.

pub mod dto;
pub mod handlers;

pub use handlers::AgentHandlerState;
