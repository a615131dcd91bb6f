//! Signup, login, token refresh and identity resolution endpoints.

pub mod dto;
pub mod handlers;

pub use handlers::AuthHandlerState;
