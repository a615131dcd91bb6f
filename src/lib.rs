//! # VoltGo Service
//!
//! Backend for an on-demand EV battery charging delivery marketplace:
//! account signup/login with role-based access, an order lifecycle state
//! machine with agent assignment, agent self-service, and an admin
//! back office.
//!
//! ## Architecture
//!
//! - **domain**: core entities, enums and repository traits
//! - **application**: use-case services (identity, orders, dispatch,
//!   analytics)
//! - **infrastructure**: crypto (bcrypt/JWT) and the SeaORM persistence
//!   layer with embedded migrations
//! - **interfaces**: the axum REST API with Swagger documentation

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

pub use config::AppConfig;

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::http::create_api_router;
