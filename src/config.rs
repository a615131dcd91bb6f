//! Configuration module
//!
//! Everything is environment-driven with sensible development defaults:
//!
//! - `VOLTGO_HOST` / `VOLTGO_PORT`: API bind address
//! - `DATABASE_URL`: SeaORM connection string
//! - `JWT_SECRET` / `JWT_EXPIRATION_HOURS`: token signing
//! - `ORDER_TRANSITION_POLICY`: `lenient` (default) or `strict`
//! - `VOLTGO_ADMIN_USERNAME` / `VOLTGO_ADMIN_PASSWORD`: bootstrap admin
//! - `RUST_LOG`: log filter (via tracing-subscriber)

use crate::domain::TransitionPolicy;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("VOLTGO_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("VOLTGO_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        }
    }
}

/// Bootstrap admin credentials, used only when the users table is empty.
#[derive(Debug, Clone)]
pub struct AdminSeedConfig {
    pub username: String,
    pub password: String,
    pub name: String,
}

impl Default for AdminSeedConfig {
    fn default() -> Self {
        Self {
            username: std::env::var("VOLTGO_ADMIN_USERNAME")
                .unwrap_or_else(|_| "admin".to_string()),
            password: std::env::var("VOLTGO_ADMIN_PASSWORD")
                .unwrap_or_else(|_| "change-me-now".to_string()),
            name: "Platform Admin".to_string(),
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub admin: AdminSeedConfig,
    pub transition_policy: TransitionPolicy,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let transition_policy = std::env::var("ORDER_TRANSITION_POLICY")
            .ok()
            .and_then(|v| TransitionPolicy::parse(&v))
            .unwrap_or_default();

        Self {
            server: ServerConfig::default(),
            admin: AdminSeedConfig::default(),
            transition_policy,
        }
    }
}
