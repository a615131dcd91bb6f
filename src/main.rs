//! VoltGo API server entry point.
//!
//! Reads configuration from the environment, runs migrations, seeds the
//! bootstrap admin, and serves the REST API until SIGINT.

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use voltgo::application::{AnalyticsService, DispatchService, IdentityService, OrderService};
use voltgo::domain::{NewUser, UserRepositoryInterface, UserRole};
use voltgo::infrastructure::crypto::jwt::JwtConfig;
use voltgo::infrastructure::database::migrator::Migrator;
use voltgo::infrastructure::database::repositories::{
    AgentRepository, OrderRepository, UserRepository,
};
use voltgo::{create_api_router, init_database, AppConfig, DatabaseConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let app_cfg = AppConfig::from_env();
    info!("Starting VoltGo service...");

    // ── Prometheus metrics recorder (must be installed before any metrics calls) ──
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    info!("Prometheus metrics recorder installed");

    let jwt_config = JwtConfig::from_env();
    info!(
        "JWT configured with {}h token expiration",
        jwt_config.expiration_hours
    );

    // ── Database ───────────────────────────────────────────────
    let db_config = DatabaseConfig::from_env();
    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    // ── Repositories & services ────────────────────────────────
    let users: Arc<dyn voltgo::domain::UserRepositoryInterface> =
        Arc::new(UserRepository::new(db.clone()));
    let agents: Arc<dyn voltgo::domain::AgentRepositoryInterface> =
        Arc::new(AgentRepository::new(db.clone()));
    let orders: Arc<dyn voltgo::domain::OrderRepositoryInterface> =
        Arc::new(OrderRepository::new(db.clone()));

    create_default_admin(users.as_ref(), &app_cfg).await;

    let identity = Arc::new(IdentityService::new(
        users.clone(),
        agents.clone(),
        jwt_config,
    ));
    let order_service = Arc::new(OrderService::new(
        orders.clone(),
        agents.clone(),
        app_cfg.transition_policy,
    ));
    let dispatch = Arc::new(DispatchService::new(
        users.clone(),
        agents.clone(),
        orders.clone(),
    ));
    let analytics = Arc::new(AnalyticsService::new(users, agents, orders));

    // ── REST API server ────────────────────────────────────────
    let router = create_api_router(
        identity,
        order_service,
        dispatch,
        analytics,
        db.clone(),
        prometheus_handle,
    );

    let addr = app_cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("REST API server listening on http://{}", addr);
    info!("Swagger UI available at http://{}/docs/", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    if let Err(e) = db.close().await {
        warn!("Error closing database connection: {}", e);
    } else {
        info!("Database connection closed");
    }

    info!("VoltGo service shutdown complete");
    Ok(())
}

/// Create the bootstrap admin if no users exist yet.
async fn create_default_admin(users: &dyn UserRepositoryInterface, app_cfg: &AppConfig) {
    use voltgo::infrastructure::crypto::password::hash_password;

    let count = match users.count_all().await {
        Ok(count) => count,
        Err(e) => {
            error!("Failed to count users: {}", e.detail());
            return;
        }
    };
    if count > 0 {
        return;
    }

    info!("Creating default admin user...");

    let password_hash = match hash_password(&app_cfg.admin.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to hash admin password: {}", e);
            return;
        }
    };

    match users
        .create(NewUser {
            username: app_cfg.admin.username.clone(),
            password_hash,
            name: app_cfg.admin.name.clone(),
            phone: None,
            email: None,
            role: UserRole::Admin,
        })
        .await
    {
        Ok(admin) => {
            info!("Default admin created: {}", admin.username);
            warn!("Please change the admin password immediately!");
        }
        Err(e) => {
            error!("Failed to create admin user: {}", e.detail());
        }
    }
}
