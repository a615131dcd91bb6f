//! Business logic: use-case services orchestrating over repository traits.

pub mod analytics;
pub mod dispatch;
pub mod identity;
pub mod orders;

pub use analytics::{AnalyticsService, Dashboard};
pub use dispatch::{CreateAgentInput, DispatchService};
pub use identity::{AuthSession, IdentityService, SignupInput};
pub use orders::{CreateOrderInput, OrderService};

/// Shared fixtures for service-level tests: an in-memory SQLite database
/// with the real migrations applied, plus seeded accounts.
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use sea_orm::{ConnectOptions, Database, DatabaseConnection};
    use sea_orm_migration::MigratorTrait;

    use super::{AnalyticsService, DispatchService, IdentityService, OrderService};
    use crate::domain::{
        AgentProfile, AgentRepositoryInterface, NewAgentProfile, NewUser,
        OrderRepositoryInterface, RequestIdentity, TransitionPolicy, UserRepositoryInterface,
        UserRole,
    };
    use crate::infrastructure::crypto::jwt::JwtConfig;
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::repositories::{
        AgentRepository, OrderRepository, UserRepository,
    };

    pub struct TestContext {
        pub db: DatabaseConnection,
        pub users: Arc<dyn UserRepositoryInterface>,
        pub agents: Arc<dyn AgentRepositoryInterface>,
        pub orders: Arc<dyn OrderRepositoryInterface>,
    }

    impl TestContext {
        pub async fn new() -> Self {
            // A single pooled connection keeps every query on the same
            // in-memory database.
            let mut options = ConnectOptions::new("sqlite::memory:");
            options.max_connections(1);

            let db = Database::connect(options)
                .await
                .expect("connect to in-memory sqlite");
            Migrator::up(&db, None).await.expect("apply migrations");

            Self {
                users: Arc::new(UserRepository::new(db.clone())),
                agents: Arc::new(AgentRepository::new(db.clone())),
                orders: Arc::new(OrderRepository::new(db.clone())),
                db,
            }
        }
    }

    pub fn test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            expiration_hours: 24,
            issuer: "voltgo-service".into(),
        }
    }

    pub fn test_identity_service(ctx: &TestContext) -> IdentityService {
        IdentityService::new(ctx.users.clone(), ctx.agents.clone(), test_jwt_config())
    }

    pub fn test_order_service(ctx: &TestContext, policy: TransitionPolicy) -> OrderService {
        OrderService::new(ctx.orders.clone(), ctx.agents.clone(), policy)
    }

    pub fn test_dispatch_service(ctx: &TestContext) -> DispatchService {
        DispatchService::new(ctx.users.clone(), ctx.agents.clone(), ctx.orders.clone())
    }

    pub fn test_analytics_service(ctx: &TestContext) -> AnalyticsService {
        AnalyticsService::new(ctx.users.clone(), ctx.agents.clone(), ctx.orders.clone())
    }

    pub async fn seed_user(ctx: &TestContext, username: &str, role: UserRole) -> RequestIdentity {
        let user = ctx
            .users
            .create(NewUser {
                username: username.to_string(),
                // Login is not exercised through seeded accounts
                password_hash: "seeded-hash".to_string(),
                name: format!("{username} Example"),
                phone: None,
                email: Some(format!("{username}@example.com")),
                role,
            })
            .await
            .expect("seed user");

        RequestIdentity {
            user_id: user.id,
            username: user.username,
            role: user.role,
        }
    }

    pub async fn admin_identity(ctx: &TestContext) -> RequestIdentity {
        seed_user(ctx, "admin", UserRole::Admin).await
    }

    pub async fn seed_agent(ctx: &TestContext, name: &str) -> (RequestIdentity, AgentProfile) {
        let identity = seed_user(ctx, name, UserRole::Agent).await;
        let profile = ctx
            .agents
            .create(NewAgentProfile {
                user_id: identity.user_id.clone(),
                vehicle_number: format!("VH-{name}"),
                vehicle_type: "motorcycle".to_string(),
            })
            .await
            .expect("seed agent profile");

        (identity, profile)
    }
}
