//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{AnalyticsService, DispatchService, IdentityService, OrderService};
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::middleware::{
    auth_middleware, require_admin, require_agent, require_user, AuthState,
};
use crate::interfaces::http::modules::{admin, agents, auth, health, metrics, orders};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::handlers::health_check,
        // Auth
        auth::handlers::signup,
        auth::handlers::login,
        auth::handlers::current_user,
        auth::handlers::refresh,
        // Orders
        orders::handlers::create_order,
        orders::handlers::get_order,
        orders::handlers::list_orders_for_user,
        orders::handlers::update_status,
        orders::handlers::cancel_order,
        // Agents
        agents::handlers::list_agents,
        agents::handlers::create_agent,
        agents::handlers::my_orders,
        agents::handlers::update_location,
        agents::handlers::set_active,
        agents::handlers::agent_stats,
        // Admin
        admin::handlers::list_orders,
        admin::handlers::assign_agent,
        admin::handlers::analytics,
        admin::handlers::list_users,
        admin::handlers::delete_user,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            // Auth
            auth::dto::SignupRequest,
            auth::dto::LoginRequest,
            auth::dto::SessionResponse,
            auth::dto::MeResponse,
            auth::dto::TokenResponse,
            auth::dto::UserDto,
            // Orders
            orders::dto::CreateOrderRequest,
            orders::dto::UpdateStatusRequest,
            orders::dto::OrderDto,
            orders::dto::OrderViewDto,
            orders::dto::OrdersListResponse,
            orders::dto::PartyBriefDto,
            orders::dto::OrderAgentDto,
            // Agents
            agents::dto::AgentProfileDto,
            agents::dto::AgentOperatorDto,
            agents::dto::AgentWorkloadDto,
            agents::dto::AgentListEntryDto,
            agents::dto::AgentListResponse,
            agents::dto::CreateAgentRequest,
            agents::dto::CreatedAgentDto,
            agents::dto::UpdateLocationRequest,
            agents::dto::SetActiveRequest,
            agents::dto::AgentStatsDto,
            // Admin
            admin::dto::AssignAgentRequest,
            admin::dto::UsersListResponse,
            admin::dto::AnalyticsDto,
            // Health
            health::handlers::HealthResponse,
            health::handlers::ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Authentication", description = "Signup, login (JWT), token refresh, identity resolution"),
        (name = "Orders", description = "Order placement and lifecycle management"),
        (name = "Agents", description = "Delivery agent directory and self-service"),
        (name = "Admin", description = "Back-office: assignment, analytics, user management"),
    ),
    info(
        title = "VoltGo API",
        version = "1.0.0",
        description = "REST API for on-demand EV battery charging delivery",
        license(name = "MIT"),
        contact(name = "VoltGo", email = "support@voltgo.app")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(
    identity: Arc<IdentityService>,
    order_service: Arc<OrderService>,
    dispatch: Arc<DispatchService>,
    analytics: Arc<AnalyticsService>,
    db: DatabaseConnection,
    prometheus_handle: PrometheusHandle,
) -> Router {
    let auth_state = AuthState {
        identity: identity.clone(),
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ── Auth ────────────────────────────────────────────────────

    let auth_handler_state = auth::AuthHandlerState {
        identity: identity.clone(),
    };

    let auth_public_routes = Router::new()
        .route("/signup", post(auth::handlers::signup))
        .route("/login", post(auth::handlers::login))
        .with_state(auth_handler_state.clone());

    let auth_protected_routes = Router::new()
        .route("/me", get(auth::handlers::current_user))
        .route("/refresh", post(auth::handlers::refresh))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(auth_handler_state);

    // ── Orders ──────────────────────────────────────────────────

    let order_state = orders::OrderHandlerState {
        orders: order_service.clone(),
    };

    // Creation is customer-facing; admins pass the gate too
    let order_create_routes = Router::new()
        .route("/", post(orders::handlers::create_order))
        .layer(middleware::from_fn(require_user))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(order_state.clone());

    // Instance-level ownership rules live in the service layer
    let order_routes = Router::new()
        .route("/{id}", get(orders::handlers::get_order).delete(orders::handlers::cancel_order))
        .route("/user/{user_id}", get(orders::handlers::list_orders_for_user))
        .route("/{id}/status", put(orders::handlers::update_status))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(order_state);

    // ── Agents ──────────────────────────────────────────────────

    let agent_state = agents::AgentHandlerState {
        dispatch: dispatch.clone(),
    };

    let agent_directory_routes = Router::new()
        .route("/", get(agents::handlers::list_agents))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(agent_state.clone());

    let agent_admin_routes = Router::new()
        .route("/create", post(agents::handlers::create_agent))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(agent_state.clone());

    let agent_self_routes = Router::new()
        .route("/my-orders", get(agents::handlers::my_orders))
        .route("/location", put(agents::handlers::update_location))
        .route("/status", put(agents::handlers::set_active))
        .route("/stats", get(agents::handlers::agent_stats))
        .layer(middleware::from_fn(require_agent))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(agent_state);

    // ── Admin ───────────────────────────────────────────────────

    let admin_state = admin::AdminHandlerState {
        identity,
        orders: order_service,
        dispatch,
        analytics,
    };

    let admin_routes = Router::new()
        .route("/orders", get(admin::handlers::list_orders))
        .route("/orders/{id}/assign", put(admin::handlers::assign_agent))
        .route("/analytics", get(admin::handlers::analytics))
        .route("/users", get(admin::handlers::list_users))
        .route("/users/{id}", delete(admin::handlers::delete_user))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(admin_state);

    // ── Ambient endpoints ───────────────────────────────────────

    let health_state = health::HealthState {
        db,
        started_at: Arc::new(Instant::now()),
    };

    let metrics_state = metrics::MetricsState {
        handle: prometheus_handle,
    };

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    // Build router
    Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::handlers::health_check).with_state(health_state))
        .route(
            "/metrics",
            get(metrics::handlers::prometheus_metrics).with_state(metrics_state),
        )
        .nest("/api/v1/auth", auth_public_routes)
        .nest("/api/v1/auth", auth_protected_routes)
        .nest("/api/v1/orders", order_create_routes)
        .nest("/api/v1/orders", order_routes)
        .nest("/api/v1/agents", agent_directory_routes)
        .nest("/api/v1/agents", agent_admin_routes)
        .nest("/api/v1/agents", agent_self_routes)
        .nest("/api/v1/admin", admin_routes)
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
