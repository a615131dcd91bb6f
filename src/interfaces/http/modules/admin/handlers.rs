//! Admin back-office API handlers
//!
//! The whole module is nested behind `auth_middleware` + `require_admin`;
//! handlers only deal with the instance-level rules (e.g. admins stay
//! undeletable even for other admins).

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    AdminOrdersParams, AdminUsersParams, AnalyticsDto, AssignAgentRequest, UsersListResponse,
};
use crate::application::{AnalyticsService, DispatchService, IdentityService, OrderService};
use crate::domain::{DomainError, OrderFilter, OrderStatus, UserFilter, UserRole};
use crate::interfaces::http::common::{error_response, ApiResponse, ValidatedJson};
use crate::interfaces::http::modules::auth::dto::UserDto;
use crate::interfaces::http::modules::orders::dto::{OrderViewDto, OrdersListResponse};

/// Admin handler state
#[derive(Clone)]
pub struct AdminHandlerState {
    pub identity: Arc<IdentityService>,
    pub orders: Arc<OrderService>,
    pub dispatch: Arc<DispatchService>,
    pub analytics: Arc<AnalyticsService>,
}

type HandlerResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<T>>)>;

fn parse_status<T>(
    raw: Option<&str>,
) -> Result<Option<OrderStatus>, (StatusCode, Json<ApiResponse<T>>)> {
    match raw {
        None => Ok(None),
        Some(raw) => OrderStatus::parse(raw).map(Some).ok_or_else(|| {
            error_response(&DomainError::Validation(
                "Invalid status. Must be one of: pending, assigned, en_route, delivered, cancelled"
                    .into(),
            ))
        }),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/orders",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(AdminOrdersParams),
    responses(
        (status = 200, description = "Filtered order page", body = ApiResponse<OrdersListResponse>),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_orders(
    State(state): State<AdminHandlerState>,
    Query(params): Query<AdminOrdersParams>,
) -> HandlerResult<OrdersListResponse> {
    let status = parse_status(params.status.as_deref())?;

    let (views, total) = state
        .orders
        .list_orders(OrderFilter {
            status,
            user_id: params.user_id,
            agent_id: params.agent_id,
            limit: params.limit.clamp(1, 500),
            offset: params.offset,
        })
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(ApiResponse::success(OrdersListResponse {
        count: total,
        orders: views.into_iter().map(OrderViewDto::from).collect(),
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/orders/{id}/assign",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Order ID")),
    request_body = AssignAgentRequest,
    responses(
        (status = 200, description = "Agent assigned", body = ApiResponse<OrderViewDto>),
        (status = 400, description = "Agent is not active"),
        (status = 404, description = "No such order or agent")
    )
)]
pub async fn assign_agent(
    State(state): State<AdminHandlerState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<AssignAgentRequest>,
) -> HandlerResult<OrderViewDto> {
    let view = state
        .dispatch
        .assign_agent(&id, &request.agent_id)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(ApiResponse::success(OrderViewDto::from(view))))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/analytics",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard rollups, computed fresh", body = ApiResponse<AnalyticsDto>),
        (status = 403, description = "Admins only")
    )
)]
pub async fn analytics(State(state): State<AdminHandlerState>) -> HandlerResult<AnalyticsDto> {
    let dashboard = state
        .analytics
        .dashboard()
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(ApiResponse::success(AnalyticsDto::from(dashboard))))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(AdminUsersParams),
    responses(
        (status = 200, description = "User directory page", body = ApiResponse<UsersListResponse>),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_users(
    State(state): State<AdminHandlerState>,
    Query(params): Query<AdminUsersParams>,
) -> HandlerResult<UsersListResponse> {
    let role = match params.role.as_deref() {
        None => None,
        Some(raw) => Some(UserRole::parse(raw).ok_or_else(|| {
            error_response(&DomainError::Validation(
                "Invalid role. Must be: user, admin, or agent".into(),
            ))
        })?),
    };

    let (users, total) = state
        .identity
        .list_users(UserFilter {
            role,
            limit: params.limit.clamp(1, 500),
            offset: params.offset,
        })
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(ApiResponse::success(UsersListResponse {
        count: total,
        users: users.into_iter().map(UserDto::from).collect(),
    })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted; dependent records cascade"),
        (status = 403, description = "Admin accounts cannot be deleted"),
        (status = 404, description = "No such user")
    )
)]
pub async fn delete_user(
    State(state): State<AdminHandlerState>,
    Path(id): Path<String>,
) -> HandlerResult<()> {
    state
        .identity
        .delete_user(&id)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(ApiResponse::success(())))
}
