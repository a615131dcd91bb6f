//! Delivery agent API handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    AgentListEntryDto, AgentListParams, AgentListResponse, AgentOperatorDto, AgentProfileDto,
    AgentStatsDto, AgentWorkloadDto, CreateAgentRequest, CreatedAgentDto, MyOrdersParams,
    SetActiveRequest, UpdateLocationRequest,
};
use crate::application::{CreateAgentInput, DispatchService};
use crate::domain::{DomainError, OrderStatus, RequestIdentity};
use crate::interfaces::http::common::{error_response, ApiResponse, ValidatedJson};
use crate::interfaces::http::modules::orders::dto::{OrderViewDto, OrdersListResponse};

/// Agent handler state
#[derive(Clone)]
pub struct AgentHandlerState {
    pub dispatch: Arc<DispatchService>,
}

type HandlerResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<T>>)>;

#[utoipa::path(
    get,
    path = "/api/v1/agents",
    tag = "Agents",
    security(("bearer_auth" = [])),
    params(AgentListParams),
    responses(
        (status = 200, description = "Agent directory with workload snapshots", body = ApiResponse<AgentListResponse>)
    )
)]
pub async fn list_agents(
    State(state): State<AgentHandlerState>,
    Query(params): Query<AgentListParams>,
) -> HandlerResult<AgentListResponse> {
    let listed = state
        .dispatch
        .list_agents(params.active)
        .await
        .map_err(|e| error_response(&e))?;

    let mut agents = Vec::with_capacity(listed.len());
    for (profile, workload) in listed {
        let user = state
            .dispatch
            .agent_operator(&profile)
            .await
            .map_err(|e| error_response(&e))?;

        agents.push(AgentListEntryDto {
            profile: AgentProfileDto::from(profile),
            user: user.map(AgentOperatorDto::from),
            stats: AgentWorkloadDto::from(workload),
        });
    }

    Ok(Json(ApiResponse::success(AgentListResponse {
        count: agents.len(),
        agents,
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/agents/create",
    tag = "Agents",
    security(("bearer_auth" = [])),
    request_body = CreateAgentRequest,
    responses(
        (status = 201, description = "Agent account and profile created", body = ApiResponse<CreatedAgentDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admins only"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn create_agent(
    State(state): State<AgentHandlerState>,
    ValidatedJson(request): ValidatedJson<CreateAgentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedAgentDto>>), (StatusCode, Json<ApiResponse<CreatedAgentDto>>)>
{
    let (profile, user) = state
        .dispatch
        .create_agent(CreateAgentInput {
            username: request.username,
            password: request.password,
            name: request.name,
            phone: request.phone,
            email: request.email,
            vehicle_number: request.vehicle_number,
            vehicle_type: request.vehicle_type,
        })
        .await
        .map_err(|e| error_response(&e))?;

    let response = CreatedAgentDto {
        profile: AgentProfileDto::from(profile),
        user: AgentOperatorDto::from(user),
    };

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

#[utoipa::path(
    get,
    path = "/api/v1/agents/my-orders",
    tag = "Agents",
    security(("bearer_auth" = [])),
    params(MyOrdersParams),
    responses(
        (status = 200, description = "Orders assigned to the caller", body = ApiResponse<OrdersListResponse>),
        (status = 404, description = "Caller has no agent profile")
    )
)]
pub async fn my_orders(
    State(state): State<AgentHandlerState>,
    Extension(identity): Extension<RequestIdentity>,
    Query(params): Query<MyOrdersParams>,
) -> HandlerResult<OrdersListResponse> {
    let status = match params.status.as_deref() {
        None => None,
        Some(raw) => Some(OrderStatus::parse(raw).ok_or_else(|| {
            error_response(&DomainError::Validation(
                "Invalid status. Must be one of: pending, assigned, en_route, delivered, cancelled"
                    .into(),
            ))
        })?),
    };

    let views = state
        .dispatch
        .my_orders(&identity.user_id, status)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(ApiResponse::success(OrdersListResponse {
        count: views.len() as u64,
        orders: views.into_iter().map(OrderViewDto::from).collect(),
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/agents/location",
    tag = "Agents",
    security(("bearer_auth" = [])),
    request_body = UpdateLocationRequest,
    responses(
        (status = 200, description = "Position overwritten", body = ApiResponse<AgentProfileDto>),
        (status = 404, description = "Caller has no agent profile")
    )
)]
pub async fn update_location(
    State(state): State<AgentHandlerState>,
    Extension(identity): Extension<RequestIdentity>,
    ValidatedJson(request): ValidatedJson<UpdateLocationRequest>,
) -> HandlerResult<AgentProfileDto> {
    let profile = state
        .dispatch
        .update_location(&identity.user_id, request.latitude, request.longitude)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(ApiResponse::success(AgentProfileDto::from(profile))))
}

#[utoipa::path(
    put,
    path = "/api/v1/agents/status",
    tag = "Agents",
    security(("bearer_auth" = [])),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Availability toggled", body = ApiResponse<AgentProfileDto>),
        (status = 400, description = "`active` must be a boolean"),
        (status = 404, description = "Caller has no agent profile")
    )
)]
pub async fn set_active(
    State(state): State<AgentHandlerState>,
    Extension(identity): Extension<RequestIdentity>,
    Json(request): Json<SetActiveRequest>,
) -> HandlerResult<AgentProfileDto> {
    let profile = state
        .dispatch
        .set_active(&identity.user_id, request.active)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(ApiResponse::success(AgentProfileDto::from(profile))))
}

#[utoipa::path(
    get,
    path = "/api/v1/agents/stats",
    tag = "Agents",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's totals and earnings", body = ApiResponse<AgentStatsDto>),
        (status = 404, description = "Caller has no agent profile")
    )
)]
pub async fn agent_stats(
    State(state): State<AgentHandlerState>,
    Extension(identity): Extension<RequestIdentity>,
) -> HandlerResult<AgentStatsDto> {
    let stats = state
        .dispatch
        .agent_stats(&identity.user_id)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(ApiResponse::success(AgentStatsDto::from(stats))))
}
