//! Order API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    CreateOrderRequest, OrderDto, OrderViewDto, OrdersListResponse, UpdateStatusRequest,
};
use crate::application::{CreateOrderInput, OrderService};
use crate::domain::{DomainError, OrderStatus, RequestIdentity};
use crate::interfaces::http::common::{error_response, ApiResponse, ValidatedJson};

/// Order handler state
#[derive(Clone)]
pub struct OrderHandlerState {
    pub orders: Arc<OrderService>,
}

type HandlerResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<T>>)>;

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "Orders",
    security(("bearer_auth" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<OrderDto>),
        (status = 400, description = "Missing location details"),
        (status = 403, description = "Role not allowed to create orders")
    )
)]
pub async fn create_order(
    State(state): State<OrderHandlerState>,
    Extension(identity): Extension<RequestIdentity>,
    ValidatedJson(request): ValidatedJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderDto>>), (StatusCode, Json<ApiResponse<OrderDto>>)> {
    let order = state
        .orders
        .create_order(
            &identity,
            CreateOrderInput {
                current_location: request.current_location,
                latitude: request.latitude,
                longitude: request.longitude,
                battery_type: request.battery_type,
                vehicle_model: request.vehicle_model,
                charge_level: request.charge_level,
                amount: request.amount,
            },
        )
        .await
        .map_err(|e| error_response(&e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(OrderDto::from(order))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order details", body = ApiResponse<OrderViewDto>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "No such order")
    )
)]
pub async fn get_order(
    State(state): State<OrderHandlerState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
) -> HandlerResult<OrderViewDto> {
    let view = state
        .orders
        .get_order(&identity, &id)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(ApiResponse::success(OrderViewDto::from(view))))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/user/{user_id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "Owning user ID")),
    responses(
        (status = 200, description = "The user's orders, newest first", body = ApiResponse<OrdersListResponse>),
        (status = 403, description = "Not self and not admin")
    )
)]
pub async fn list_orders_for_user(
    State(state): State<OrderHandlerState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(user_id): Path<String>,
) -> HandlerResult<OrdersListResponse> {
    let views = state
        .orders
        .list_orders_for_user(&identity, &user_id)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(ApiResponse::success(OrdersListResponse {
        count: views.len() as u64,
        orders: views.into_iter().map(OrderViewDto::from).collect(),
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Order ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<OrderDto>),
        (status = 400, description = "Unknown status or transition not permitted"),
        (status = 403, description = "Not admin and not the assigned agent"),
        (status = 404, description = "No such order")
    )
)]
pub async fn update_status(
    State(state): State<OrderHandlerState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> HandlerResult<OrderDto> {
    let Some(new_status) = OrderStatus::parse(&request.status) else {
        return Err(error_response(&DomainError::Validation(
            "Invalid status. Must be one of: pending, assigned, en_route, delivered, cancelled"
                .into(),
        )));
    };

    let order = state
        .orders
        .set_status(&identity, &id, new_status)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(ApiResponse::success(OrderDto::from(order))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order cancelled (soft delete)", body = ApiResponse<OrderDto>),
        (status = 400, description = "Delivered orders cannot be cancelled"),
        (status = 403, description = "Not the owner and not admin"),
        (status = 404, description = "No such order")
    )
)]
pub async fn cancel_order(
    State(state): State<OrderHandlerState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
) -> HandlerResult<OrderDto> {
    let order = state
        .orders
        .cancel_order(&identity, &id)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(ApiResponse::success(OrderDto::from(order))))
}
