//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};

use super::dto::{LoginRequest, MeResponse, SessionResponse, SignupRequest, TokenResponse, UserDto};
use crate::application::{IdentityService, SignupInput};
use crate::domain::{DomainError, RequestIdentity, UserRole};
use crate::interfaces::http::common::{error_response, ApiResponse, ValidatedJson};
use crate::interfaces::http::modules::agents::dto::AgentProfileDto;

/// Auth handler state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub identity: Arc<IdentityService>,
}

type HandlerResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<T>>)>;

#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "Authentication",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<SessionResponse>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn signup(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SessionResponse>>), (StatusCode, Json<ApiResponse<SessionResponse>>)>
{
    let role = match request.role.as_deref() {
        None => UserRole::User,
        Some(raw) => UserRole::parse(raw).ok_or_else(|| {
            error_response(&DomainError::Validation(
                "Invalid role. Must be: user, admin, or agent".into(),
            ))
        })?,
    };

    let session = state
        .identity
        .signup(SignupInput {
            username: request.username,
            password: request.password,
            name: request.name,
            phone: request.phone,
            email: request.email,
            role,
            vehicle_number: request.vehicle_number,
            vehicle_type: request.vehicle_type,
        })
        .await
        .map_err(|e| error_response(&e))?;

    let response = SessionResponse {
        token: session.token,
        token_type: "Bearer".to_string(),
        expires_in: session.expires_in,
        user: UserDto::from(session.user),
        agent: session.agent.map(AgentProfileDto::from),
    };

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<SessionResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> HandlerResult<SessionResponse> {
    let session = state
        .identity
        .login(&request.username, &request.password)
        .await
        .map_err(|e| error_response(&e))?;

    let response = SessionResponse {
        token: session.token,
        token_type: "Bearer".to_string(),
        expires_in: session.expires_in,
        user: UserDto::from(session.user),
        agent: session.agent.map(AgentProfileDto::from),
    };

    Ok(Json(ApiResponse::success(response)))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = ApiResponse<MeResponse>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn current_user(
    State(state): State<AuthHandlerState>,
    Extension(identity): Extension<RequestIdentity>,
) -> HandlerResult<MeResponse> {
    let (user, agent) = state
        .identity
        .current_user(&identity)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(ApiResponse::success(MeResponse {
        user: UserDto::from(user),
        agent: agent.map(AgentProfileDto::from),
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Fresh token, same payload", body = ApiResponse<TokenResponse>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn refresh(
    State(state): State<AuthHandlerState>,
    Extension(identity): Extension<RequestIdentity>,
) -> HandlerResult<TokenResponse> {
    let token = state
        .identity
        .refresh(&identity)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(ApiResponse::success(TokenResponse {
        token,
        token_type: "Bearer".to_string(),
    })))
}
