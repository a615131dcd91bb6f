//! Common HTTP plumbing: the response envelope and the error mapping.

pub mod validated_json;

pub use validated_json::ValidatedJson;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DomainError;

/// Standard response envelope.
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "error": "reason"}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    /// Payload; `null` on error
    pub data: Option<T>,
    /// Error description; omitted on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Maps the error taxonomy onto HTTP statuses in one place.
///
/// `Internal` logs its detail server-side and sends only the generic
/// message; everything else is safe to echo.
pub fn error_response<T>(err: &DomainError) -> (StatusCode, Json<ApiResponse<T>>) {
    let status = match err {
        DomainError::Validation(_) | DomainError::InvalidState(_) => StatusCode::BAD_REQUEST,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden { .. } => StatusCode::FORBIDDEN,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Internal(_) => {
            tracing::error!(detail = %err.detail(), "request failed with internal error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, Json(ApiResponse::error(err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        let cases = [
            (DomainError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::InvalidState("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (
                DomainError::forbidden_because("x"),
                StatusCode::FORBIDDEN,
            ),
            (
                DomainError::not_found("Order", "id", "o-1"),
                StatusCode::NOT_FOUND,
            ),
            (DomainError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                DomainError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let (status, _) = error_response::<()>(&err);
            assert_eq!(status, expected, "{err:?}");
        }
    }

    #[test]
    fn internal_error_body_is_generic() {
        let (_, Json(body)) = error_response::<()>(&DomainError::Internal("secret detail".into()));
        assert_eq!(body.error.as_deref(), Some("Internal server error"));
    }
}
