//! Authentication middleware for Axum
//!
//! `auth_middleware` turns a `Bearer` token into a [`RequestIdentity`]
//! request extension. The token is verified and the account is re-fetched
//! from the store, so a deleted user or changed role takes effect
//! immediately rather than at token expiry.
//!
//! The role gates (`require_admin` and friends) sit behind it and answer
//! 403 with the accepted roles in the message.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::application::IdentityService;
use crate::domain::{DomainError, RequestIdentity, UserRole};

use super::common::error_response;

/// State for `auth_middleware`.
#[derive(Clone)]
pub struct AuthState {
    pub identity: Arc<IdentityService>,
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

fn deny(err: DomainError) -> Response {
    let (status, body) = error_response::<()>(&err);
    (status, body).into_response()
}

/// Requires a valid token; attaches the resolved identity to the request.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(String::from);
    let Some(auth_header) = auth_header else {
        return deny(DomainError::Unauthorized("Access token required".into()));
    };

    let Some(token) = extract_token(&auth_header) else {
        return deny(DomainError::Unauthorized(
            "Invalid authentication token".into(),
        ));
    };

    match state.identity.resolve_token(token).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => deny(err),
    }
}

fn role_gate(request: &Request<Body>, allowed: &[UserRole]) -> Result<(), Response> {
    match request.extensions().get::<RequestIdentity>() {
        Some(identity) => identity.require_any(allowed).map_err(deny),
        None => Err(deny(DomainError::Unauthorized(
            "Authentication required".into(),
        ))),
    }
}

/// Admin-only gate; must run after `auth_middleware`.
pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    match role_gate(&request, &[UserRole::Admin]) {
        Ok(()) => next.run(request).await,
        Err(denied) => denied,
    }
}

/// Agent endpoints; admins pass too.
pub async fn require_agent(request: Request<Body>, next: Next) -> Response {
    match role_gate(&request, &[UserRole::Agent, UserRole::Admin]) {
        Ok(()) => next.run(request).await,
        Err(denied) => denied,
    }
}

/// Customer endpoints; admins pass too.
pub async fn require_user(request: Request<Body>, next: Next) -> Response {
    match role_gate(&request, &[UserRole::User, UserRole::Admin]) {
        Ok(()) => next.run(request).await,
        Err(denied) => denied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_stripped() {
        assert_eq!(extract_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_token("Basic abc"), None);
        assert_eq!(extract_token("abc"), None);
    }
}
