use thiserror::Error;

use super::user::UserRole;

pub type DomainResult<T> = Result<T, DomainError>;

/// Error taxonomy shared by all services.
///
/// The HTTP layer maps each variant to a status code in one place
/// (`interfaces::http::common::error_response`). `Internal` carries the
/// underlying detail for server-side logging only; its `Display` output is
/// the generic message shown to callers.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Access denied: {reason}")]
    Forbidden {
        reason: String,
        /// Roles that would have been accepted, echoed to the client for
        /// diagnostics. Empty when the denial is not role-based.
        allowed: Vec<UserRole>,
    },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Internal server error")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.into(),
        }
    }

    pub fn forbidden(allowed: &[UserRole]) -> Self {
        Self::Forbidden {
            reason: format!(
                "this action requires one of the following roles: {}",
                fmt_roles(allowed)
            ),
            allowed: allowed.to_vec(),
        }
    }

    pub fn forbidden_because(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
            allowed: Vec::new(),
        }
    }

    /// Server-side detail for logging. For most variants this is the
    /// user-facing message; for `Internal` it is the wrapped cause.
    pub fn detail(&self) -> String {
        match self {
            Self::Internal(detail) => detail.clone(),
            other => other.to_string(),
        }
    }
}

fn fmt_roles(roles: &[UserRole]) -> String {
    roles
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_lists_accepted_roles() {
        let err = DomainError::forbidden(&[UserRole::Admin, UserRole::Agent]);
        assert_eq!(
            err.to_string(),
            "Access denied: this action requires one of the following roles: admin, agent"
        );
    }

    #[test]
    fn internal_hides_detail_from_display() {
        let err = DomainError::Internal("connection refused".into());
        assert_eq!(err.to_string(), "Internal server error");
        assert_eq!(err.detail(), "connection refused");
    }
}
