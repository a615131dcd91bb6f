use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

/// Closed role set. Authorization everywhere matches on this enum rather
/// than comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
    Agent,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Agent => "agent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            "agent" => Some(Self::Agent),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User account record.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// The resolved identity of the caller of a request, attached by the auth
/// middleware after token verification and a live user lookup.
#[derive(Debug, Clone)]
pub struct RequestIdentity {
    pub user_id: String,
    pub username: String,
    pub role: UserRole,
}

impl RequestIdentity {
    /// Role gate: `(identity, allowed roles) -> allow | deny`.
    ///
    /// The denial carries the acceptable roles so the HTTP layer can echo
    /// them back to the client.
    pub fn require_any(&self, allowed: &[UserRole]) -> DomainResult<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(DomainError::forbidden(allowed))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: UserRole) -> RequestIdentity {
        RequestIdentity {
            user_id: "u-1".into(),
            username: "tester".into(),
            role,
        }
    }

    #[test]
    fn role_round_trips_through_strings() {
        for role in [UserRole::User, UserRole::Admin, UserRole::Agent] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("superuser"), None);
    }

    #[test]
    fn require_any_allows_member_roles() {
        assert!(identity(UserRole::Admin)
            .require_any(&[UserRole::Admin, UserRole::Agent])
            .is_ok());
        assert!(identity(UserRole::Agent)
            .require_any(&[UserRole::Admin, UserRole::Agent])
            .is_ok());
    }

    #[test]
    fn require_any_denies_with_accepted_roles() {
        let err = identity(UserRole::User)
            .require_any(&[UserRole::Admin])
            .unwrap_err();
        match err {
            DomainError::Forbidden { allowed, .. } => assert_eq!(allowed, vec![UserRole::Admin]),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
