//! Identity service: signup, login, token resolution, user management.
//!
//! All credential and account business logic lives here; HTTP handlers are
//! thin wrappers. Password hashes never leave this layer in responses.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{
    AgentProfile, AgentRepositoryInterface, DomainError, DomainResult, NewAgentProfile, NewUser,
    RequestIdentity, User, UserFilter, UserRepositoryInterface, UserRole,
};
use crate::infrastructure::crypto::jwt::{create_token, verify_token, JwtConfig, TokenError};
use crate::infrastructure::crypto::password::{hash_password, verify_password};

const MIN_PASSWORD_CHARS: usize = 6;

/// Signup input. Role is already a closed enum by the time it gets here;
/// unknown role strings never make it past the DTO boundary.
#[derive(Debug, Clone)]
pub struct SignupInput {
    pub username: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: UserRole,
    /// Agents only: supplying a vehicle number creates the profile.
    pub vehicle_number: Option<String>,
    pub vehicle_type: Option<String>,
}

/// A successful signup/login: the account, its agent profile when one
/// exists, and a fresh token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub agent: Option<AgentProfile>,
    pub token: String,
    pub expires_in: i64,
}

pub struct IdentityService {
    users: Arc<dyn UserRepositoryInterface>,
    agents: Arc<dyn AgentRepositoryInterface>,
    jwt_config: JwtConfig,
}

impl IdentityService {
    pub fn new(
        users: Arc<dyn UserRepositoryInterface>,
        agents: Arc<dyn AgentRepositoryInterface>,
        jwt_config: JwtConfig,
    ) -> Self {
        Self {
            users,
            agents,
            jwt_config,
        }
    }

    fn issue_token(&self, user: &User) -> DomainResult<String> {
        create_token(&user.id, &user.username, user.role, &self.jwt_config)
            .map_err(|e| DomainError::Internal(format!("failed to sign token: {e}")))
    }

    // ── Signup ──────────────────────────────────────────────────

    pub async fn signup(&self, input: SignupInput) -> DomainResult<AuthSession> {
        if input.username.trim().is_empty()
            || input.password.is_empty()
            || input.name.trim().is_empty()
        {
            return Err(DomainError::Validation(
                "Username, password, and name are required".into(),
            ));
        }
        if input.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(DomainError::Validation(
                "Password must be at least 6 characters long".into(),
            ));
        }

        // Friendly pre-check; the unique constraint still catches the race
        if self.users.find_by_username(&input.username).await?.is_some() {
            return Err(DomainError::Conflict("Username already exists".into()));
        }

        let password_hash = hash_password(&input.password)
            .map_err(|e| DomainError::Internal(format!("failed to hash password: {e}")))?;

        let user = self
            .users
            .create(NewUser {
                username: input.username,
                password_hash,
                name: input.name,
                phone: input.phone,
                email: input.email,
                role: input.role,
            })
            .await?;

        // Agent signup optionally creates the profile in a second write.
        // A failure here leaves the bare account in place; the profile can
        // be added later through the admin path.
        let mut agent = None;
        if user.role == UserRole::Agent {
            if let Some(vehicle_number) = input.vehicle_number {
                match self
                    .agents
                    .create(NewAgentProfile {
                        user_id: user.id.clone(),
                        vehicle_number,
                        vehicle_type: input
                            .vehicle_type
                            .unwrap_or_else(|| "motorcycle".to_string()),
                    })
                    .await
                {
                    Ok(profile) => agent = Some(profile),
                    Err(e) => {
                        warn!(user_id = %user.id, error = %e.detail(), "agent profile creation failed after signup");
                    }
                }
            }
        }

        let token = self.issue_token(&user)?;
        metrics::counter!("voltgo_signups_total", "role" => user.role.as_str()).increment(1);
        info!(user_id = %user.id, username = %user.username, role = %user.role, "new account registered");

        Ok(AuthSession {
            user,
            agent,
            token,
            expires_in: self.jwt_config.expiration_hours * 3600,
        })
    }

    // ── Login ───────────────────────────────────────────────────

    /// The same message is returned for an unknown username and a wrong
    /// password, so responses do not leak which one was wrong.
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<AuthSession> {
        if username.is_empty() || password.is_empty() {
            return Err(DomainError::Validation(
                "Username and password are required".into(),
            ));
        }

        let Some(user) = self.users.find_by_username(username).await? else {
            return Err(DomainError::Unauthorized(
                "Invalid username or password".into(),
            ));
        };

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(DomainError::Unauthorized(
                "Invalid username or password".into(),
            ));
        }

        let agent = if user.role == UserRole::Agent {
            self.agents.find_by_user_id(&user.id).await?
        } else {
            None
        };

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, username = %user.username, "login successful");

        Ok(AuthSession {
            user,
            agent,
            token,
            expires_in: self.jwt_config.expiration_hours * 3600,
        })
    }

    // ── Token resolution ────────────────────────────────────────

    /// Verifies a bearer token and resolves the caller against the live
    /// user record, so a deleted account (or any out-of-band change) takes
    /// effect immediately instead of at token expiry.
    pub async fn resolve_token(&self, token: &str) -> DomainResult<RequestIdentity> {
        let claims = verify_token(token, &self.jwt_config).map_err(|e| match e {
            TokenError::Expired => DomainError::Unauthorized("Token has expired".into()),
            TokenError::Malformed => {
                DomainError::Unauthorized("Invalid authentication token".into())
            }
        })?;

        let Some(user) = self.users.find_by_id(&claims.sub).await? else {
            return Err(DomainError::Unauthorized("Token has been revoked".into()));
        };

        Ok(RequestIdentity {
            user_id: user.id,
            username: user.username,
            role: user.role,
        })
    }

    /// Reissues a token with the caller's current identity.
    pub async fn refresh(&self, identity: &RequestIdentity) -> DomainResult<String> {
        let Some(user) = self.users.find_by_id(&identity.user_id).await? else {
            return Err(DomainError::Unauthorized("Token has been revoked".into()));
        };
        self.issue_token(&user)
    }

    /// Current account details plus the agent profile when one exists.
    pub async fn current_user(
        &self,
        identity: &RequestIdentity,
    ) -> DomainResult<(User, Option<AgentProfile>)> {
        let Some(user) = self.users.find_by_id(&identity.user_id).await? else {
            return Err(DomainError::not_found("User", "id", &identity.user_id));
        };

        let agent = if user.role == UserRole::Agent {
            self.agents.find_by_user_id(&user.id).await?
        } else {
            None
        };

        Ok((user, agent))
    }

    // ── Admin user management ───────────────────────────────────

    pub async fn list_users(&self, filter: UserFilter) -> DomainResult<(Vec<User>, u64)> {
        self.users.list(filter).await
    }

    /// Deletes a user. Admin accounts are never deletable; dependent agent
    /// profiles and orders cascade at the store level.
    pub async fn delete_user(&self, id: &str) -> DomainResult<()> {
        let Some(user) = self.users.find_by_id(id).await? else {
            return Err(DomainError::not_found("User", "id", id));
        };

        if user.role == UserRole::Admin {
            return Err(DomainError::forbidden_because(
                "admin accounts cannot be deleted",
            ));
        }

        self.users.delete(id).await?;
        info!(user_id = %id, username = %user.username, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{test_identity_service, TestContext};
    use crate::domain::UserRole;

    fn signup_input(username: &str, role: UserRole) -> SignupInput {
        SignupInput {
            username: username.into(),
            password: "secret1".into(),
            name: "Test Person".into(),
            phone: Some("+1000000".into()),
            email: Some(format!("{username}@example.com")),
            role,
            vehicle_number: None,
            vehicle_type: None,
        }
    }

    #[tokio::test]
    async fn signup_returns_token_with_stored_role() {
        let ctx = TestContext::new().await;
        let service = test_identity_service(&ctx);

        for (i, role) in [UserRole::User, UserRole::Admin, UserRole::Agent]
            .into_iter()
            .enumerate()
        {
            let session = service
                .signup(signup_input(&format!("person{i}"), role))
                .await
                .unwrap();

            assert_eq!(session.user.role, role);
            let identity = service.resolve_token(&session.token).await.unwrap();
            assert_eq!(identity.role, session.user.role);
        }
    }

    #[tokio::test]
    async fn signup_rejects_short_password() {
        let ctx = TestContext::new().await;
        let service = test_identity_service(&ctx);

        let mut input = signup_input("shorty", UserRole::User);
        input.password = "12345".into();

        let err = service.signup(input).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)), "{err:?}");
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_username_without_new_row() {
        let ctx = TestContext::new().await;
        let service = test_identity_service(&ctx);

        service
            .signup(signup_input("alice", UserRole::User))
            .await
            .unwrap();

        let err = service
            .signup(signup_input("alice", UserRole::User))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)), "{err:?}");

        let (_, total) = service.list_users(UserFilter { role: None, limit: 10, offset: 0 }).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn agent_signup_with_vehicle_creates_profile() {
        let ctx = TestContext::new().await;
        let service = test_identity_service(&ctx);

        let mut input = signup_input("rider", UserRole::Agent);
        input.vehicle_number = Some("KA-01-1234".into());

        let session = service.signup(input).await.unwrap();
        let agent = session.agent.expect("profile should exist");
        assert_eq!(agent.user_id, session.user.id);
        assert!(agent.active);
        assert_eq!(agent.vehicle_type, "motorcycle");
    }

    #[tokio::test]
    async fn login_uses_uniform_error_message() {
        let ctx = TestContext::new().await;
        let service = test_identity_service(&ctx);

        service
            .signup(signup_input("bob", UserRole::User))
            .await
            .unwrap();

        let unknown = service.login("nobody", "secret1").await.unwrap_err();
        let wrong = service.login("bob", "wrong-password").await.unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn resolve_token_reflects_deletion() {
        let ctx = TestContext::new().await;
        let service = test_identity_service(&ctx);

        let session = service
            .signup(signup_input("ghost", UserRole::User))
            .await
            .unwrap();

        service.delete_user(&session.user.id).await.unwrap();

        let err = service.resolve_token(&session.token).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)), "{err:?}");
    }

    #[tokio::test]
    async fn delete_user_refuses_admins() {
        let ctx = TestContext::new().await;
        let service = test_identity_service(&ctx);

        let session = service
            .signup(signup_input("root", UserRole::Admin))
            .await
            .unwrap();

        let err = service.delete_user(&session.user.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }), "{err:?}");

        // The row is still there
        let (_, total) = service.list_users(UserFilter { role: Some(UserRole::Admin), limit: 10, offset: 0 }).await.unwrap();
        assert_eq!(total, 1);
    }
}
