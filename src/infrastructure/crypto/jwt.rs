//! JWT token handling

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::UserRole;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "super-secret-key-change-in-production".to_string()),
            expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
            issuer: "voltgo-service".to_string(),
        }
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Token claims: user id, username and role, plus the standard timestamps.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    pub role: UserRole,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
}

impl TokenClaims {
    fn new(user_id: &str, username: &str, role: UserRole, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: user_id.to_string(),
            username: username.to_string(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Why token verification failed. Expired tokens are reported separately so
/// clients can distinguish "log in again" from "this token is garbage".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Malformed,
}

/// Create a signed token for a user.
pub fn create_token(
    user_id: &str,
    username: &str,
    role: UserRole,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = TokenClaims::new(user_id, username, role, config);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature, expiry and issuer; decode the claims.
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    match decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            ErrorKind::ExpiredSignature => Err(TokenError::Expired),
            _ => Err(TokenError::Malformed),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            expiration_hours: 24,
            issuer: "voltgo-service".into(),
        }
    }

    #[test]
    fn create_and_verify_token() {
        let config = config();
        let token = create_token("user-123", "testuser", UserRole::Agent, &config).unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.username, "testuser");
        assert_eq!(claims.role, UserRole::Agent);
        assert!(!claims.is_expired());
    }

    #[test]
    fn garbage_token_is_malformed() {
        let result = verify_token("not-a-token", &config());
        assert_eq!(result.unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn tampered_secret_is_rejected() {
        let token = create_token("user-123", "testuser", UserRole::User, &config()).unwrap();

        let other = JwtConfig {
            secret: "different-secret".into(),
            ..config()
        };
        assert_eq!(verify_token(&token, &other).unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let expired = JwtConfig {
            expiration_hours: -1,
            ..config()
        };
        let token = create_token("user-123", "testuser", UserRole::User, &expired).unwrap();

        assert_eq!(verify_token(&token, &config()).unwrap_err(), TokenError::Expired);
    }
}
