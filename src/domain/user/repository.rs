use async_trait::async_trait;

use super::{User, UserRole};
use crate::domain::DomainResult;

/// Fields for a new user row. The password is already hashed by the caller;
/// plaintext never reaches the persistence layer.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: UserRole,
}

/// Listing filter for the admin user directory.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub limit: u64,
    pub offset: u64,
}

#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    async fn create(&self, new_user: NewUser) -> DomainResult<User>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;

    /// Newest-first page of users plus the total matching count.
    async fn list(&self, filter: UserFilter) -> DomainResult<(Vec<User>, u64)>;

    async fn count_by_role(&self, role: UserRole) -> DomainResult<u64>;
    async fn count_all(&self) -> DomainResult<u64>;

    /// Hard delete. Dependent agent profiles and orders cascade at the
    /// store level.
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
