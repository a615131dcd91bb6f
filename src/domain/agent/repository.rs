use async_trait::async_trait;

use super::AgentProfile;
use crate::domain::DomainResult;

/// Fields for a new agent profile row.
#[derive(Debug, Clone)]
pub struct NewAgentProfile {
    pub user_id: String,
    pub vehicle_number: String,
    pub vehicle_type: String,
}

#[async_trait]
pub trait AgentRepositoryInterface: Send + Sync {
    /// Creates the profile with `active = true` and no position yet.
    async fn create(&self, profile: NewAgentProfile) -> DomainResult<AgentProfile>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<AgentProfile>>;
    async fn find_by_user_id(&self, user_id: &str) -> DomainResult<Option<AgentProfile>>;

    /// Newest-first, optionally filtered by the active flag.
    async fn list(&self, active: Option<bool>) -> DomainResult<Vec<AgentProfile>>;

    async fn count(&self, active: Option<bool>) -> DomainResult<u64>;

    /// Unconditional position overwrite, keyed by the owning user.
    /// Returns `None` when the user has no agent profile.
    async fn update_location(
        &self,
        user_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> DomainResult<Option<AgentProfile>>;

    /// Toggles the active flag, keyed by the owning user.
    async fn set_active(&self, user_id: &str, active: bool) -> DomainResult<Option<AgentProfile>>;
}
