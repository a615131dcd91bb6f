use async_trait::async_trait;

use super::{Order, OrderStatus, OrderView};
use crate::domain::DomainResult;

/// Fields for a new order row. Status and payment status always start at
/// `pending`; the repository stamps id and creation time.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: String,
    pub current_location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub battery_type: String,
    pub vehicle_model: Option<String>,
    pub charge_level: String,
    pub amount: f64,
}

/// Admin listing filter.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub user_id: Option<String>,
    pub agent_id: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

#[async_trait]
pub trait OrderRepositoryInterface: Send + Sync {
    async fn create(&self, order: NewOrder) -> DomainResult<Order>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Order>>;

    /// Order joined with owner and assigned-agent display data.
    async fn find_view(&self, id: &str) -> DomainResult<Option<OrderView>>;

    /// A user's orders, newest first, with agent display data joined.
    async fn list_for_user(&self, user_id: &str) -> DomainResult<Vec<OrderView>>;

    /// Orders assigned to one agent, newest first, with the owner joined.
    async fn list_for_agent(
        &self,
        agent_id: &str,
        status: Option<OrderStatus>,
    ) -> DomainResult<Vec<OrderView>>;

    /// Filtered page plus the total matching count (admin listing).
    async fn list(&self, filter: OrderFilter) -> DomainResult<(Vec<OrderView>, u64)>;

    /// Conditional status update: applies only while the row still holds
    /// `expected`, so concurrent mutations cannot be silently lost. A move
    /// to `delivered` also stamps `completed_at` and flips the payment
    /// status to `paid` in the same write. Returns the updated order, or
    /// `None` when the row changed under us.
    async fn transition_status(
        &self,
        id: &str,
        expected: OrderStatus,
        new_status: OrderStatus,
    ) -> DomainResult<Option<Order>>;

    /// Binds the order to an agent: `assigned_to`, status `assigned`,
    /// `assigned_at = now`, conditional on the current status still being
    /// `expected`.
    async fn assign(
        &self,
        id: &str,
        agent_id: &str,
        expected: OrderStatus,
    ) -> DomainResult<Option<Order>>;

    // ── Aggregations (analytics / workload) ─────────────────────

    async fn count_all(&self) -> DomainResult<u64>;
    async fn count_by_status(&self) -> DomainResult<Vec<(OrderStatus, u64)>>;

    /// Sum of `amount` over delivered orders, optionally for one agent.
    async fn delivered_amount_sum(&self, agent_id: Option<&str>) -> DomainResult<f64>;

    async fn count_for_agent(
        &self,
        agent_id: &str,
        statuses: Option<&[OrderStatus]>,
    ) -> DomainResult<u64>;

    /// Most recently created orders with parties joined.
    async fn recent(&self, limit: u64) -> DomainResult<Vec<OrderView>>;
}
