use chrono::{DateTime, Utc};

/// Delivery agent profile, extension record for users with the `agent` role.
/// At most one profile exists per user.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    pub id: String,
    pub user_id: String,
    pub vehicle_number: String,
    pub vehicle_type: String,
    pub active: bool,
    /// Last reported position; `None` until the agent's first report.
    pub current_latitude: Option<f64>,
    pub current_longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Derived per-agent workload snapshot, computed against the order table at
/// query time. One extra query per agent; acceptable at this scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentWorkload {
    /// Orders ever assigned to this agent.
    pub total_orders: u64,
    /// Orders currently in `assigned` or `en_route`.
    pub active_orders: u64,
}

/// An agent's own dashboard numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentStats {
    pub total_orders: u64,
    pub completed_orders: u64,
    pub active_orders: u64,
    /// Sum of `amount` over this agent's delivered orders.
    pub total_earnings: f64,
}
