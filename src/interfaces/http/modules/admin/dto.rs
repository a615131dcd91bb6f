//! Admin back-office DTOs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::Dashboard;
use crate::interfaces::http::modules::auth::dto::UserDto;
use crate::interfaces::http::modules::orders::dto::OrderViewDto;

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct AdminOrdersParams {
    /// Lifecycle status filter.
    pub status: Option<String>,
    /// Owning user filter.
    pub user_id: Option<String>,
    /// Assigned agent filter.
    pub agent_id: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct AdminUsersParams {
    /// Role filter: `user`, `admin` or `agent`.
    pub role: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    100
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignAgentRequest {
    #[validate(length(min = 1, message = "agent_id is required"))]
    pub agent_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsersListResponse {
    pub count: u64,
    pub users: Vec<UserDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsDto {
    pub total_orders: u64,
    pub total_users: u64,
    pub total_agents: u64,
    pub active_agents: u64,
    pub total_revenue: f64,
    /// Order counts keyed by status name.
    pub orders_by_status: BTreeMap<String, u64>,
    pub recent_orders: Vec<OrderViewDto>,
}

impl From<Dashboard> for AnalyticsDto {
    fn from(dashboard: Dashboard) -> Self {
        Self {
            total_orders: dashboard.total_orders,
            total_users: dashboard.total_users,
            total_agents: dashboard.total_agents,
            active_agents: dashboard.active_agents,
            total_revenue: dashboard.total_revenue,
            orders_by_status: dashboard
                .orders_by_status
                .into_iter()
                .map(|(status, count)| (status.as_str().to_string(), count))
                .collect(),
            recent_orders: dashboard
                .recent_orders
                .into_iter()
                .map(OrderViewDto::from)
                .collect(),
        }
    }
}
