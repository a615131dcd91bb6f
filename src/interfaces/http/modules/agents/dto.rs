//! Delivery agent DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{AgentProfile, AgentStats, AgentWorkload, User};

#[derive(Debug, Serialize, ToSchema)]
pub struct AgentProfileDto {
    pub id: String,
    pub user_id: String,
    pub vehicle_number: String,
    pub vehicle_type: String,
    pub active: bool,
    pub current_latitude: Option<f64>,
    pub current_longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl From<AgentProfile> for AgentProfileDto {
    fn from(profile: AgentProfile) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            vehicle_number: profile.vehicle_number,
            vehicle_type: profile.vehicle_type,
            active: profile.active,
            current_latitude: profile.current_latitude,
            current_longitude: profile.current_longitude,
            created_at: profile.created_at,
        }
    }
}

/// Operator display data nested into agent listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct AgentOperatorDto {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl From<User> for AgentOperatorDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            phone: user.phone,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AgentWorkloadDto {
    pub total_orders: u64,
    pub active_orders: u64,
}

impl From<AgentWorkload> for AgentWorkloadDto {
    fn from(workload: AgentWorkload) -> Self {
        Self {
            total_orders: workload.total_orders,
            active_orders: workload.active_orders,
        }
    }
}

/// Listing entry: profile + operator + derived workload.
#[derive(Debug, Serialize, ToSchema)]
pub struct AgentListEntryDto {
    #[serde(flatten)]
    pub profile: AgentProfileDto,
    pub user: Option<AgentOperatorDto>,
    pub stats: AgentWorkloadDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AgentListResponse {
    pub count: usize,
    pub agents: Vec<AgentListEntryDto>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct AgentListParams {
    /// Filter by availability when present.
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAgentRequest {
    #[validate(length(min = 1, max = 50, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 6, max = 128, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[validate(length(min = 1, message = "vehicle_number is required"))]
    pub vehicle_number: String,
    pub vehicle_type: Option<String>,
}

/// Created agent joined with its account.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedAgentDto {
    #[serde(flatten)]
    pub profile: AgentProfileDto,
    pub user: AgentOperatorDto,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct MyOrdersParams {
    /// Optional lifecycle status filter.
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLocationRequest {
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be within [-90, 90]"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be within [-180, 180]"))]
    pub longitude: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActiveRequest {
    /// Strictly boolean; anything else is rejected at the JSON boundary.
    pub active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AgentStatsDto {
    pub total_orders: u64,
    pub completed_orders: u64,
    pub active_orders: u64,
    pub total_earnings: f64,
}

impl From<AgentStats> for AgentStatsDto {
    fn from(stats: AgentStats) -> Self {
        Self {
            total_orders: stats.total_orders,
            completed_orders: stats.completed_orders,
            active_orders: stats.active_orders,
            total_earnings: stats.total_earnings,
        }
    }
}
