//! Order DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{AgentBrief, Order, OrderView, PartyBrief};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "current_location is required"))]
    pub current_location: String,
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be within [-90, 90]"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be within [-180, 180]"))]
    pub longitude: f64,
    /// Defaults to `standard`.
    pub battery_type: Option<String>,
    pub vehicle_model: Option<String>,
    /// Defaults to `0-20%`.
    pub charge_level: Option<String>,
    #[serde(default)]
    pub amount: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// One of `pending`, `assigned`, `en_route`, `delivered`, `cancelled`.
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDto {
    pub id: String,
    pub user_id: String,
    pub assigned_to: Option<String>,
    pub current_location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub battery_type: String,
    pub vehicle_model: Option<String>,
    pub charge_level: String,
    pub amount: f64,
    pub status: String,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Order> for OrderDto {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            assigned_to: order.assigned_to,
            current_location: order.current_location,
            latitude: order.latitude,
            longitude: order.longitude,
            battery_type: order.battery_type,
            vehicle_model: order.vehicle_model,
            charge_level: order.charge_level,
            amount: order.amount,
            status: order.status.as_str().to_string(),
            payment_status: order.payment_status.as_str().to_string(),
            created_at: order.created_at,
            assigned_at: order.assigned_at,
            completed_at: order.completed_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PartyBriefDto {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl From<PartyBrief> for PartyBriefDto {
    fn from(brief: PartyBrief) -> Self {
        Self {
            id: brief.id,
            name: brief.name,
            phone: brief.phone,
            email: brief.email,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderAgentDto {
    pub id: String,
    pub vehicle_number: String,
    pub vehicle_type: String,
    pub current_latitude: Option<f64>,
    pub current_longitude: Option<f64>,
    pub user: Option<PartyBriefDto>,
}

impl From<AgentBrief> for OrderAgentDto {
    fn from(brief: AgentBrief) -> Self {
        Self {
            id: brief.id,
            vehicle_number: brief.vehicle_number,
            vehicle_type: brief.vehicle_type,
            current_latitude: brief.current_latitude,
            current_longitude: brief.current_longitude,
            user: brief.user.map(PartyBriefDto::from),
        }
    }
}

/// Order joined with owner and agent display data.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderViewDto {
    #[serde(flatten)]
    pub order: OrderDto,
    pub user: Option<PartyBriefDto>,
    pub agent: Option<OrderAgentDto>,
}

impl From<OrderView> for OrderViewDto {
    fn from(view: OrderView) -> Self {
        Self {
            order: OrderDto::from(view.order),
            user: view.user.map(PartyBriefDto::from),
            agent: view.agent.map(OrderAgentDto::from),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrdersListResponse {
    pub count: u64,
    pub orders: Vec<OrderViewDto>,
}
