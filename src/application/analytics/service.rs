//! Analytics service: read-only dashboard rollups.
//!
//! Everything is computed fresh per request against the order/user/agent
//! tables; there is no cached or incremental state. Swapping in a
//! materialized read model later only touches this service.

use std::sync::Arc;

use crate::domain::{
    AgentRepositoryInterface, DomainResult, OrderRepositoryInterface, OrderStatus, OrderView,
    UserRepositoryInterface, UserRole,
};

const RECENT_ORDERS_LIMIT: u64 = 10;

/// Dashboard rollups.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub total_orders: u64,
    pub orders_by_status: Vec<(OrderStatus, u64)>,
    pub total_users: u64,
    pub total_agents: u64,
    pub active_agents: u64,
    /// Sum of `amount` over delivered orders.
    pub total_revenue: f64,
    pub recent_orders: Vec<OrderView>,
}

pub struct AnalyticsService {
    users: Arc<dyn UserRepositoryInterface>,
    agents: Arc<dyn AgentRepositoryInterface>,
    orders: Arc<dyn OrderRepositoryInterface>,
}

impl AnalyticsService {
    pub fn new(
        users: Arc<dyn UserRepositoryInterface>,
        agents: Arc<dyn AgentRepositoryInterface>,
        orders: Arc<dyn OrderRepositoryInterface>,
    ) -> Self {
        Self {
            users,
            agents,
            orders,
        }
    }

    pub async fn dashboard(&self) -> DomainResult<Dashboard> {
        let total_orders = self.orders.count_all().await?;
        let orders_by_status = self.orders.count_by_status().await?;
        let total_users = self.users.count_by_role(UserRole::User).await?;
        let total_agents = self.agents.count(None).await?;
        let active_agents = self.agents.count(Some(true)).await?;
        let total_revenue = self.orders.delivered_amount_sum(None).await?;
        let recent_orders = self.orders.recent(RECENT_ORDERS_LIMIT).await?;

        Ok(Dashboard {
            total_orders,
            orders_by_status,
            total_users,
            total_agents,
            active_agents,
            total_revenue,
            recent_orders,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::orders::CreateOrderInput;
    use crate::application::testing::{
        admin_identity, seed_agent, seed_user, test_analytics_service, test_dispatch_service,
        test_order_service, TestContext,
    };
    use crate::domain::TransitionPolicy;

    #[tokio::test]
    async fn dashboard_reflects_the_tables() {
        let ctx = TestContext::new().await;
        let analytics = test_analytics_service(&ctx);
        let orders = test_order_service(&ctx, TransitionPolicy::Lenient);
        let dispatch = test_dispatch_service(&ctx);

        let alice = seed_user(&ctx, "alice", UserRole::User).await;
        let admin = admin_identity(&ctx).await;
        let (_bob, bob_profile) = seed_agent(&ctx, "bob").await;

        let input = |amount: f64| CreateOrderInput {
            current_location: "12 MG Road, Bengaluru".into(),
            latitude: 12.9,
            longitude: 77.6,
            battery_type: None,
            vehicle_model: None,
            charge_level: None,
            amount,
        };

        let first = orders.create_order(&alice, input(299.0)).await.unwrap();
        let second = orders.create_order(&alice, input(150.5)).await.unwrap();
        orders.create_order(&alice, input(80.0)).await.unwrap();

        dispatch.assign_agent(&first.id, &bob_profile.id).await.unwrap();
        orders
            .set_status(&admin, &first.id, OrderStatus::Delivered)
            .await
            .unwrap();
        orders.cancel_order(&alice, &second.id).await.unwrap();

        let dashboard = analytics.dashboard().await.unwrap();

        assert_eq!(dashboard.total_orders, 3);
        assert_eq!(dashboard.total_users, 1);
        assert_eq!(dashboard.total_agents, 1);
        assert_eq!(dashboard.active_agents, 1);
        assert!((dashboard.total_revenue - 299.0).abs() < f64::EPSILON);

        let by_status: std::collections::HashMap<_, _> =
            dashboard.orders_by_status.into_iter().collect();
        assert_eq!(by_status[&OrderStatus::Pending], 1);
        assert_eq!(by_status[&OrderStatus::Delivered], 1);
        assert_eq!(by_status[&OrderStatus::Cancelled], 1);

        assert_eq!(dashboard.recent_orders.len(), 3);
        // Owner names are joined onto recent orders
        assert!(dashboard
            .recent_orders
            .iter()
            .all(|v| v.user.as_ref().is_some_and(|u| !u.name.is_empty())));
    }
}
