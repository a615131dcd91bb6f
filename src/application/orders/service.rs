//! Order lifecycle service: creation, visibility rules, status
//! transitions, cancellation.

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    AgentRepositoryInterface, DomainError, DomainResult, NewOrder, Order,
    OrderRepositoryInterface, OrderStatus, OrderView, RequestIdentity, TransitionPolicy, UserRole,
};

/// Order creation input after DTO validation.
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub current_location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub battery_type: Option<String>,
    pub vehicle_model: Option<String>,
    pub charge_level: Option<String>,
    pub amount: f64,
}

pub struct OrderService {
    orders: Arc<dyn OrderRepositoryInterface>,
    agents: Arc<dyn AgentRepositoryInterface>,
    policy: TransitionPolicy,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepositoryInterface>,
        agents: Arc<dyn AgentRepositoryInterface>,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            orders,
            agents,
            policy,
        }
    }

    // ── Creation ────────────────────────────────────────────────

    /// New orders always start as `pending` / payment `pending`.
    pub async fn create_order(
        &self,
        identity: &RequestIdentity,
        input: CreateOrderInput,
    ) -> DomainResult<Order> {
        identity.require_any(&[UserRole::User, UserRole::Admin])?;

        if input.current_location.trim().is_empty() {
            return Err(DomainError::Validation(
                "Location details (current_location, latitude, longitude) are required".into(),
            ));
        }

        let order = self
            .orders
            .create(NewOrder {
                user_id: identity.user_id.clone(),
                current_location: input.current_location,
                latitude: input.latitude,
                longitude: input.longitude,
                battery_type: input.battery_type.unwrap_or_else(|| "standard".to_string()),
                vehicle_model: input.vehicle_model,
                charge_level: input.charge_level.unwrap_or_else(|| "0-20%".to_string()),
                amount: input.amount,
            })
            .await?;

        metrics::counter!("voltgo_orders_created_total").increment(1);
        info!(order_id = %order.id, user_id = %order.user_id, "order created");
        Ok(order)
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Visibility: the owner, or a privileged role (admin, agent).
    pub async fn get_order(
        &self,
        identity: &RequestIdentity,
        order_id: &str,
    ) -> DomainResult<OrderView> {
        let Some(view) = self.orders.find_view(order_id).await? else {
            return Err(DomainError::not_found("Order", "id", order_id));
        };

        let is_privileged = matches!(identity.role, UserRole::Admin | UserRole::Agent);
        if !is_privileged && view.order.user_id != identity.user_id {
            return Err(DomainError::forbidden_because(
                "only the order owner may view this order",
            ));
        }

        Ok(view)
    }

    /// Back-office listing with filters and paging; route-gated to admins.
    pub async fn list_orders(
        &self,
        filter: crate::domain::OrderFilter,
    ) -> DomainResult<(Vec<OrderView>, u64)> {
        self.orders.list(filter).await
    }

    /// A user's order history: self or admin only.
    pub async fn list_orders_for_user(
        &self,
        identity: &RequestIdentity,
        user_id: &str,
    ) -> DomainResult<Vec<OrderView>> {
        if !identity.is_admin() && identity.user_id != user_id {
            return Err(DomainError::forbidden_because(
                "only the user themself may list these orders",
            ));
        }

        self.orders.list_for_user(user_id).await
    }

    // ── Status transitions ──────────────────────────────────────

    /// Advances the lifecycle. Allowed for admins, and for the agent whose
    /// profile is bound to the order. The write is conditional on the
    /// status observed here, so a concurrent transition surfaces as a
    /// conflict instead of a lost update.
    pub async fn set_status(
        &self,
        identity: &RequestIdentity,
        order_id: &str,
        new_status: OrderStatus,
    ) -> DomainResult<Order> {
        let Some(order) = self.orders.find_by_id(order_id).await? else {
            return Err(DomainError::not_found("Order", "id", order_id));
        };

        let mut can_update = identity.is_admin();
        if !can_update && identity.role == UserRole::Agent {
            if let (Some(assigned_to), Some(profile)) = (
                order.assigned_to.as_deref(),
                self.agents.find_by_user_id(&identity.user_id).await?,
            ) {
                can_update = profile.id == assigned_to;
            }
        }
        if !can_update {
            return Err(DomainError::Forbidden {
                reason: "only admins or the assigned agent can update order status".into(),
                allowed: vec![UserRole::Admin, UserRole::Agent],
            });
        }

        if order.status.is_terminal() {
            return Err(DomainError::InvalidState(format!(
                "order is {} and can no longer change status",
                order.status
            )));
        }
        if !self.policy.allows(order.status, new_status) {
            return Err(DomainError::InvalidState(format!(
                "transition from {} to {} is not permitted",
                order.status, new_status
            )));
        }

        let updated = self
            .orders
            .transition_status(order_id, order.status, new_status)
            .await?
            .ok_or_else(|| {
                DomainError::Conflict("Order was modified concurrently, retry".into())
            })?;

        metrics::counter!("voltgo_order_transitions_total", "to" => new_status.as_str())
            .increment(1);
        info!(order_id = %order_id, from = %order.status, to = %new_status, "order status updated");
        Ok(updated)
    }

    /// Soft-cancel. Owner or admin only; delivered orders are immutable;
    /// cancelling an already-cancelled order is a no-op.
    pub async fn cancel_order(
        &self,
        identity: &RequestIdentity,
        order_id: &str,
    ) -> DomainResult<Order> {
        let Some(order) = self.orders.find_by_id(order_id).await? else {
            return Err(DomainError::not_found("Order", "id", order_id));
        };

        if !identity.is_admin() && identity.user_id != order.user_id {
            return Err(DomainError::forbidden_because(
                "only the order owner or an admin may cancel this order",
            ));
        }

        match order.status {
            OrderStatus::Delivered => Err(DomainError::InvalidState(
                "Cannot cancel a delivered order".into(),
            )),
            OrderStatus::Cancelled => Ok(order),
            current => {
                let updated = self
                    .orders
                    .transition_status(order_id, current, OrderStatus::Cancelled)
                    .await?
                    .ok_or_else(|| {
                        DomainError::Conflict("Order was modified concurrently, retry".into())
                    })?;

                info!(order_id = %order_id, "order cancelled");
                Ok(updated)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{
        admin_identity, seed_agent, seed_user, test_order_service, TestContext,
    };
    use crate::domain::PaymentStatus;

    fn order_input(lat: f64, lng: f64, amount: f64) -> CreateOrderInput {
        CreateOrderInput {
            current_location: "12 MG Road, Bengaluru".into(),
            latitude: lat,
            longitude: lng,
            battery_type: None,
            vehicle_model: Some("Nexon EV".into()),
            charge_level: Some("0-20%".into()),
            amount,
        }
    }

    #[tokio::test]
    async fn created_order_is_pending_and_unassigned() {
        let ctx = TestContext::new().await;
        let service = test_order_service(&ctx, TransitionPolicy::Lenient);
        let alice = seed_user(&ctx, "alice", UserRole::User).await;

        let order = service
            .create_order(&alice, order_input(12.9, 77.6, 299.0))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert!(order.assigned_to.is_none());
        assert!(order.completed_at.is_none());
    }

    #[tokio::test]
    async fn order_round_trips_address_and_coordinates() {
        let ctx = TestContext::new().await;
        let service = test_order_service(&ctx, TransitionPolicy::Lenient);
        let alice = seed_user(&ctx, "alice", UserRole::User).await;

        let created = service
            .create_order(&alice, order_input(12.9, 77.6, 299.0))
            .await
            .unwrap();

        let fetched = service.get_order(&alice, &created.id).await.unwrap();
        assert_eq!(fetched.order.current_location, "12 MG Road, Bengaluru");
        assert_eq!(fetched.order.latitude, 12.9);
        assert_eq!(fetched.order.longitude, 77.6);
    }

    #[tokio::test]
    async fn create_order_requires_location() {
        let ctx = TestContext::new().await;
        let service = test_order_service(&ctx, TransitionPolicy::Lenient);
        let alice = seed_user(&ctx, "alice", UserRole::User).await;

        let mut input = order_input(12.9, 77.6, 299.0);
        input.current_location = "  ".into();

        let err = service.create_order(&alice, input).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)), "{err:?}");
    }

    #[tokio::test]
    async fn strangers_cannot_view_an_order() {
        let ctx = TestContext::new().await;
        let service = test_order_service(&ctx, TransitionPolicy::Lenient);
        let alice = seed_user(&ctx, "alice", UserRole::User).await;
        let mallory = seed_user(&ctx, "mallory", UserRole::User).await;

        let order = service
            .create_order(&alice, order_input(12.9, 77.6, 299.0))
            .await
            .unwrap();

        let err = service.get_order(&mallory, &order.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }), "{err:?}");

        // The owner and an admin both can
        service.get_order(&alice, &order.id).await.unwrap();
        service
            .get_order(&admin_identity(&ctx).await, &order.id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn listing_another_users_orders_is_forbidden() {
        let ctx = TestContext::new().await;
        let service = test_order_service(&ctx, TransitionPolicy::Lenient);
        let alice = seed_user(&ctx, "alice", UserRole::User).await;
        let mallory = seed_user(&ctx, "mallory", UserRole::User).await;

        let err = service
            .list_orders_for_user(&mallory, &alice.user_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }), "{err:?}");

        assert!(service
            .list_orders_for_user(&alice, &alice.user_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn delivery_stamps_completion_and_payment() {
        let ctx = TestContext::new().await;
        let service = test_order_service(&ctx, TransitionPolicy::Lenient);
        let alice = seed_user(&ctx, "alice", UserRole::User).await;
        let admin = admin_identity(&ctx).await;

        let order = service
            .create_order(&alice, order_input(12.9, 77.6, 299.0))
            .await
            .unwrap();

        let delivered = service
            .set_status(&admin, &order.id, OrderStatus::Delivered)
            .await
            .unwrap();

        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert_eq!(delivered.payment_status, PaymentStatus::Paid);
        assert!(delivered.completed_at.is_some());
    }

    #[tokio::test]
    async fn only_the_assigned_agent_may_advance_status() {
        let ctx = TestContext::new().await;
        let service = test_order_service(&ctx, TransitionPolicy::Lenient);
        let alice = seed_user(&ctx, "alice", UserRole::User).await;
        let (bob, bob_profile) = seed_agent(&ctx, "bob").await;
        let (eve, _) = seed_agent(&ctx, "eve").await;

        let order = service
            .create_order(&alice, order_input(12.9, 77.6, 299.0))
            .await
            .unwrap();

        // Unassigned: neither agent may touch it
        let err = service
            .set_status(&bob, &order.id, OrderStatus::EnRoute)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }), "{err:?}");

        ctx.orders
            .assign(&order.id, &bob_profile.id, OrderStatus::Pending)
            .await
            .unwrap()
            .unwrap();

        let err = service
            .set_status(&eve, &order.id, OrderStatus::EnRoute)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }), "{err:?}");

        let updated = service
            .set_status(&bob, &order.id, OrderStatus::EnRoute)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::EnRoute);
    }

    #[tokio::test]
    async fn delivered_orders_are_immutable() {
        let ctx = TestContext::new().await;
        let service = test_order_service(&ctx, TransitionPolicy::Lenient);
        let alice = seed_user(&ctx, "alice", UserRole::User).await;
        let admin = admin_identity(&ctx).await;

        let order = service
            .create_order(&alice, order_input(12.9, 77.6, 299.0))
            .await
            .unwrap();
        service
            .set_status(&admin, &order.id, OrderStatus::Delivered)
            .await
            .unwrap();

        let err = service
            .set_status(&admin, &order.id, OrderStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)), "{err:?}");

        let err = service.cancel_order(&alice, &order.id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)), "{err:?}");
    }

    #[tokio::test]
    async fn strict_policy_rejects_fast_forward() {
        let ctx = TestContext::new().await;
        let service = test_order_service(&ctx, TransitionPolicy::Strict);
        let alice = seed_user(&ctx, "alice", UserRole::User).await;
        let admin = admin_identity(&ctx).await;

        let order = service
            .create_order(&alice, order_input(12.9, 77.6, 299.0))
            .await
            .unwrap();

        let err = service
            .set_status(&admin, &order.id, OrderStatus::Delivered)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)), "{err:?}");
    }

    #[tokio::test]
    async fn cancellation_is_idempotent_and_owner_gated() {
        let ctx = TestContext::new().await;
        let service = test_order_service(&ctx, TransitionPolicy::Lenient);
        let alice = seed_user(&ctx, "alice", UserRole::User).await;
        let mallory = seed_user(&ctx, "mallory", UserRole::User).await;

        let order = service
            .create_order(&alice, order_input(12.9, 77.6, 299.0))
            .await
            .unwrap();

        let err = service.cancel_order(&mallory, &order.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }), "{err:?}");

        let cancelled = service.cancel_order(&alice, &order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        // Second cancellation must not error
        let again = service.cancel_order(&alice, &order.id).await.unwrap();
        assert_eq!(again.status, OrderStatus::Cancelled);
    }
}
