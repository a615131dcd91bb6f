//! Dispatch service: agent assignment and agent self-service.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::{
    AgentProfile, AgentRepositoryInterface, AgentStats, AgentWorkload, DomainError, DomainResult,
    NewAgentProfile, NewUser, OrderRepositoryInterface, OrderStatus, OrderView, User,
    UserRepositoryInterface, UserRole,
};
use crate::infrastructure::crypto::password::hash_password;

/// Statuses that count as "currently being worked".
const ACTIVE_STATUSES: [OrderStatus; 2] = [OrderStatus::Assigned, OrderStatus::EnRoute];

/// Admin input for creating an agent account plus its profile.
#[derive(Debug, Clone)]
pub struct CreateAgentInput {
    pub username: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub vehicle_number: String,
    pub vehicle_type: Option<String>,
}

pub struct DispatchService {
    users: Arc<dyn UserRepositoryInterface>,
    agents: Arc<dyn AgentRepositoryInterface>,
    orders: Arc<dyn OrderRepositoryInterface>,
}

impl DispatchService {
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

    // ── Assignment ──────────────────────────────────────────────

    /// Binds an order to an agent. No capacity limit is enforced: an admin
    /// may pile arbitrarily many concurrent orders onto one agent. A
    /// load-balancing policy, if ever wanted, slots in here.
    pub async fn assign_agent(&self, order_id: &str, agent_id: &str) -> DomainResult<OrderView> {
        let Some(agent) = self.agents.find_by_id(agent_id).await? else {
            return Err(DomainError::not_found("Delivery agent", "id", agent_id));
        };

        if !agent.active {
            return Err(DomainError::InvalidState("Agent is not active".into()));
        }

        let Some(order) = self.orders.find_by_id(order_id).await? else {
            return Err(DomainError::not_found("Order", "id", order_id));
        };

        if order.status.is_terminal() {
            return Err(DomainError::InvalidState(format!(
                "order is {} and can no longer be assigned",
                order.status
            )));
        }

        self.orders
            .assign(order_id, agent_id, order.status)
            .await?
            .ok_or_else(|| DomainError::Conflict("Order was modified concurrently, retry".into()))?;

        metrics::counter!("voltgo_orders_assigned_total").increment(1);
        info!(order_id = %order_id, agent_id = %agent_id, "agent assigned to order");

        let Some(view) = self.orders.find_view(order_id).await? else {
            return Err(DomainError::not_found("Order", "id", order_id));
        };
        Ok(view)
    }

    // ── Directory & workload ────────────────────────────────────

    /// All agent profiles, optionally filtered by the active flag, each
    /// with a workload snapshot computed against the order table. One
    /// count pair per agent; fine at this scale.
    pub async fn list_agents(
        &self,
        active: Option<bool>,
    ) -> DomainResult<Vec<(AgentProfile, AgentWorkload)>> {
        let profiles = self.agents.list(active).await?;

        let mut out = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let total_orders = self.orders.count_for_agent(&profile.id, None).await?;
            let active_orders = self
                .orders
                .count_for_agent(&profile.id, Some(&ACTIVE_STATUSES))
                .await?;
            out.push((
                profile,
                AgentWorkload {
                    total_orders,
                    active_orders,
                },
            ));
        }
        Ok(out)
    }

    /// Operator display data for an agent profile.
    pub async fn agent_operator(&self, profile: &AgentProfile) -> DomainResult<Option<User>> {
        self.users.find_by_id(&profile.user_id).await
    }

    // ── Agent self-service ──────────────────────────────────────

    async fn profile_for_user(&self, user_id: &str) -> DomainResult<AgentProfile> {
        self.agents
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Agent profile", "user_id", user_id))
    }

    /// Orders assigned to the calling agent, optionally by status.
    pub async fn my_orders(
        &self,
        agent_user_id: &str,
        status: Option<OrderStatus>,
    ) -> DomainResult<Vec<OrderView>> {
        let profile = self.profile_for_user(agent_user_id).await?;
        self.orders.list_for_agent(&profile.id, status).await
    }

    /// Unconditional position overwrite; no staleness or plausibility
    /// checks.
    pub async fn update_location(
        &self,
        agent_user_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> DomainResult<AgentProfile> {
        self.agents
            .update_location(agent_user_id, latitude, longitude)
            .await?
            .ok_or_else(|| DomainError::not_found("Agent profile", "user_id", agent_user_id))
    }

    pub async fn set_active(&self, agent_user_id: &str, active: bool) -> DomainResult<AgentProfile> {
        let profile = self
            .agents
            .set_active(agent_user_id, active)
            .await?
            .ok_or_else(|| DomainError::not_found("Agent profile", "user_id", agent_user_id))?;

        info!(agent_id = %profile.id, active, "agent availability changed");
        Ok(profile)
    }

    /// The calling agent's own dashboard numbers.
    pub async fn agent_stats(&self, agent_user_id: &str) -> DomainResult<AgentStats> {
        let profile = self.profile_for_user(agent_user_id).await?;

        let total_orders = self.orders.count_for_agent(&profile.id, None).await?;
        let completed_orders = self
            .orders
            .count_for_agent(&profile.id, Some(&[OrderStatus::Delivered]))
            .await?;
        let active_orders = self
            .orders
            .count_for_agent(&profile.id, Some(&ACTIVE_STATUSES))
            .await?;
        let total_earnings = self.orders.delivered_amount_sum(Some(&profile.id)).await?;

        Ok(AgentStats {
            total_orders,
            completed_orders,
            active_orders,
            total_earnings,
        })
    }

    // ── Admin agent creation ────────────────────────────────────

    /// Creates the account and the profile in two writes. Unlike signup,
    /// a profile-write failure here removes the freshly created user so
    /// the admin can simply retry.
    pub async fn create_agent(
        &self,
        input: CreateAgentInput,
    ) -> DomainResult<(AgentProfile, User)> {
        if input.username.trim().is_empty()
            || input.password.is_empty()
            || input.name.trim().is_empty()
            || input.vehicle_number.trim().is_empty()
        {
            return Err(DomainError::Validation(
                "Username, password, name, and vehicle_number are required".into(),
            ));
        }
        if input.password.chars().count() < 6 {
            return Err(DomainError::Validation(
                "Password must be at least 6 characters long".into(),
            ));
        }

        if self.users.find_by_username(&input.username).await?.is_some() {
            return Err(DomainError::Conflict("Username already exists".into()));
        }

        let password_hash = hash_password(&input.password)
            .map_err(|e| DomainError::Internal(format!("failed to hash password: {e}")))?;

        let user = self
            .users
            .create(NewUser {
                username: input.username,
                password_hash,
                name: input.name,
                phone: input.phone,
                email: input.email,
                role: UserRole::Agent,
            })
            .await?;

        let profile = match self
            .agents
            .create(NewAgentProfile {
                user_id: user.id.clone(),
                vehicle_number: input.vehicle_number,
                vehicle_type: input
                    .vehicle_type
                    .unwrap_or_else(|| "motorcycle".to_string()),
            })
            .await
        {
            Ok(profile) => profile,
            Err(e) => {
                // Roll the account back so the username is not burned
                if let Err(del) = self.users.delete(&user.id).await {
                    error!(user_id = %user.id, error = %del.detail(), "rollback of agent user failed");
                }
                return Err(e);
            }
        };

        info!(agent_id = %profile.id, user_id = %user.id, "delivery agent created");
        Ok((profile, user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::orders::CreateOrderInput;
    use crate::application::testing::{
        seed_agent, seed_user, test_dispatch_service, test_order_service, TestContext,
    };
    use crate::domain::{PaymentStatus, TransitionPolicy};

    async fn seed_order(ctx: &TestContext, owner: &crate::domain::RequestIdentity) -> String {
        let orders = test_order_service(ctx, TransitionPolicy::Lenient);
        orders
            .create_order(
                owner,
                CreateOrderInput {
                    current_location: "12 MG Road, Bengaluru".into(),
                    latitude: 12.9,
                    longitude: 77.6,
                    battery_type: None,
                    vehicle_model: None,
                    charge_level: None,
                    amount: 299.0,
                },
            )
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn assignment_binds_agent_and_stamps_time() {
        let ctx = TestContext::new().await;
        let service = test_dispatch_service(&ctx);
        let alice = seed_user(&ctx, "alice", UserRole::User).await;
        let (_bob, bob_profile) = seed_agent(&ctx, "bob").await;

        let order_id = seed_order(&ctx, &alice).await;
        let view = service.assign_agent(&order_id, &bob_profile.id).await.unwrap();

        assert_eq!(view.order.status, OrderStatus::Assigned);
        assert_eq!(view.order.assigned_to.as_deref(), Some(bob_profile.id.as_str()));
        assert!(view.order.assigned_at.is_some());
        assert_eq!(
            view.agent.as_ref().map(|a| a.vehicle_number.as_str()),
            Some("VH-bob")
        );
    }

    #[tokio::test]
    async fn assigning_an_inactive_agent_fails_cleanly() {
        let ctx = TestContext::new().await;
        let service = test_dispatch_service(&ctx);
        let alice = seed_user(&ctx, "alice", UserRole::User).await;
        let (bob, bob_profile) = seed_agent(&ctx, "bob").await;

        service.set_active(&bob.user_id, false).await.unwrap();

        let order_id = seed_order(&ctx, &alice).await;
        let err = service
            .assign_agent(&order_id, &bob_profile.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)), "{err:?}");

        // The order is untouched
        let order = ctx.orders.find_by_id(&order_id).await.unwrap().unwrap();
        assert!(order.assigned_to.is_none());
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn assigning_an_unknown_agent_is_not_found() {
        let ctx = TestContext::new().await;
        let service = test_dispatch_service(&ctx);
        let alice = seed_user(&ctx, "alice", UserRole::User).await;
        let order_id = seed_order(&ctx, &alice).await;

        let err = service
            .assign_agent(&order_id, "no-such-agent")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn workload_counts_follow_the_order_table() {
        let ctx = TestContext::new().await;
        let service = test_dispatch_service(&ctx);
        let orders = test_order_service(&ctx, TransitionPolicy::Lenient);
        let alice = seed_user(&ctx, "alice", UserRole::User).await;
        let (bob, bob_profile) = seed_agent(&ctx, "bob").await;

        let first = seed_order(&ctx, &alice).await;
        let second = seed_order(&ctx, &alice).await;
        service.assign_agent(&first, &bob_profile.id).await.unwrap();
        service.assign_agent(&second, &bob_profile.id).await.unwrap();
        orders
            .set_status(&bob, &first, OrderStatus::Delivered)
            .await
            .unwrap();

        let listed = service.list_agents(Some(true)).await.unwrap();
        let (_, workload) = listed
            .iter()
            .find(|(p, _)| p.id == bob_profile.id)
            .expect("bob listed");
        assert_eq!(workload.total_orders, 2);
        assert_eq!(workload.active_orders, 1);

        let stats = service.agent_stats(&bob.user_id).await.unwrap();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.completed_orders, 1);
        assert_eq!(stats.active_orders, 1);
        assert!((stats.total_earnings - 299.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn delivery_through_assigned_agent_end_to_end() {
        let ctx = TestContext::new().await;
        let service = test_dispatch_service(&ctx);
        let orders = test_order_service(&ctx, TransitionPolicy::Lenient);
        let alice = seed_user(&ctx, "alice", UserRole::User).await;
        let (bob, bob_profile) = seed_agent(&ctx, "bob").await;

        let order_id = seed_order(&ctx, &alice).await;
        service.assign_agent(&order_id, &bob_profile.id).await.unwrap();

        let delivered = orders
            .set_status(&bob, &order_id, OrderStatus::Delivered)
            .await
            .unwrap();
        assert!(delivered.completed_at.is_some());
        assert_eq!(delivered.payment_status, PaymentStatus::Paid);

        let err = orders.cancel_order(&alice, &order_id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)), "{err:?}");
    }

    #[tokio::test]
    async fn location_updates_overwrite_previous_position() {
        let ctx = TestContext::new().await;
        let service = test_dispatch_service(&ctx);
        let (bob, _) = seed_agent(&ctx, "bob").await;

        let updated = service.update_location(&bob.user_id, 12.91, 77.61).await.unwrap();
        assert_eq!(updated.current_latitude, Some(12.91));

        let updated = service.update_location(&bob.user_id, 12.95, 77.65).await.unwrap();
        assert_eq!(updated.current_latitude, Some(12.95));
        assert_eq!(updated.current_longitude, Some(77.65));
    }

    #[tokio::test]
    async fn create_agent_builds_account_and_profile() {
        let ctx = TestContext::new().await;
        let service = test_dispatch_service(&ctx);

        let (profile, user) = service
            .create_agent(CreateAgentInput {
                username: "carol".into(),
                password: "secret1".into(),
                name: "Carol".into(),
                phone: None,
                email: None,
                vehicle_number: "KA-05-7777".into(),
                vehicle_type: None,
            })
            .await
            .unwrap();

        assert_eq!(user.role, UserRole::Agent);
        assert_eq!(profile.user_id, user.id);
        assert_eq!(profile.vehicle_type, "motorcycle");
        assert!(profile.active);
    }

    #[tokio::test]
    async fn create_agent_requires_vehicle_number() {
        let ctx = TestContext::new().await;
        let service = test_dispatch_service(&ctx);

        let err = service
            .create_agent(CreateAgentInput {
                username: "carol".into(),
                password: "secret1".into(),
                name: "Carol".into(),
                phone: None,
                email: None,
                vehicle_number: "".into(),
                vehicle_type: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)), "{err:?}");
    }
}
