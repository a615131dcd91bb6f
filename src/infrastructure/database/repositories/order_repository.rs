use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::user_repository::db_err;
use crate::domain::{
    AgentBrief, DomainResult, NewOrder, Order, OrderFilter, OrderRepositoryInterface, OrderStatus,
    OrderView, PartyBrief, PaymentStatus,
};
use crate::infrastructure::database::entities::{agent, order, user};

pub struct OrderRepository {
    db: DatabaseConnection,
}

impl OrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_status_to_domain(status: order::OrderStatus) -> OrderStatus {
    match status {
        order::OrderStatus::Pending => OrderStatus::Pending,
        order::OrderStatus::Assigned => OrderStatus::Assigned,
        order::OrderStatus::EnRoute => OrderStatus::EnRoute,
        order::OrderStatus::Delivered => OrderStatus::Delivered,
        order::OrderStatus::Cancelled => OrderStatus::Cancelled,
    }
}

fn domain_status_to_entity(status: OrderStatus) -> order::OrderStatus {
    match status {
        OrderStatus::Pending => order::OrderStatus::Pending,
        OrderStatus::Assigned => order::OrderStatus::Assigned,
        OrderStatus::EnRoute => order::OrderStatus::EnRoute,
        OrderStatus::Delivered => order::OrderStatus::Delivered,
        OrderStatus::Cancelled => order::OrderStatus::Cancelled,
    }
}

fn entity_payment_to_domain(status: order::PaymentStatus) -> PaymentStatus {
    match status {
        order::PaymentStatus::Pending => PaymentStatus::Pending,
        order::PaymentStatus::Paid => PaymentStatus::Paid,
    }
}

fn order_model_to_domain(model: order::Model) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        assigned_to: model.assigned_to,
        current_location: model.current_location,
        latitude: model.latitude,
        longitude: model.longitude,
        battery_type: model.battery_type,
        vehicle_model: model.vehicle_model,
        charge_level: model.charge_level,
        amount: model.amount,
        status: entity_status_to_domain(model.status),
        payment_status: entity_payment_to_domain(model.payment_status),
        created_at: model.created_at,
        assigned_at: model.assigned_at,
        completed_at: model.completed_at,
    }
}

fn party_brief(model: &user::Model) -> PartyBrief {
    PartyBrief {
        id: model.id.clone(),
        name: model.name.clone(),
        phone: model.phone.clone(),
        email: model.email.clone(),
    }
}

impl OrderRepository {
    /// Joins owner and assigned-agent display data onto a batch of orders
    /// with three point queries instead of one per row.
    async fn build_views(&self, rows: Vec<order::Model>) -> DomainResult<Vec<OrderView>> {
        let agent_ids: Vec<String> = rows.iter().filter_map(|o| o.assigned_to.clone()).collect();

        let agents: Vec<agent::Model> = if agent_ids.is_empty() {
            Vec::new()
        } else {
            agent::Entity::find()
                .filter(agent::Column::Id.is_in(agent_ids))
                .all(&self.db)
                .await
                .map_err(db_err)?
        };

        // Owner ids plus the agents' operator ids, fetched in one query
        let mut user_ids: Vec<String> = rows.iter().map(|o| o.user_id.clone()).collect();
        user_ids.extend(agents.iter().map(|a| a.user_id.clone()));
        user_ids.sort();
        user_ids.dedup();

        let users: Vec<user::Model> = if user_ids.is_empty() {
            Vec::new()
        } else {
            user::Entity::find()
                .filter(user::Column::Id.is_in(user_ids))
                .all(&self.db)
                .await
                .map_err(db_err)?
        };

        let users_by_id: HashMap<String, PartyBrief> = users
            .iter()
            .map(|u| (u.id.clone(), party_brief(u)))
            .collect();

        let agents_by_id: HashMap<String, AgentBrief> = agents
            .into_iter()
            .map(|a| {
                let brief = AgentBrief {
                    id: a.id.clone(),
                    vehicle_number: a.vehicle_number,
                    vehicle_type: a.vehicle_type,
                    current_latitude: a.current_latitude,
                    current_longitude: a.current_longitude,
                    user: users_by_id.get(&a.user_id).cloned(),
                };
                (a.id, brief)
            })
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let user = users_by_id.get(&row.user_id).cloned();
                let agent = row
                    .assigned_to
                    .as_ref()
                    .and_then(|id| agents_by_id.get(id).cloned());
                OrderView {
                    order: order_model_to_domain(row),
                    user,
                    agent,
                }
            })
            .collect())
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl OrderRepositoryInterface for OrderRepository {
    async fn create(&self, new_order: NewOrder) -> DomainResult<Order> {
        let row = order::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            user_id: Set(new_order.user_id),
            assigned_to: Set(None),
            current_location: Set(new_order.current_location),
            latitude: Set(new_order.latitude),
            longitude: Set(new_order.longitude),
            battery_type: Set(new_order.battery_type),
            vehicle_model: Set(new_order.vehicle_model),
            charge_level: Set(new_order.charge_level),
            amount: Set(new_order.amount),
            status: Set(order::OrderStatus::Pending),
            payment_status: Set(order::PaymentStatus::Pending),
            created_at: Set(Utc::now()),
            assigned_at: Set(None),
            completed_at: Set(None),
        };

        let inserted = row.insert(&self.db).await.map_err(db_err)?;
        Ok(order_model_to_domain(inserted))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Order>> {
        let found = order::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(order_model_to_domain))
    }

    async fn find_view(&self, id: &str) -> DomainResult<Option<OrderView>> {
        let Some(found) = order::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        Ok(self.build_views(vec![found]).await?.into_iter().next())
    }

    async fn list_for_user(&self, user_id: &str) -> DomainResult<Vec<OrderView>> {
        let rows = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        self.build_views(rows).await
    }

    async fn list_for_agent(
        &self,
        agent_id: &str,
        status: Option<OrderStatus>,
    ) -> DomainResult<Vec<OrderView>> {
        let mut query = order::Entity::find()
            .filter(order::Column::AssignedTo.eq(agent_id))
            .order_by_desc(order::Column::CreatedAt);

        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(domain_status_to_entity(status)));
        }

        let rows = query.all(&self.db).await.map_err(db_err)?;
        self.build_views(rows).await
    }

    async fn list(&self, filter: OrderFilter) -> DomainResult<(Vec<OrderView>, u64)> {
        let mut query = order::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(order::Column::Status.eq(domain_status_to_entity(status)));
        }
        if let Some(ref user_id) = filter.user_id {
            query = query.filter(order::Column::UserId.eq(user_id));
        }
        if let Some(ref agent_id) = filter.agent_id {
            query = query.filter(order::Column::AssignedTo.eq(agent_id));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let rows = query
            .order_by_desc(order::Column::CreatedAt)
            .offset(filter.offset)
            .limit(filter.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok((self.build_views(rows).await?, total))
    }

    async fn transition_status(
        &self,
        id: &str,
        expected: OrderStatus,
        new_status: OrderStatus,
    ) -> DomainResult<Option<Order>> {
        let mut update = order::Entity::update_many()
            .filter(order::Column::Id.eq(id))
            .filter(order::Column::Status.eq(domain_status_to_entity(expected)))
            .col_expr(
                order::Column::Status,
                Expr::value(domain_status_to_entity(new_status)),
            );

        // Delivery completes payment in the same write
        if new_status == OrderStatus::Delivered {
            update = update
                .col_expr(order::Column::CompletedAt, Expr::value(Utc::now()))
                .col_expr(
                    order::Column::PaymentStatus,
                    Expr::value(order::PaymentStatus::Paid),
                );
        }

        let result = update.exec(&self.db).await.map_err(db_err)?;
        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    async fn assign(
        &self,
        id: &str,
        agent_id: &str,
        expected: OrderStatus,
    ) -> DomainResult<Option<Order>> {
        let result = order::Entity::update_many()
            .filter(order::Column::Id.eq(id))
            .filter(order::Column::Status.eq(domain_status_to_entity(expected)))
            .col_expr(order::Column::AssignedTo, Expr::value(agent_id))
            .col_expr(
                order::Column::Status,
                Expr::value(order::OrderStatus::Assigned),
            )
            .col_expr(order::Column::AssignedAt, Expr::value(Utc::now()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    // ── Aggregations ────────────────────────────────────────────

    async fn count_all(&self) -> DomainResult<u64> {
        order::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn count_by_status(&self) -> DomainResult<Vec<(OrderStatus, u64)>> {
        let statuses = [
            OrderStatus::Pending,
            OrderStatus::Assigned,
            OrderStatus::EnRoute,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ];

        let mut counts = Vec::with_capacity(statuses.len());
        for status in statuses {
            let count = order::Entity::find()
                .filter(order::Column::Status.eq(domain_status_to_entity(status)))
                .count(&self.db)
                .await
                .map_err(db_err)?;
            counts.push((status, count));
        }
        Ok(counts)
    }

    async fn delivered_amount_sum(&self, agent_id: Option<&str>) -> DomainResult<f64> {
        let mut query = order::Entity::find()
            .filter(order::Column::Status.eq(order::OrderStatus::Delivered));

        if let Some(agent_id) = agent_id {
            query = query.filter(order::Column::AssignedTo.eq(agent_id));
        }

        let rows = query.all(&self.db).await.map_err(db_err)?;
        Ok(rows.iter().map(|o| o.amount).sum())
    }

    async fn count_for_agent(
        &self,
        agent_id: &str,
        statuses: Option<&[OrderStatus]>,
    ) -> DomainResult<u64> {
        let mut query = order::Entity::find().filter(order::Column::AssignedTo.eq(agent_id));

        if let Some(statuses) = statuses {
            let entity_statuses: Vec<order::OrderStatus> = statuses
                .iter()
                .map(|s| domain_status_to_entity(*s))
                .collect();
            query = query.filter(order::Column::Status.is_in(entity_statuses));
        }

        query.count(&self.db).await.map_err(db_err)
    }

    async fn recent(&self, limit: u64) -> DomainResult<Vec<OrderView>> {
        let rows = order::Entity::find()
            .order_by_desc(order::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        self.build_views(rows).await
    }
}
