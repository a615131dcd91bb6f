use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::user_repository::db_err;
use crate::domain::{
    AgentProfile, AgentRepositoryInterface, DomainError, DomainResult, NewAgentProfile,
};
use crate::infrastructure::database::entities::agent;

pub struct AgentRepository {
    db: DatabaseConnection,
}

impl AgentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn agent_model_to_domain(model: agent::Model) -> AgentProfile {
    AgentProfile {
        id: model.id,
        user_id: model.user_id,
        vehicle_number: model.vehicle_number,
        vehicle_type: model.vehicle_type,
        active: model.active,
        current_latitude: model.current_latitude,
        current_longitude: model.current_longitude,
        created_at: model.created_at,
    }
}

#[async_trait]
impl AgentRepositoryInterface for AgentRepository {
    async fn create(&self, profile: NewAgentProfile) -> DomainResult<AgentProfile> {
        let row = agent::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            user_id: Set(profile.user_id),
            vehicle_number: Set(profile.vehicle_number),
            vehicle_type: Set(profile.vehicle_type),
            active: Set(true),
            current_latitude: Set(None),
            current_longitude: Set(None),
            created_at: Set(Utc::now()),
        };

        let inserted = row.insert(&self.db).await.map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE") || msg.contains("duplicate") {
                DomainError::Conflict("Agent profile already exists for this user".to_string())
            } else {
                db_err(e)
            }
        })?;

        Ok(agent_model_to_domain(inserted))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<AgentProfile>> {
        let found = agent::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(agent_model_to_domain))
    }

    async fn find_by_user_id(&self, user_id: &str) -> DomainResult<Option<AgentProfile>> {
        let found = agent::Entity::find()
            .filter(agent::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(agent_model_to_domain))
    }

    async fn list(&self, active: Option<bool>) -> DomainResult<Vec<AgentProfile>> {
        let mut query = agent::Entity::find().order_by_desc(agent::Column::CreatedAt);

        if let Some(active) = active {
            query = query.filter(agent::Column::Active.eq(active));
        }

        let rows = query.all(&self.db).await.map_err(db_err)?;
        Ok(rows.into_iter().map(agent_model_to_domain).collect())
    }

    async fn count(&self, active: Option<bool>) -> DomainResult<u64> {
        let mut query = agent::Entity::find();
        if let Some(active) = active {
            query = query.filter(agent::Column::Active.eq(active));
        }
        query.count(&self.db).await.map_err(db_err)
    }

    async fn update_location(
        &self,
        user_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> DomainResult<Option<AgentProfile>> {
        let Some(existing) = agent::Entity::find()
            .filter(agent::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut row: agent::ActiveModel = existing.into();
        row.current_latitude = Set(Some(latitude));
        row.current_longitude = Set(Some(longitude));

        let updated = row.update(&self.db).await.map_err(db_err)?;
        Ok(Some(agent_model_to_domain(updated)))
    }

    async fn set_active(&self, user_id: &str, active: bool) -> DomainResult<Option<AgentProfile>> {
        let Some(existing) = agent::Entity::find()
            .filter(agent::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut row: agent::ActiveModel = existing.into();
        row.active = Set(active);

        let updated = row.update(&self.db).await.map_err(db_err)?;
        Ok(Some(agent_model_to_domain(updated)))
    }
}
