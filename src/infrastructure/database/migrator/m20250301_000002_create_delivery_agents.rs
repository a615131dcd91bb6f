//! Create delivery_agents table

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DeliveryAgents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeliveryAgents::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DeliveryAgents::UserId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(DeliveryAgents::VehicleNumber)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeliveryAgents::VehicleType)
                            .string()
                            .not_null()
                            .default("motorcycle"),
                    )
                    .col(
                        ColumnDef::new(DeliveryAgents::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(DeliveryAgents::CurrentLatitude).double())
                    .col(ColumnDef::new(DeliveryAgents::CurrentLongitude).double())
                    .col(
                        ColumnDef::new(DeliveryAgents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_delivery_agents_user")
                            .from(DeliveryAgents::Table, DeliveryAgents::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_delivery_agents_active")
                    .table(DeliveryAgents::Table)
                    .col(DeliveryAgents::Active)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DeliveryAgents::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum DeliveryAgents {
    Table,
    Id,
    UserId,
    VehicleNumber,
    VehicleType,
    Active,
    CurrentLatitude,
    CurrentLongitude,
    CreatedAt,
}
