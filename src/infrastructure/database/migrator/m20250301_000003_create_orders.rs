//! Create orders table

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users::Users;
use super::m20250301_000002_create_delivery_agents::DeliveryAgents;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::UserId).string().not_null())
                    .col(ColumnDef::new(Orders::AssignedTo).string())
                    .col(
                        ColumnDef::new(Orders::CurrentLocation)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::Latitude).double().not_null())
                    .col(ColumnDef::new(Orders::Longitude).double().not_null())
                    .col(
                        ColumnDef::new(Orders::BatteryType)
                            .string()
                            .not_null()
                            .default("standard"),
                    )
                    .col(ColumnDef::new(Orders::VehicleModel).string())
                    .col(
                        ColumnDef::new(Orders::ChargeLevel)
                            .string()
                            .not_null()
                            .default("0-20%"),
                    )
                    .col(
                        ColumnDef::new(Orders::Amount)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Orders::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Orders::PaymentStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::AssignedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Orders::CompletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_user")
                            .from(Orders::Table, Orders::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_agent")
                            .from(Orders::Table, Orders::AssignedTo)
                            .to(DeliveryAgents::Table, DeliveryAgents::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_status")
                    .table(Orders::Table)
                    .col(Orders::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_user")
                    .table(Orders::Table)
                    .col(Orders::UserId)
                    .to_owned(),
            )
            .await?;

        // Per-agent workload counts filter on assigned_to
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_assigned_to")
                    .table(Orders::Table)
                    .col(Orders::AssignedTo)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Orders {
    Table,
    Id,
    UserId,
    AssignedTo,
    CurrentLocation,
    Latitude,
    Longitude,
    BatteryType,
    VehicleModel,
    ChargeLevel,
    Amount,
    Status,
    PaymentStatus,
    CreatedAt,
    AssignedAt,
    CompletedAt,
}
