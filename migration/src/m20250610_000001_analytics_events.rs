//! Analytics events table migration
//!
//! Creates the analytics_events table for anonymous visitor telemetry:
//! - event type and optional target entity
//! - session correlation key
//! - server-derived device/platform classification
//! - QR entrypoint tag

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AnalyticsEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnalyticsEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::RestaurantId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::EventType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::EntityType)
                            .string_len(16)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::EntityId)
                            .string_len(36)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::QrEntrypoint)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::SessionId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::DeviceType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::Platform)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::UserAgentHash)
                            .char_len(16)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AnalyticsEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AnalyticsEvents {
    #[sea_orm(iden = "analytics_events")]
    Table,
    Id,
    RestaurantId,
    EventType,
    EntityType,
    EntityId,
    QrEntrypoint,
    SessionId,
    DeviceType,
    Platform,
    UserAgentHash,
    CreatedAt,
}
