//! Analytics query indexes
//!
//! Added after the first dashboards went live: the aggregator filters by
//! restaurant + time range on every query, and the per-type counters
//! benefit from the (restaurant, event_type) composite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_restaurant_time")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::RestaurantId)
                    .col(AnalyticsEvents::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_restaurant_type")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::RestaurantId)
                    .col(AnalyticsEvents::EventType)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_session")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::SessionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_session")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_restaurant_type")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_restaurant_time")
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum AnalyticsEvents {
    #[sea_orm(iden = "analytics_events")]
    Table,
    RestaurantId,
    EventType,
    SessionId,
    CreatedAt,
}
