//! Reviews table migration
//!
//! Creates the reviews table for anonymous public feedback. Free-text
//! columns hold sanitized input only; rows are append-only.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reviews::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Reviews::RestaurantId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reviews::Rating).small_integer().not_null())
                    .col(ColumnDef::new(Reviews::Comment).text().null())
                    .col(ColumnDef::new(Reviews::FullName).string_len(80).null())
                    .col(ColumnDef::new(Reviews::Phone).string_len(32).null())
                    .col(ColumnDef::new(Reviews::Email).string_len(255).null())
                    .col(
                        ColumnDef::new(Reviews::Source)
                            .string_len(32)
                            .not_null()
                            .default("public_menu"),
                    )
                    .col(
                        ColumnDef::new(Reviews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_reviews_restaurant_time")
                    .table(Reviews::Table)
                    .col(Reviews::RestaurantId)
                    .col(Reviews::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_reviews_restaurant_time").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Reviews {
    #[sea_orm(iden = "reviews")]
    Table,
    Id,
    RestaurantId,
    Rating,
    Comment,
    FullName,
    Phone,
    Email,
    Source,
    CreatedAt,
}
