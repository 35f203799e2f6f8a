//! Initial schema migration
//!
//! Creates the menu-platform core tables: restaurants, user_accounts,
//! menu_categories, menu_items, menu_translations, restaurant_events.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Restaurants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Restaurants::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Restaurants::Slug)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Restaurants::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Restaurants::DefaultLang)
                            .string_len(8)
                            .not_null()
                            .default("tr"),
                    )
                    .col(ColumnDef::new(Restaurants::Settings).text().null())
                    .col(
                        ColumnDef::new(Restaurants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserAccounts::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserAccounts::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(UserAccounts::PasswordHash)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAccounts::RestaurantId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAccounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MenuCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MenuCategories::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MenuCategories::RestaurantId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MenuCategories::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MenuCategories::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MenuCategories::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_menu_categories_restaurant")
                    .table(MenuCategories::Table)
                    .col(MenuCategories::RestaurantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MenuItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MenuItems::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MenuItems::RestaurantId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MenuItems::CategoryId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(ColumnDef::new(MenuItems::Name).string_len(255).not_null())
                    .col(ColumnDef::new(MenuItems::Description).text().null())
                    .col(ColumnDef::new(MenuItems::Price).big_integer().not_null())
                    .col(
                        ColumnDef::new(MenuItems::Currency)
                            .string_len(8)
                            .not_null()
                            .default("TRY"),
                    )
                    .col(
                        ColumnDef::new(MenuItems::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MenuItems::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_menu_items_restaurant")
                    .table(MenuItems::Table)
                    .col(MenuItems::RestaurantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_menu_items_category")
                    .table(MenuItems::Table)
                    .col(MenuItems::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MenuTranslations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MenuTranslations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MenuTranslations::RestaurantId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MenuTranslations::Locale)
                            .string_len(8)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MenuTranslations::EntityType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MenuTranslations::EntityId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MenuTranslations::Field)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(MenuTranslations::Value).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_menu_translations_lookup")
                    .table(MenuTranslations::Table)
                    .col(MenuTranslations::RestaurantId)
                    .col(MenuTranslations::Locale)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RestaurantEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RestaurantEvents::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RestaurantEvents::RestaurantId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RestaurantEvents::Title)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RestaurantEvents::Description).text().null())
                    .col(
                        ColumnDef::new(RestaurantEvents::StartsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RestaurantEvents::EndsAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RestaurantEvents::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_restaurant_events_restaurant")
                    .table(RestaurantEvents::Table)
                    .col(RestaurantEvents::RestaurantId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RestaurantEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MenuTranslations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MenuItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MenuCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Restaurants::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Restaurants {
    #[sea_orm(iden = "restaurants")]
    Table,
    Id,
    Slug,
    Name,
    DefaultLang,
    Settings,
    CreatedAt,
}

#[derive(DeriveIden)]
enum UserAccounts {
    #[sea_orm(iden = "user_accounts")]
    Table,
    Id,
    Email,
    PasswordHash,
    RestaurantId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum MenuCategories {
    #[sea_orm(iden = "menu_categories")]
    Table,
    Id,
    RestaurantId,
    Name,
    SortOrder,
    IsActive,
}

#[derive(DeriveIden)]
enum MenuItems {
    #[sea_orm(iden = "menu_items")]
    Table,
    Id,
    RestaurantId,
    CategoryId,
    Name,
    Description,
    Price,
    Currency,
    SortOrder,
    IsActive,
}

#[derive(DeriveIden)]
enum MenuTranslations {
    #[sea_orm(iden = "menu_translations")]
    Table,
    Id,
    RestaurantId,
    Locale,
    EntityType,
    EntityId,
    Field,
    Value,
}

#[derive(DeriveIden)]
enum RestaurantEvents {
    #[sea_orm(iden = "restaurant_events")]
    Table,
    Id,
    RestaurantId,
    Title,
    Description,
    StartsAt,
    EndsAt,
    IsActive,
}
