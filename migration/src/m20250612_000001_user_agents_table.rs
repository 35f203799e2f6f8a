//! UserAgent deduplication table migration
//!
//! Raw UA strings are stored once, keyed by xxHash64, with the parsed
//! browser/OS breakdown alongside. Event rows reference the hash.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserAgents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserAgents::Hash)
                            .char_len(16)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserAgents::UserAgentString)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAgents::FirstSeen)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAgents::LastSeen)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserAgents::BrowserName).string_len(64).null())
                    .col(
                        ColumnDef::new(UserAgents::BrowserVersion)
                            .string_len(32)
                            .null(),
                    )
                    .col(ColumnDef::new(UserAgents::OsName).string_len(64).null())
                    .col(ColumnDef::new(UserAgents::OsVersion).string_len(32).null())
                    .col(
                        ColumnDef::new(UserAgents::DeviceCategory)
                            .string_len(32)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserAgents::IsBot)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserAgents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserAgents {
    #[sea_orm(iden = "user_agents")]
    Table,
    Hash,
    UserAgentString,
    FirstSeen,
    LastSeen,
    BrowserName,
    BrowserVersion,
    OsName,
    OsVersion,
    DeviceCategory,
    IsBot,
}
