pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20250601_000001_initial_tables;
mod m20250605_000001_reviews;
mod m20250610_000001_analytics_events;
mod m20250612_000001_user_agents_table;
mod m20250615_000001_analytics_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_initial_tables::Migration),
            Box::new(m20250605_000001_reviews::Migration),
            Box::new(m20250610_000001_analytics_events::Migration),
            Box::new(m20250612_000001_user_agents_table::Migration),
            Box::new(m20250615_000001_analytics_indexes::Migration),
        ]
    }
}
