//! SeaORM storage backend
//!
//! All database access goes through [`SeaOrmStorage`]. SQLite, MySQL and
//! PostgreSQL are supported; the backend is inferred from the URL.

mod analytics;
mod connection;
mod events;
mod menu;

pub use analytics::{BreakdownRow, BucketRow, EntityCountRow, TimingEventRow, TypeCountRow};
pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use events::{NewAnalyticsEvent, NewReview};

use std::time::Duration;

use moka::sync::Cache;
use sea_orm::{DatabaseConnection, DbBackend};
use tracing::warn;

use crate::errors::{QrMenuError, Result};

/// Infer the database backend from the connection URL
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(QrMenuError::database_config(format!(
            "Cannot infer database backend from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    /// Public menu payload cache (TTL-bounded)
    menu_cache: Cache<String, serde_json::Value>,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(QrMenuError::database_config("DATABASE_URL is not set"));
        }

        let backend_name = infer_backend_from_url(database_url)?;

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, &backend_name).await?
        };

        let storage = Self::with_connection(db, &backend_name);

        run_migrations(&storage.db).await?;

        warn!(
            "{} storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    /// Wrap an existing connection without running migrations.
    ///
    /// Used by tests that manage their own schema setup.
    pub fn with_connection(db: DatabaseConnection, backend_name: &str) -> Self {
        let cache_config = &crate::config::get_config().cache;
        Self {
            db,
            backend_name: backend_name.to_string(),
            menu_cache: Cache::builder()
                .time_to_live(Duration::from_secs(cache_config.menu_ttl_secs))
                .max_capacity(cache_config.menu_max_capacity)
                .build(),
        }
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    pub(crate) fn db_backend(&self) -> DbBackend {
        match self.backend_name.as_str() {
            "sqlite" => DbBackend::Sqlite,
            "mysql" => DbBackend::MySql,
            _ => DbBackend::Postgres,
        }
    }

    pub fn menu_cache(&self) -> &Cache<String, serde_json::Value> {
        &self.menu_cache
    }

    /// Drop cached menu payloads (called when menu data changes)
    pub fn invalidate_menu_cache(&self) {
        self.menu_cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(infer_backend_from_url("sqlite://menu.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("menu.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url(":memory:").unwrap(), "sqlite");
        assert_eq!(
            infer_backend_from_url("mysql://user@host/db").unwrap(),
            "mysql"
        );
        assert_eq!(
            infer_backend_from_url("postgres://user@host/db").unwrap(),
            "postgres"
        );
        assert!(infer_backend_from_url("mongodb://host/db").is_err());
    }
}
