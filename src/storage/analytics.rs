//! Aggregation queries over the analytics_events table
//!
//! These feed the dashboard metrics service. Grouping happens in SQL;
//! joins against menu entities, tie-breaking and bucket padding happen
//! in the service layer. Date bucketing uses backend-specific
//! expressions because there is no portable hour/weekday extraction.

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DbBackend, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect,
    sea_query::Expr,
};

use crate::errors::Result;
use migration::entities::analytics_event;

// ============ Query result rows ============

/// Event count per event type
#[derive(Debug, FromQueryResult)]
pub struct TypeCountRow {
    pub event_type: String,
    pub count: i64,
}

/// Group-by-count over a single column (device, platform, QR entrypoint)
#[derive(Debug, FromQueryResult)]
pub struct BreakdownRow {
    pub field_value: Option<String>,
    pub count: i64,
}

/// Event count per target entity
#[derive(Debug, FromQueryResult)]
pub struct EntityCountRow {
    pub entity_id: String,
    pub count: i64,
}

/// Event count per time bucket (hour-of-day or day-of-week)
#[derive(Debug, FromQueryResult)]
pub struct BucketRow {
    pub bucket: i64,
    pub count: i64,
}

/// Enter/leave event projection for dwell-time pairing
#[derive(Debug, Clone, FromQueryResult)]
pub struct TimingEventRow {
    pub session_id: String,
    pub entity_id: Option<String>,
    pub event_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    count: i64,
}

// ============ SeaOrmStorage analytics methods ============

impl super::SeaOrmStorage {
    fn hour_bucket_expr(&self) -> Expr {
        match self.db_backend() {
            DbBackend::Sqlite => Expr::cust("CAST(strftime('%H', created_at) AS INTEGER)"),
            DbBackend::MySql => Expr::cust("HOUR(created_at)"),
            _ => Expr::cust("CAST(EXTRACT(HOUR FROM created_at) AS INTEGER)"),
        }
    }

    /// Day-of-week bucket, 0 = Sunday on every backend
    fn weekday_bucket_expr(&self) -> Expr {
        match self.db_backend() {
            DbBackend::Sqlite => Expr::cust("CAST(strftime('%w', created_at) AS INTEGER)"),
            DbBackend::MySql => Expr::cust("DAYOFWEEK(created_at) - 1"),
            _ => Expr::cust("CAST(EXTRACT(DOW FROM created_at) AS INTEGER)"),
        }
    }

    /// Event counts grouped by type within the range
    pub async fn count_events_by_type(
        &self,
        restaurant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TypeCountRow>> {
        analytics_event::Entity::find()
            .select_only()
            .column(analytics_event::Column::EventType)
            .column_as(analytics_event::Column::Id.count(), "count")
            .filter(analytics_event::Column::RestaurantId.eq(restaurant_id))
            .filter(analytics_event::Column::CreatedAt.gte(start))
            .filter(analytics_event::Column::CreatedAt.lte(end))
            .group_by(analytics_event::Column::EventType)
            .into_model::<TypeCountRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Count of distinct session identifiers within the range
    pub async fn count_distinct_sessions(
        &self,
        restaurant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64> {
        let row = analytics_event::Entity::find()
            .select_only()
            .column_as(Expr::cust("COUNT(DISTINCT session_id)"), "count")
            .filter(analytics_event::Column::RestaurantId.eq(restaurant_id))
            .filter(analytics_event::Column::CreatedAt.gte(start))
            .filter(analytics_event::Column::CreatedAt.lte(end))
            .into_model::<CountRow>()
            .one(&self.db)
            .await?;

        Ok(row.map(|r| r.count.max(0) as u64).unwrap_or(0))
    }

    /// Per-entity event counts for one event type and entity type
    pub async fn count_entity_events(
        &self,
        restaurant_id: &str,
        event_type: &str,
        entity_type: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EntityCountRow>> {
        analytics_event::Entity::find()
            .select_only()
            .column(analytics_event::Column::EntityId)
            .column_as(analytics_event::Column::Id.count(), "count")
            .filter(analytics_event::Column::RestaurantId.eq(restaurant_id))
            .filter(analytics_event::Column::EventType.eq(event_type))
            .filter(analytics_event::Column::EntityType.eq(entity_type))
            .filter(analytics_event::Column::EntityId.is_not_null())
            .filter(analytics_event::Column::CreatedAt.gte(start))
            .filter(analytics_event::Column::CreatedAt.lte(end))
            .group_by(analytics_event::Column::EntityId)
            .order_by_desc(Expr::cust("count"))
            .into_model::<EntityCountRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Group-by-count over one column (device_type, platform, qr_entrypoint)
    pub async fn breakdown_by(
        &self,
        restaurant_id: &str,
        column: analytics_event::Column,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BreakdownRow>> {
        analytics_event::Entity::find()
            .select_only()
            .column_as(column, "field_value")
            .column_as(analytics_event::Column::Id.count(), "count")
            .filter(analytics_event::Column::RestaurantId.eq(restaurant_id))
            .filter(analytics_event::Column::CreatedAt.gte(start))
            .filter(analytics_event::Column::CreatedAt.lte(end))
            .group_by(column)
            .order_by_desc(Expr::cust("count"))
            .into_model::<BreakdownRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Event counts per hour of day (0-23)
    pub async fn bucket_by_hour(
        &self,
        restaurant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BucketRow>> {
        let expr = self.hour_bucket_expr();
        self.bucket_by(restaurant_id, expr, start, end).await
    }

    /// Event counts per day of week (0 = Sunday .. 6 = Saturday)
    pub async fn bucket_by_weekday(
        &self,
        restaurant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BucketRow>> {
        let expr = self.weekday_bucket_expr();
        self.bucket_by(restaurant_id, expr, start, end).await
    }

    async fn bucket_by(
        &self,
        restaurant_id: &str,
        bucket_expr: Expr,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BucketRow>> {
        analytics_event::Entity::find()
            .select_only()
            .column_as(bucket_expr.clone(), "bucket")
            .column_as(analytics_event::Column::Id.count(), "count")
            .filter(analytics_event::Column::RestaurantId.eq(restaurant_id))
            .filter(analytics_event::Column::CreatedAt.gte(start))
            .filter(analytics_event::Column::CreatedAt.lte(end))
            .group_by(bucket_expr)
            .order_by_asc(Expr::cust("bucket"))
            .into_model::<BucketRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Enter/leave events in range, ordered for deterministic pairing
    pub async fn list_timing_events(
        &self,
        restaurant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimingEventRow>> {
        analytics_event::Entity::find()
            .select_only()
            .column(analytics_event::Column::SessionId)
            .column(analytics_event::Column::EntityId)
            .column(analytics_event::Column::EventType)
            .column(analytics_event::Column::CreatedAt)
            .filter(analytics_event::Column::RestaurantId.eq(restaurant_id))
            .filter(analytics_event::Column::EventType.is_in(["enter", "leave"]))
            .filter(analytics_event::Column::CreatedAt.gte(start))
            .filter(analytics_event::Column::CreatedAt.lte(end))
            .order_by_asc(analytics_event::Column::CreatedAt)
            .order_by_asc(analytics_event::Column::Id)
            .into_model::<TimingEventRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }
}
