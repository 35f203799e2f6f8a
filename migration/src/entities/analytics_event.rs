//! Analytics event entity for anonymous visitor telemetry
//!
//! Rows are immutable once inserted. `device_type` and `platform` are
//! derived server-side from the User-Agent header, never client-supplied.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "analytics_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub restaurant_id: String,
    /// "view", "click", "qr_scan", "enter" or "leave"
    pub event_type: String,
    /// "item" or "category" when the event targets a menu entity
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    /// Tag of the physical QR code that brought the visitor in
    pub qr_entrypoint: Option<String>,
    /// Anonymous browsing-session correlation key
    pub session_id: String,
    /// "mobile", "tablet" or "desktop"
    pub device_type: String,
    /// "android", "ios", "windows", "macos", "linux" or "unknown"
    pub platform: String,
    /// xxHash64 hex referencing user_agents.hash
    pub user_agent_hash: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
