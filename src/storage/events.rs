//! Write paths for telemetry events and public reviews

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::Set};
use tracing::debug;

use crate::errors::Result;
use migration::entities::{analytics_event, review};

/// Normalized analytics event ready for persistence.
///
/// Derived fields (`device_type`, `platform`, `user_agent_hash`) come
/// from the server-side resolver, never from the client.
#[derive(Debug, Clone)]
pub struct NewAnalyticsEvent {
    pub restaurant_id: String,
    pub event_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub qr_entrypoint: Option<String>,
    pub session_id: String,
    pub device_type: String,
    pub platform: String,
    pub user_agent_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Sanitized review ready for persistence
#[derive(Debug, Clone)]
pub struct NewReview {
    pub restaurant_id: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub source: String,
}

impl super::SeaOrmStorage {
    /// Persist one analytics event. Rows are append-only.
    pub async fn insert_event(&self, event: NewAnalyticsEvent) -> Result<()> {
        let model = analytics_event::ActiveModel {
            restaurant_id: Set(event.restaurant_id),
            event_type: Set(event.event_type),
            entity_type: Set(event.entity_type),
            entity_id: Set(event.entity_id),
            qr_entrypoint: Set(event.qr_entrypoint),
            session_id: Set(event.session_id),
            device_type: Set(event.device_type),
            platform: Set(event.platform),
            user_agent_hash: Set(event.user_agent_hash),
            created_at: Set(event.created_at),
            ..Default::default()
        };

        model.insert(&self.db).await?;
        Ok(())
    }

    /// Persist one review; returns its generated id.
    pub async fn insert_review(&self, new_review: NewReview) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();

        let model = review::ActiveModel {
            id: Set(id.clone()),
            restaurant_id: Set(new_review.restaurant_id),
            rating: Set(new_review.rating),
            comment: Set(new_review.comment),
            full_name: Set(new_review.full_name),
            phone: Set(new_review.phone),
            email: Set(new_review.email),
            source: Set(new_review.source),
            created_at: Set(Utc::now()),
        };

        model.insert(&self.db).await?;
        debug!("Review {} persisted", id);
        Ok(id)
    }
}
