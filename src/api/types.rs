//! API request/response types
//!
//! Required fields arrive as `Option` so the handlers can answer with a
//! localized message naming the missing field instead of a bare
//! deserialization error.

use serde::{Deserialize, Serialize};
use strum::AsRefStr;
use ts_rs::TS;

/// Generated TypeScript types for the dashboard frontend
pub const TS_EXPORT_PATH: &str = "../dashboard/src/services/types.generated.ts";

/// Telemetry event kinds accepted by the track endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    View,
    Click,
    QrScan,
    Enter,
    Leave,
}

impl std::str::FromStr for EventType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "click" => Ok(Self::Click),
            "qr_scan" => Ok(Self::QrScan),
            "enter" => Ok(Self::Enter),
            "leave" => Ok(Self::Leave),
            _ => Err(format!(
                "Unknown event type: '{}'. Valid: view, click, qr_scan, enter, leave",
                s
            )),
        }
    }
}

/// Menu entity kinds an event may target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityType {
    Item,
    Category,
}

impl std::str::FromStr for EntityType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "item" => Ok(Self::Item),
            "category" => Ok(Self::Category),
            _ => Err(format!(
                "Unknown entity type: '{}'. Valid: item, category",
                s
            )),
        }
    }
}

// ============ Public surface ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct TrackEventRequest {
    pub restaurant_id: Option<String>,
    pub event_type: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub qr_entrypoint: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct TrackEventResponse {
    pub success: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PublicReviewRequest {
    pub restaurant_id: Option<String>,
    /// f64 so fractional ratings reach the validator and fail there
    pub rating: Option<f64>,
    pub comment: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PublicReviewResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PublicMenuQuery {
    pub slug: Option<String>,
    pub lang: Option<String>,
}

// ============ Auth ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "restaurantName")]
    pub restaurant_name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct UserSummary {
    pub id: String,
    pub email: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct RestaurantSummary {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct AuthSuccessResponse {
    pub user: UserSummary,
    pub restaurant: Option<RestaurantSummary>,
    pub access_token: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
}

// ============ Dashboard ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct MetricsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

// ============ Envelope ============

/// Error/data envelope used by wrapped endpoints
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_event_type_parsing() {
        assert_eq!(EventType::from_str("view").unwrap(), EventType::View);
        assert_eq!(EventType::from_str("qr_scan").unwrap(), EventType::QrScan);
        assert!(EventType::from_str("purchase").is_err());
        assert!(EventType::from_str("").is_err());
    }

    #[test]
    fn test_event_type_wire_form() {
        assert_eq!(EventType::QrScan.as_ref(), "qr_scan");
        assert_eq!(EventType::View.as_ref(), "view");
        assert_eq!(EntityType::Item.as_ref(), "item");
    }

    #[test]
    fn test_track_request_tolerates_missing_fields() {
        let req: TrackEventRequest = serde_json::from_str("{}").unwrap();
        assert!(req.restaurant_id.is_none());
        assert!(req.event_type.is_none());
    }

    #[test]
    fn test_review_request_accepts_fractional_rating() {
        // Deserialization succeeds; the validator rejects it later
        let req: PublicReviewRequest =
            serde_json::from_str(r#"{"restaurant_id":"r1","rating":3.5}"#).unwrap();
        assert_eq!(req.rating, Some(3.5));
    }
}
