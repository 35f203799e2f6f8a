//! Anonymous telemetry ingestion
//!
//! POST /api/analytics/track. Fire-and-forget: no rate limit is applied
//! here, unlike the review and auth endpoints. Device and platform are
//! derived from the User-Agent header on the server; nothing
//! classification-related is trusted from the payload.

use std::str::FromStr;

use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, Responder, Result as ActixResult, web};
use chrono::Utc;
use tracing::{debug, error};

use crate::api::error_code::ErrorCode;
use crate::api::helpers::error_response;
use crate::api::messages::{self, Lang};
use crate::api::types::{EntityType, EventType, TrackEventRequest, TrackEventResponse};
use crate::services::session::SessionCorrelator;
use crate::services::user_agent::{UaFlushScheduler, UserAgentStore, parse_user_agent};
use crate::storage::{NewAnalyticsEvent, SeaOrmStorage};

pub async fn track_event(
    req: HttpRequest,
    body: web::Json<TrackEventRequest>,
    storage: web::Data<SeaOrmStorage>,
    correlator: web::Data<SessionCorrelator>,
    ua_store: web::Data<UserAgentStore>,
    ua_flusher: web::Data<UaFlushScheduler>,
) -> ActixResult<impl Responder> {
    let lang = Lang::from_request(&req);
    let body = body.into_inner();

    let Some(restaurant_id) = body.restaurant_id.filter(|id| !id.is_empty()) else {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &messages::missing_field(lang, "restaurant_id"),
        ));
    };

    let Some(raw_event_type) = body.event_type.filter(|t| !t.is_empty()) else {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &messages::missing_field(lang, "event_type"),
        ));
    };

    let Ok(event_type) = EventType::from_str(&raw_event_type) else {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &messages::invalid_field(lang, "event_type"),
        ));
    };

    let entity_type = match body.entity_type.as_deref().filter(|t| !t.is_empty()) {
        Some(raw) => match EntityType::from_str(raw) {
            Ok(entity_type) => Some(entity_type),
            Err(_) => {
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::BadRequest,
                    &messages::invalid_field(lang, "entity_type"),
                ));
            }
        },
        None => None,
    };

    // Session correlation: reuse the cookie, mint one when absent
    let session = correlator.resolve(&req);

    // Server-side derivation from the raw UA header
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    let client = parse_user_agent(user_agent);
    let user_agent_hash = if user_agent.is_empty() {
        None
    } else {
        Some(ua_store.get_or_create_hash(user_agent))
    };

    let event = NewAnalyticsEvent {
        restaurant_id,
        event_type: event_type.as_ref().to_string(),
        entity_type: entity_type.map(|t| t.as_ref().to_string()),
        entity_id: body.entity_id.filter(|id| !id.is_empty()),
        qr_entrypoint: body.qr_entrypoint.filter(|q| !q.is_empty()),
        session_id: session.id.clone(),
        device_type: client.device_type.as_ref().to_string(),
        platform: client.platform.as_ref().to_string(),
        user_agent_hash,
        created_at: Utc::now(),
    };

    if let Err(e) = storage.insert_event(event).await {
        error!("Failed to persist analytics event: {}", e);
        return Ok(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
            messages::server_error(lang),
        ));
    }

    ua_flusher.schedule_flush();

    debug!(
        "Tracked {} event for session {}",
        event_type.as_ref(),
        session.id
    );

    let mut response = HttpResponse::Ok().json(TrackEventResponse { success: true });
    if let Some(cookie) = session.cookie {
        let _ = response.add_cookie(&cookie);
    }
    Ok(response)
}
