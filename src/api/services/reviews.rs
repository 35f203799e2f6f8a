//! Public review submission
//!
//! POST /api/reviews/public. Validation order: rate limit by requester
//! IP, required fields, rating range, email format, then sanitization
//! and persistence. The success body never echoes stored data.

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, Result as ActixResult, web};
use tracing::{debug, error};

use crate::api::constants::REVIEW_SOURCE;
use crate::api::error_code::ErrorCode;
use crate::api::helpers::{error_response, rate_limited_response};
use crate::api::messages::{self, Lang};
use crate::api::types::{PublicReviewRequest, PublicReviewResponse};
use crate::ratelimit::{FixedWindowLimiter, REVIEW_POLICY, ip_key};
use crate::storage::{NewReview, SeaOrmStorage};
use crate::utils::ip::extract_client_ip;
use crate::utils::sanitize::{sanitize_comment, sanitize_name, sanitize_phone};
use crate::utils::validators::{is_valid_email, is_valid_rating};

pub async fn submit_review(
    req: HttpRequest,
    body: web::Json<PublicReviewRequest>,
    storage: web::Data<SeaOrmStorage>,
    limiter: web::Data<FixedWindowLimiter>,
) -> ActixResult<impl Responder> {
    let lang = Lang::from_request(&req);
    let body = body.into_inner();

    // Rate limit before touching any input
    let client_ip = extract_client_ip(&req).unwrap_or_else(|| "unknown".to_string());
    let decision = limiter
        .check(&ip_key("review", &client_ip), REVIEW_POLICY)
        .await;
    if !decision.allowed {
        debug!("Review rate limit hit for {}", client_ip);
        return Ok(rate_limited_response(lang, decision.retry_after_secs()));
    }

    let Some(restaurant_id) = body.restaurant_id.filter(|id| !id.is_empty()) else {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &messages::missing_field(lang, "restaurant_id"),
        ));
    };

    let Some(rating) = body.rating else {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &messages::missing_field(lang, "rating"),
        ));
    };

    if !is_valid_rating(rating) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &messages::invalid_field(lang, "rating"),
        ));
    }

    let email = match body.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()) {
        Some(email) => {
            if !is_valid_email(&email) {
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::BadRequest,
                    &messages::invalid_field(lang, "email"),
                ));
            }
            Some(email)
        }
        None => None,
    };

    let comment = body
        .comment
        .map(|c| sanitize_comment(&c))
        .filter(|c| !c.is_empty());
    let full_name = body
        .full_name
        .map(|n| sanitize_name(&n))
        .filter(|n| !n.is_empty());
    let phone = body
        .phone
        .map(|p| sanitize_phone(&p))
        .filter(|p| !p.is_empty());

    let review = NewReview {
        restaurant_id,
        rating: rating as i16,
        comment,
        full_name,
        phone,
        email,
        source: REVIEW_SOURCE.to_string(),
    };

    if let Err(e) = storage.insert_review(review).await {
        error!("Failed to persist review: {}", e);
        return Ok(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
            messages::server_error(lang),
        ));
    }

    Ok(HttpResponse::Ok().json(PublicReviewResponse {
        success: true,
        message: messages::review_received(lang).to_string(),
    }))
}
