//! Owner dashboard metrics
//!
//! GET /api/dashboard/metrics. Bearer-token guarded; the restaurant
//! scope comes from the token claims, never from the query string.

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, Responder, Result as ActixResult, web};
use tracing::debug;

use crate::api::error_code::ErrorCode;
use crate::api::helpers::{error_from, error_response, success_response};
use crate::api::jwt::get_jwt_service;
use crate::api::messages::Lang;
use crate::api::types::MetricsQuery;
use crate::services::metrics_service::MetricsService;

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn metrics(
    req: HttpRequest,
    query: web::Query<MetricsQuery>,
    metrics_service: web::Data<MetricsService>,
) -> ActixResult<impl Responder> {
    let lang = Lang::from_request(&req);

    let Some(token) = bearer_token(&req) else {
        return Ok(error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized,
            "Missing bearer token",
        ));
    };

    let claims = match get_jwt_service().validate_access_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!("Dashboard token rejected: {}", e);
            return Ok(error_response(
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
                "Invalid or expired token",
            ));
        }
    };

    let range = MetricsService::parse_date_range_strict(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    );
    let (start, end) = match range {
        Ok(range) => range,
        Err(e) => {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::AnalyticsInvalidDateRange,
                e.message(),
            ));
        }
    };

    match metrics_service
        .compute_metrics(&claims.restaurant_id, start, end)
        .await
    {
        Ok(metrics) => Ok(success_response(metrics)),
        Err(e) => Ok(error_from(&e, lang)),
    }
}
