//! API response helpers

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use tracing::error;

use super::error_code::ErrorCode;
use super::messages::{self, Lang};
use super::types::ApiResponse;
use crate::errors::QrMenuError;

/// Build a wrapped JSON response
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 200 OK with wrapped data
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// Error response with an explicit status and code
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 429 with the mandatory Retry-After header
pub fn rate_limited_response(lang: Lang, retry_after_secs: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .append_header(("Retry-After", retry_after_secs.to_string()))
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse::<()> {
            code: ErrorCode::RateLimitExceeded as i32,
            message: messages::rate_limited(lang).to_string(),
            data: None,
        })
}

/// Map a [`QrMenuError`] to a public response.
///
/// Validation and not-found messages pass through; anything internal is
/// logged server-side and replaced by the localized generic message so
/// no database detail leaks to anonymous callers.
pub fn error_from(err: &QrMenuError, lang: Lang) -> HttpResponse {
    let status = err.http_status();
    match err {
        QrMenuError::RateLimited {
            retry_after_secs, ..
        } => rate_limited_response(lang, *retry_after_secs),
        QrMenuError::Unauthorized(_) => error_response(
            status,
            ErrorCode::AuthFailed,
            messages::invalid_credentials(lang),
        ),
        QrMenuError::AuthUnavailable(_) => error_response(
            status,
            ErrorCode::ServiceUnavailable,
            messages::service_unavailable(lang),
        ),
        QrMenuError::Validation(_) | QrMenuError::DateParse(_) | QrMenuError::NotFound(_) => {
            error_response(status, ErrorCode::from(err), err.message())
        }
        _ => {
            error!("Internal error {}: {}", err.code(), err);
            error_response(
                status,
                ErrorCode::InternalServerError,
                messages::server_error(lang),
            )
        }
    }
}
