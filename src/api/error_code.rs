//! Unified API error codes

use serde_repr::{Deserialize_repr, Serialize_repr};
use ts_rs::TS;

use super::types::TS_EXPORT_PATH;

/// API error code enum.
///
/// Serialized as a number via serde_repr; ts-rs keeps the dashboard
/// frontend in sync. Thousands digit groups the domain:
/// - 0: success
/// - 1000-1099: generic errors
/// - 2000-2099: auth errors
/// - 6000-6099: analytics errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[ts(rename = "ErrorCode")]
#[ts(repr(enum))]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // Generic errors 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    ServiceUnavailable = 1030,

    // Auth errors 2000-2099
    AuthFailed = 2000,
    RateLimitExceeded = 2004,

    // Analytics errors 6000-6099
    AnalyticsQueryFailed = 6000,
    AnalyticsInvalidDateRange = 6002,
}

impl From<&crate::errors::QrMenuError> for ErrorCode {
    fn from(err: &crate::errors::QrMenuError) -> Self {
        use crate::errors::QrMenuError;
        match err {
            QrMenuError::Validation(_) | QrMenuError::DateParse(_) => ErrorCode::BadRequest,
            QrMenuError::NotFound(_) => ErrorCode::NotFound,
            QrMenuError::Unauthorized(_) => ErrorCode::AuthFailed,
            QrMenuError::RateLimited { .. } => ErrorCode::RateLimitExceeded,
            QrMenuError::AuthUnavailable(_) => ErrorCode::ServiceUnavailable,
            QrMenuError::DatabaseConfig(_)
            | QrMenuError::DatabaseConnection(_)
            | QrMenuError::DatabaseOperation(_)
            | QrMenuError::Serialization(_) => ErrorCode::InternalServerError,
        }
    }
}
