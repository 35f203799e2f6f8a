use actix_web::http::StatusCode;
use std::fmt;

#[derive(Debug, Clone)]
pub enum QrMenuError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    NotFound(String),
    Unauthorized(String),
    RateLimited { message: String, retry_after_secs: u64 },
    AuthUnavailable(String),
    Serialization(String),
    DateParse(String),
}

impl QrMenuError {
    /// Stable error code, used in logs
    pub fn code(&self) -> &'static str {
        match self {
            QrMenuError::DatabaseConfig(_) => "E001",
            QrMenuError::DatabaseConnection(_) => "E002",
            QrMenuError::DatabaseOperation(_) => "E003",
            QrMenuError::Validation(_) => "E004",
            QrMenuError::NotFound(_) => "E005",
            QrMenuError::Unauthorized(_) => "E006",
            QrMenuError::RateLimited { .. } => "E007",
            QrMenuError::AuthUnavailable(_) => "E008",
            QrMenuError::Serialization(_) => "E009",
            QrMenuError::DateParse(_) => "E010",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            QrMenuError::DatabaseConfig(_) => "Database Configuration Error",
            QrMenuError::DatabaseConnection(_) => "Database Connection Error",
            QrMenuError::DatabaseOperation(_) => "Database Operation Error",
            QrMenuError::Validation(_) => "Validation Error",
            QrMenuError::NotFound(_) => "Resource Not Found",
            QrMenuError::Unauthorized(_) => "Unauthorized",
            QrMenuError::RateLimited { .. } => "Rate Limited",
            QrMenuError::AuthUnavailable(_) => "Auth Provider Unavailable",
            QrMenuError::Serialization(_) => "Serialization Error",
            QrMenuError::DateParse(_) => "Date Parse Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            QrMenuError::DatabaseConfig(msg) => msg,
            QrMenuError::DatabaseConnection(msg) => msg,
            QrMenuError::DatabaseOperation(msg) => msg,
            QrMenuError::Validation(msg) => msg,
            QrMenuError::NotFound(msg) => msg,
            QrMenuError::Unauthorized(msg) => msg,
            QrMenuError::RateLimited { message, .. } => message,
            QrMenuError::AuthUnavailable(msg) => msg,
            QrMenuError::Serialization(msg) => msg,
            QrMenuError::DateParse(msg) => msg,
        }
    }

    /// HTTP status this error maps to at the API boundary
    pub fn http_status(&self) -> StatusCode {
        match self {
            QrMenuError::Validation(_) | QrMenuError::DateParse(_) => StatusCode::BAD_REQUEST,
            QrMenuError::NotFound(_) => StatusCode::NOT_FOUND,
            QrMenuError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            QrMenuError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            QrMenuError::AuthUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            QrMenuError::DatabaseConfig(_)
            | QrMenuError::DatabaseConnection(_)
            | QrMenuError::DatabaseOperation(_)
            | QrMenuError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Seconds until the caller may retry, for 429 responses
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            QrMenuError::RateLimited {
                retry_after_secs, ..
            } => Some(*retry_after_secs),
            _ => None,
        }
    }
}

impl fmt::Display for QrMenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for QrMenuError {}

// Convenience constructors
impl QrMenuError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        QrMenuError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        QrMenuError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        QrMenuError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        QrMenuError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        QrMenuError::NotFound(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        QrMenuError::Unauthorized(msg.into())
    }

    pub fn rate_limited<T: Into<String>>(msg: T, retry_after_secs: u64) -> Self {
        QrMenuError::RateLimited {
            message: msg.into(),
            retry_after_secs,
        }
    }

    pub fn auth_unavailable<T: Into<String>>(msg: T) -> Self {
        QrMenuError::AuthUnavailable(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        QrMenuError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        QrMenuError::DateParse(msg.into())
    }
}

impl From<sea_orm::DbErr> for QrMenuError {
    fn from(err: sea_orm::DbErr) -> Self {
        QrMenuError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for QrMenuError {
    fn from(err: std::io::Error) -> Self {
        QrMenuError::DatabaseConnection(err.to_string())
    }
}

impl From<serde_json::Error> for QrMenuError {
    fn from(err: serde_json::Error) -> Self {
        QrMenuError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for QrMenuError {
    fn from(err: chrono::ParseError) -> Self {
        QrMenuError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QrMenuError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(QrMenuError::validation("bad").code(), "E004");
        assert_eq!(QrMenuError::not_found("x").code(), "E005");
        assert_eq!(QrMenuError::rate_limited("slow down", 30).code(), "E007");
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            QrMenuError::validation("bad").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            QrMenuError::rate_limited("wait", 10).http_status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            QrMenuError::database_operation("boom").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            QrMenuError::auth_unavailable("probe timeout").http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_retry_after_only_on_rate_limited() {
        assert_eq!(
            QrMenuError::rate_limited("wait", 42).retry_after_secs(),
            Some(42)
        );
        assert_eq!(QrMenuError::validation("bad").retry_after_secs(), None);
    }

    #[test]
    fn test_display_format() {
        let err = QrMenuError::validation("rating out of range");
        assert_eq!(err.to_string(), "Validation Error: rating out of range");
    }
}
