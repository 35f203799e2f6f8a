//! API-wide constants

/// Fixed source tag stored on reviews submitted through the public menu
pub const REVIEW_SOURCE: &str = "public_menu";

/// Default menu language when the caller does not specify one
pub const DEFAULT_LANG: &str = "tr";

/// Maximum accepted JSON payload size in bytes
pub const MAX_JSON_PAYLOAD: usize = 64 * 1024;
