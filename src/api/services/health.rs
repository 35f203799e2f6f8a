//! Liveness endpoint

use actix_web::{Responder, Result as ActixResult, web};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::helpers::success_response;
use crate::storage::SeaOrmStorage;

/// Process start time, recorded once at boot
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: DateTime<Utc>,
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    uptime_secs: i64,
    storage_backend: String,
}

pub async fn health_check(
    storage: web::Data<SeaOrmStorage>,
    start_time: web::Data<AppStartTime>,
) -> ActixResult<impl Responder> {
    let uptime_secs = (Utc::now() - start_time.start_datetime).num_seconds();

    Ok(success_response(HealthStatus {
        status: "ok",
        uptime_secs,
        storage_backend: storage.backend_name().to_string(),
    }))
}
