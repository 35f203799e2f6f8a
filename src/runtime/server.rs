//! Server mode
//!
//! Configures and starts the HTTP server with the public API, dashboard
//! and health routes.

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Compress, web};
use anyhow::Result;
use tracing::warn;

use crate::api::constants::MAX_JSON_PAYLOAD;
use crate::api::middleware::{RequestIdMiddleware, SecurityHeaders};
use crate::api::services::{AppStartTime, api_routes, health_routes};
use crate::config::get_config;
use crate::runtime::startup;

/// Build CORS middleware from the configured origin list.
///
/// An empty list keeps the browser's same-origin default; "*" opens the
/// public API to any origin (credentials stay off either way).
fn build_cors_middleware(allowed_origins: &[String]) -> Cors {
    if allowed_origins.is_empty() {
        return Cors::default();
    }

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec!["Content-Type", "Authorization", "Accept"])
        .max_age(3600);

    if allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

/// Run the HTTP server until it exits
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let startup = startup::prepare_server_startup().await.map_err(|e| {
        tracing::error!("Server startup failed: {}", e);
        e
    })?;

    let storage = startup.storage.clone();
    let limiter = startup.limiter.clone();
    let correlator = startup.correlator.clone();
    let ua_store = startup.ua_store.clone();
    let ua_flusher = startup.ua_flusher.clone();
    let metrics_service = startup.metrics_service.clone();
    let auth = startup.auth.clone();

    let config = get_config();
    let allowed_origins = config.server.cors_allowed_origins.clone();

    let cpu_count = config.server.cpu_count.min(32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);

    HttpServer::new(move || {
        let cors = build_cors_middleware(&allowed_origins);

        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(SecurityHeaders)
            .wrap(cors)
            .wrap(Compress::default())
            .app_data(web::Data::from(storage.clone()))
            .app_data(web::Data::new(limiter.clone()))
            .app_data(web::Data::new(correlator.clone()))
            .app_data(web::Data::from(ua_store.clone()))
            .app_data(web::Data::from(ua_flusher.clone()))
            .app_data(web::Data::from(metrics_service.clone()))
            .app_data(web::Data::from(auth.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::PayloadConfig::new(MAX_JSON_PAYLOAD))
            .service(api_routes())
            .service(health_routes())
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count)
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
