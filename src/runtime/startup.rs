//! Server startup preparation
//!
//! Builds every shared component once, before the worker pool spins up:
//! storage, rate limiter, session correlator, UA store, metrics and auth
//! services, plus the background tasks that keep them healthy.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::get_config;
use crate::ratelimit::FixedWindowLimiter;
use crate::services::auth_provider::{DegradableAuth, MemoryAuthProvider, SeaOrmAuthProvider};
use crate::services::metrics_service::MetricsService;
use crate::services::session::SessionCorrelator;
use crate::services::user_agent::{UaFlushScheduler, UserAgentStore};
use crate::storage::SeaOrmStorage;

/// How long a burst of new UA strings may settle before flushing
const UA_FLUSH_DEBOUNCE: Duration = Duration::from_millis(500);
/// Upper bound on UA flush delay regardless of traffic shape
const UA_FLUSH_INTERVAL: Duration = Duration::from_secs(30);

/// Shared components handed to the HTTP server
pub struct ServerStartup {
    pub storage: Arc<SeaOrmStorage>,
    pub limiter: FixedWindowLimiter,
    pub correlator: SessionCorrelator,
    pub ua_store: Arc<UserAgentStore>,
    pub ua_flusher: Arc<UaFlushScheduler>,
    pub metrics_service: Arc<MetricsService>,
    pub auth: Arc<DegradableAuth>,
}

pub async fn prepare_server_startup() -> Result<ServerStartup> {
    let config = get_config();

    let storage = Arc::new(SeaOrmStorage::new(&config.database.database_url).await?);

    let ua_store = Arc::new(UserAgentStore::new());
    match ua_store.load_known_hashes(storage.get_db()).await {
        Ok(count) => info!("UserAgent store primed with {} hashes", count),
        Err(e) => warn!("Could not prime UserAgent store: {}", e),
    }
    let ua_flusher = Arc::new(UaFlushScheduler::new(
        ua_store.clone(),
        storage.get_db().clone(),
        UA_FLUSH_DEBOUNCE,
    ));

    let limiter = FixedWindowLimiter::from_config(&config.rate_limit)?;
    info!("Rate limiter backend: {}", config.rate_limit.backend);

    let correlator = SessionCorrelator::from_config();
    let metrics_service = Arc::new(MetricsService::new(storage.clone()));

    let primary = Arc::new(SeaOrmAuthProvider::new(storage.clone()));
    let fallback = Arc::new(MemoryAuthProvider::new());
    let auth = Arc::new(DegradableAuth::new(primary, fallback, &config.auth));

    spawn_ua_flush_loop(ua_store.clone(), storage.clone());

    Ok(ServerStartup {
        storage,
        limiter,
        correlator,
        ua_store,
        ua_flusher,
        metrics_service,
        auth,
    })
}

/// Periodic flush so pending UA rows never sit longer than the interval,
/// even when the debounced path keeps getting rescheduled
fn spawn_ua_flush_loop(ua_store: Arc<UserAgentStore>, storage: Arc<SeaOrmStorage>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(UA_FLUSH_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = ua_store.flush_pending(storage.get_db()).await {
                warn!("Periodic UserAgent flush failed: {}", e);
            }
        }
    });
}
