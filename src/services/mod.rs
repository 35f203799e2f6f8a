//! Business services shared by the HTTP handlers

pub mod auth_provider;
pub mod metrics_service;
pub mod session;
pub mod user_agent;

pub use auth_provider::{
    AuthProvider, DegradableAuth, MemoryAuthProvider, ProviderStatus, SeaOrmAuthProvider,
};
pub use metrics_service::MetricsService;
pub use session::SessionCorrelator;
pub use user_agent::{UaFlushScheduler, UserAgentStore, parse_user_agent};
