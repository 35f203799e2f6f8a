//! Owner authentication with degraded-mode fallback
//!
//! Handlers talk to [`DegradableAuth`], which probes the primary
//! database-backed provider with a bounded timeout on every auth
//! operation. When the probe fails the login path is served by an
//! in-memory fallback behind the same [`AuthProvider`] interface;
//! registration always requires the primary store and reports the
//! outage instead.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sea_orm::ActiveValue::Set;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::errors::{QrMenuError, Result};
use crate::storage::SeaOrmStorage;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::throttle::Throttle;
use migration::entities::{restaurant, user_account};

/// Authenticated owner identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub restaurant_id: String,
}

/// Registration input, validated and sanitized by the caller
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub restaurant_name: String,
    pub slug: String,
}

/// Result of a successful registration
#[derive(Debug, Clone)]
pub struct ProvisionedAccount {
    pub user: AuthUser,
    pub restaurant_name: String,
    pub restaurant_slug: String,
}

/// Reachability of the primary auth backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    Available,
    Degraded,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Cheap reachability check; the wrapper bounds it with a timeout
    async fn probe(&self) -> Result<()>;

    /// Verify credentials. `Ok(None)` covers both unknown account and
    /// wrong password so callers cannot distinguish the two.
    async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<AuthUser>>;

    /// Provision a new owner account with its restaurant
    async fn register(&self, account: NewAccount) -> Result<ProvisionedAccount>;
}

// ============ Primary provider (database-backed) ============

pub struct SeaOrmAuthProvider {
    storage: Arc<SeaOrmStorage>,
}

impl SeaOrmAuthProvider {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl AuthProvider for SeaOrmAuthProvider {
    async fn probe(&self) -> Result<()> {
        self.storage.get_db().ping().await.map_err(Into::into)
    }

    async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<AuthUser>> {
        let Some(account) = self.storage.find_account_by_email(email).await? else {
            return Ok(None);
        };

        let valid = verify_password(password, &account.password_hash)
            .map_err(|e| QrMenuError::unauthorized(e.to_string()))?;

        if valid {
            Ok(Some(AuthUser {
                id: account.id,
                email: account.email,
                restaurant_id: account.restaurant_id,
            }))
        } else {
            Ok(None)
        }
    }

    async fn register(&self, account: NewAccount) -> Result<ProvisionedAccount> {
        if self.storage.email_exists(&account.email).await? {
            return Err(QrMenuError::validation("email is already registered"));
        }
        if self.storage.slug_exists(&account.slug).await? {
            return Err(QrMenuError::validation("slug is already taken"));
        }

        let password_hash = hash_password(&account.password)
            .map_err(|e| QrMenuError::database_operation(format!("Password hash failed: {}", e)))?;

        let now = Utc::now();
        let restaurant_id = Uuid::new_v4().to_string();
        let user_id = Uuid::new_v4().to_string();

        self.storage
            .insert_restaurant(restaurant::ActiveModel {
                id: Set(restaurant_id.clone()),
                slug: Set(account.slug.clone()),
                name: Set(account.restaurant_name.clone()),
                default_lang: Set("tr".to_string()),
                settings: Set(None),
                created_at: Set(now),
            })
            .await?;

        self.storage
            .insert_account(user_account::ActiveModel {
                id: Set(user_id.clone()),
                email: Set(account.email.clone()),
                password_hash: Set(password_hash),
                restaurant_id: Set(restaurant_id.clone()),
                created_at: Set(now),
            })
            .await?;

        debug!(
            "Provisioned account {} with restaurant '{}'",
            account.email, account.slug
        );

        Ok(ProvisionedAccount {
            user: AuthUser {
                id: user_id,
                email: account.email,
                restaurant_id,
            },
            restaurant_name: account.restaurant_name,
            restaurant_slug: account.slug,
        })
    }
}

// ============ Fallback provider (in-memory) ============

#[derive(Clone)]
struct MemoryAccount {
    id: String,
    email: String,
    password_hash: String,
    restaurant_id: String,
}

/// In-memory provider used while the primary store is unreachable.
///
/// State dies with the process; this keeps read-side auth alive during
/// short outages, nothing more.
#[derive(Default)]
pub struct MemoryAuthProvider {
    accounts: DashMap<String, MemoryAccount>,
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account, e.g. mirrored from the primary before an outage
    pub fn seed_account(&self, email: &str, password: &str, restaurant_id: &str) -> Result<()> {
        let password_hash = hash_password(password)
            .map_err(|e| QrMenuError::database_operation(format!("Password hash failed: {}", e)))?;
        self.accounts.insert(
            email.to_string(),
            MemoryAccount {
                id: Uuid::new_v4().to_string(),
                email: email.to_string(),
                password_hash,
                restaurant_id: restaurant_id.to_string(),
            },
        );
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn probe(&self) -> Result<()> {
        Ok(())
    }

    async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<AuthUser>> {
        let Some(account) = self.accounts.get(email).map(|a| a.clone()) else {
            return Ok(None);
        };

        let valid = verify_password(password, &account.password_hash)
            .map_err(|e| QrMenuError::unauthorized(e.to_string()))?;

        if valid {
            Ok(Some(AuthUser {
                id: account.id,
                email: account.email,
                restaurant_id: account.restaurant_id,
            }))
        } else {
            Ok(None)
        }
    }

    async fn register(&self, account: NewAccount) -> Result<ProvisionedAccount> {
        if self.accounts.contains_key(&account.email) {
            return Err(QrMenuError::validation("email is already registered"));
        }

        let password_hash = hash_password(&account.password)
            .map_err(|e| QrMenuError::database_operation(format!("Password hash failed: {}", e)))?;

        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
            email: account.email.clone(),
            restaurant_id: Uuid::new_v4().to_string(),
        };

        self.accounts.insert(
            account.email.clone(),
            MemoryAccount {
                id: user.id.clone(),
                email: account.email,
                password_hash,
                restaurant_id: user.restaurant_id.clone(),
            },
        );

        Ok(ProvisionedAccount {
            user,
            restaurant_name: account.restaurant_name,
            restaurant_slug: account.slug,
        })
    }
}

// ============ Degradable wrapper ============

/// Routes auth operations to the primary provider, falling back when a
/// timeout-bounded reachability probe fails.
pub struct DegradableAuth {
    primary: Arc<dyn AuthProvider>,
    fallback: Arc<dyn AuthProvider>,
    probe_timeout: Duration,
    fallback_enabled: bool,
    /// Bounds how often the degraded state is logged
    degraded_log: Throttle,
}

impl DegradableAuth {
    pub fn new(
        primary: Arc<dyn AuthProvider>,
        fallback: Arc<dyn AuthProvider>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            primary,
            fallback,
            probe_timeout: Duration::from_secs(config.probe_timeout_secs),
            fallback_enabled: config.fallback_enabled,
            degraded_log: Throttle::new(Duration::from_secs(30)),
        }
    }

    /// Probe the primary provider, bounded by the configured timeout
    pub async fn status(&self) -> ProviderStatus {
        match tokio::time::timeout(self.probe_timeout, self.primary.probe()).await {
            Ok(Ok(())) => ProviderStatus::Available,
            Ok(Err(e)) => {
                self.log_degraded(&format!("probe failed: {}", e));
                ProviderStatus::Degraded
            }
            Err(_) => {
                self.log_degraded("probe timed out");
                ProviderStatus::Degraded
            }
        }
    }

    fn log_degraded(&self, reason: &str) {
        self.degraded_log
            .run(|| warn!("Auth provider degraded: {}", reason));
    }

    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<AuthUser>> {
        match self.status().await {
            ProviderStatus::Available => self.primary.verify_credentials(email, password).await,
            ProviderStatus::Degraded if self.fallback_enabled => {
                self.fallback.verify_credentials(email, password).await
            }
            ProviderStatus::Degraded => Err(QrMenuError::auth_unavailable(
                "authentication backend unreachable",
            )),
        }
    }

    /// Registration provisions durable rows, so it always needs the
    /// primary store
    pub async fn register(&self, account: NewAccount) -> Result<ProvisionedAccount> {
        match self.status().await {
            ProviderStatus::Available => self.primary.register(account).await,
            ProviderStatus::Degraded => Err(QrMenuError::auth_unavailable(
                "registration requires the primary auth backend",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UnreachableProvider;

    #[async_trait]
    impl AuthProvider for UnreachableProvider {
        async fn probe(&self) -> Result<()> {
            Err(QrMenuError::database_connection("connection refused"))
        }

        async fn verify_credentials(&self, _: &str, _: &str) -> Result<Option<AuthUser>> {
            Err(QrMenuError::database_connection("connection refused"))
        }

        async fn register(&self, _: NewAccount) -> Result<ProvisionedAccount> {
            Err(QrMenuError::database_connection("connection refused"))
        }
    }

    struct HangingProvider;

    #[async_trait]
    impl AuthProvider for HangingProvider {
        async fn probe(&self) -> Result<()> {
            std::future::pending().await
        }

        async fn verify_credentials(&self, _: &str, _: &str) -> Result<Option<AuthUser>> {
            std::future::pending().await
        }

        async fn register(&self, _: NewAccount) -> Result<ProvisionedAccount> {
            std::future::pending().await
        }
    }

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: String::new(),
            access_token_minutes: 60,
            probe_timeout_secs: 3,
            fallback_enabled: true,
        }
    }

    #[tokio::test]
    async fn test_memory_provider_register_and_login() {
        let provider = MemoryAuthProvider::new();

        let provisioned = provider
            .register(NewAccount {
                email: "owner@example.com".into(),
                password: "Sifre123".into(),
                restaurant_name: "Kozbeyli Konağı".into(),
                slug: "kozbeyli-konagi".into(),
            })
            .await
            .unwrap();
        assert_eq!(provisioned.restaurant_slug, "kozbeyli-konagi");

        let user = provider
            .verify_credentials("owner@example.com", "Sifre123")
            .await
            .unwrap();
        assert!(user.is_some());

        let wrong = provider
            .verify_credentials("owner@example.com", "yanlis-sifre")
            .await
            .unwrap();
        assert!(wrong.is_none());

        let unknown = provider
            .verify_credentials("nobody@example.com", "Sifre123")
            .await
            .unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn test_memory_provider_rejects_duplicate_email() {
        let provider = MemoryAuthProvider::new();
        let account = NewAccount {
            email: "owner@example.com".into(),
            password: "Sifre123".into(),
            restaurant_name: "Test".into(),
            slug: "test-restoran".into(),
        };

        provider.register(account.clone()).await.unwrap();
        let duplicate = provider.register(account).await;
        assert!(matches!(duplicate, Err(QrMenuError::Validation(_))));
    }

    #[tokio::test]
    async fn test_degraded_status_on_probe_failure() {
        let auth = DegradableAuth::new(
            Arc::new(UnreachableProvider),
            Arc::new(MemoryAuthProvider::new()),
            &test_config(),
        );
        assert_eq!(auth.status().await, ProviderStatus::Degraded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_degraded_status_on_probe_timeout() {
        let auth = DegradableAuth::new(
            Arc::new(HangingProvider),
            Arc::new(MemoryAuthProvider::new()),
            &test_config(),
        );
        assert_eq!(auth.status().await, ProviderStatus::Degraded);
    }

    #[tokio::test]
    async fn test_login_falls_back_while_degraded() {
        let fallback = Arc::new(MemoryAuthProvider::new());
        fallback
            .seed_account("owner@example.com", "Sifre123", "r1")
            .unwrap();

        let auth = DegradableAuth::new(Arc::new(UnreachableProvider), fallback, &test_config());

        let user = auth
            .verify_credentials("owner@example.com", "Sifre123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.restaurant_id, "r1");
    }

    #[tokio::test]
    async fn test_login_fails_when_fallback_disabled() {
        let mut config = test_config();
        config.fallback_enabled = false;

        let auth = DegradableAuth::new(
            Arc::new(UnreachableProvider),
            Arc::new(MemoryAuthProvider::new()),
            &config,
        );

        let result = auth.verify_credentials("owner@example.com", "Sifre123").await;
        assert!(matches!(result, Err(QrMenuError::AuthUnavailable(_))));
    }

    #[tokio::test]
    async fn test_register_requires_primary() {
        let auth = DegradableAuth::new(
            Arc::new(UnreachableProvider),
            Arc::new(MemoryAuthProvider::new()),
            &test_config(),
        );

        let result = auth
            .register(NewAccount {
                email: "owner@example.com".into(),
                password: "Sifre123".into(),
                restaurant_name: "Test".into(),
                slug: "test-restoran".into(),
            })
            .await;
        assert!(matches!(result, Err(QrMenuError::AuthUnavailable(_))));
    }
}
