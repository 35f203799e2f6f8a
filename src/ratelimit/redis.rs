//! Redis-backed rate-limit store
//!
//! INCR gives the atomic per-key counter; the first hit of a window also
//! sets a PEXPIRE so the key disappears at the boundary. Use this backend
//! when several instances must share limit state.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tokio::sync::RwLock;
use tracing::debug;

use super::{RateLimitStore, WindowState};
use crate::errors::{QrMenuError, Result};

pub struct RedisStore {
    client: redis::Client,
    /// Cached connection, established lazily and reused
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
}

impl RedisStore {
    pub fn new(url: &str, key_prefix: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            QrMenuError::database_config(format!("Invalid Redis URL for rate limiting: {}", e))
        })?;

        debug!("RedisStore created with prefix '{}'", key_prefix);

        Ok(Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix: key_prefix.to_string(),
        })
    }

    async fn get_connection(&self) -> Result<MultiplexedConnection> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // Double check: another task may have connected meanwhile
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                QrMenuError::database_connection(format!("Redis connection failed: {}", e))
            })?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis rate-limit connection established and cached");

        Ok(new_conn)
    }

    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis rate-limit connection reset due to error");
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl RateLimitStore for RedisStore {
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowState> {
        let mut conn = self.get_connection().await?;
        let full_key = self.make_key(key);
        let window_ms = window.as_millis() as i64;

        let count: i64 = match conn.incr(&full_key, 1i64).await {
            Ok(count) => count,
            Err(e) => {
                self.reset_connection().await;
                return Err(QrMenuError::database_operation(format!(
                    "Redis INCR failed: {}",
                    e
                )));
            }
        };

        // First hit of the window owns the expiry
        if count == 1 {
            let _: () = conn.pexpire(&full_key, window_ms).await.map_err(|e| {
                QrMenuError::database_operation(format!("Redis PEXPIRE failed: {}", e))
            })?;
        }

        let ttl_ms: i64 = conn.pttl(&full_key).await.map_err(|e| {
            QrMenuError::database_operation(format!("Redis PTTL failed: {}", e))
        })?;

        // Negative TTL means the key vanished between commands; treat it
        // as a fresh window
        let resets_in = if ttl_ms > 0 {
            Duration::from_millis(ttl_ms as u64)
        } else {
            window
        };

        Ok(WindowState {
            count: count.clamp(0, u32::MAX as i64) as u32,
            resets_in,
        })
    }
}
