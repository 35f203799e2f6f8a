//! User-Agent classification and deduplication
//!
//! Two concerns live here:
//!
//! 1. [`parse_user_agent`] derives the device/platform pair stored on
//!    every analytics event. Checks run in a fixed order because UA
//!    substrings overlap: android/ios must be tested before the generic
//!    desktop OS markers (an iPad UA would otherwise match "mac").
//! 2. [`UserAgentStore`] deduplicates raw UA strings into the
//!    user_agents table, keyed by xxHash64, with woothee supplying the
//!    browser/bot breakdown. New strings are parsed once and batched to
//!    reduce database pressure.

use chrono::Utc;
use dashmap::{DashMap, DashSet};
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait, sea_query::OnConflict};
use serde::{Deserialize, Serialize};
use strum::AsRefStr;
use tracing::debug;
use woothee::parser::Parser;
use xxhash_rust::xxh64::xxh64;

use migration::entities::user_agent;

/// Device class derived from the User-Agent header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
}

/// Operating platform derived from the User-Agent header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Windows,
    Macos,
    Linux,
    Unknown,
}

/// Server-derived client classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientInfo {
    pub device_type: DeviceType,
    pub platform: Platform,
}

const MOBILE_MARKERS: [&str; 5] = ["mobi", "android", "iphone", "ipod", "windows phone"];
const TABLET_MARKERS: [&str; 2] = ["ipad", "tablet"];

/// Classify a raw User-Agent string.
///
/// Deterministic and total: unrecognized input falls back to
/// desktop/unknown.
pub fn parse_user_agent(ua: &str) -> ClientInfo {
    let ua = ua.to_lowercase();

    let device_type = if MOBILE_MARKERS.iter().any(|m| ua.contains(m)) {
        DeviceType::Mobile
    } else if TABLET_MARKERS.iter().any(|m| ua.contains(m)) {
        DeviceType::Tablet
    } else {
        DeviceType::Desktop
    };

    // Order matters: android first, then ios, then the desktop OSes
    let platform = if ua.contains("android") {
        Platform::Android
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
        Platform::Ios
    } else if ua.contains("windows") {
        Platform::Windows
    } else if ua.contains("mac os") || ua.contains("macintosh") {
        Platform::Macos
    } else if ua.contains("linux") {
        Platform::Linux
    } else {
        Platform::Unknown
    };

    ClientInfo {
        device_type,
        platform,
    }
}

/// Parsed UserAgent record pending insertion
#[derive(Debug, Clone)]
pub struct ParsedUserAgent {
    pub hash: String,
    pub ua_string: String,
    pub browser_name: Option<String>,
    pub browser_version: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub device_category: Option<String>,
    pub is_bot: bool,
}

/// UserAgent deduplication store.
///
/// Keeps an in-memory set of hashes already persisted and a pending map
/// of newly seen strings awaiting a batch insert.
pub struct UserAgentStore {
    known_hashes: DashSet<String>,
    pending_inserts: DashMap<String, ParsedUserAgent>,
}

impl UserAgentStore {
    pub fn new() -> Self {
        Self {
            known_hashes: DashSet::new(),
            pending_inserts: DashMap::new(),
        }
    }

    /// Load already-persisted hashes on startup
    pub async fn load_known_hashes(&self, db: &DatabaseConnection) -> anyhow::Result<usize> {
        let models: Vec<user_agent::Model> = user_agent::Entity::find().all(db).await?;

        let count = models.len();
        for model in models {
            self.known_hashes.insert(model.hash);
        }

        debug!("Loaded {} known UserAgent hashes from database", count);
        Ok(count)
    }

    /// Compute xxHash64 of a string, returning 16-char hex
    #[inline]
    pub fn compute_hash(s: &str) -> String {
        format!("{:016x}", xxh64(s.as_bytes(), 0))
    }

    fn parse_details(ua_string: &str, hash: &str) -> ParsedUserAgent {
        let parser = Parser::new();
        let result = parser.parse(ua_string).unwrap_or_default();

        ParsedUserAgent {
            hash: hash.to_string(),
            ua_string: ua_string.to_string(),
            browser_name: if result.name != "UNKNOWN" {
                Some(result.name.to_string())
            } else {
                None
            },
            browser_version: if !result.version.is_empty() {
                Some(result.version.to_string())
            } else {
                None
            },
            os_name: if result.os != "UNKNOWN" {
                Some(result.os.to_string())
            } else {
                None
            },
            os_version: if !result.os_version.is_empty() {
                Some(result.os_version.to_string())
            } else {
                None
            },
            device_category: Some(result.category.to_string()),
            is_bot: result.category == "crawler",
        }
    }

    /// Get or create the hash for a UserAgent string.
    ///
    /// New strings are parsed and queued for the next batch flush; the
    /// hash is returned immediately either way.
    pub fn get_or_create_hash(&self, user_agent: &str) -> String {
        let hash = Self::compute_hash(user_agent);

        if !self.known_hashes.contains(&hash) {
            self.pending_inserts
                .entry(hash.clone())
                .or_insert_with(|| Self::parse_details(user_agent, &hash));
        }

        hash
    }

    pub fn pending_count(&self) -> usize {
        self.pending_inserts.len()
    }

    pub fn known_count(&self) -> usize {
        self.known_hashes.len()
    }

    /// Flush pending UA inserts, skipping rows already present.
    ///
    /// Returns the number of records handed to the database.
    pub async fn flush_pending(&self, db: &DatabaseConnection) -> anyhow::Result<usize> {
        if self.pending_inserts.is_empty() {
            return Ok(0);
        }

        let pending: Vec<ParsedUserAgent> = self
            .pending_inserts
            .iter()
            .map(|r| r.value().clone())
            .collect();

        let now = Utc::now();
        let count = pending.len();

        let models: Vec<user_agent::ActiveModel> = pending
            .iter()
            .map(|parsed| user_agent::ActiveModel {
                hash: Set(parsed.hash.clone()),
                user_agent_string: Set(parsed.ua_string.clone()),
                first_seen: Set(now),
                last_seen: Set(now),
                browser_name: Set(parsed.browser_name.clone()),
                browser_version: Set(parsed.browser_version.clone()),
                os_name: Set(parsed.os_name.clone()),
                os_version: Set(parsed.os_version.clone()),
                device_category: Set(parsed.device_category.clone()),
                is_bot: Set(parsed.is_bot),
            })
            .collect();

        if let Err(e) = user_agent::Entity::insert_many(models)
            .on_conflict(
                OnConflict::column(user_agent::Column::Hash)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(db)
            .await
        {
            // on_conflict do_nothing reports "no rows inserted" when every
            // row was a duplicate; that is not a failure
            debug!("Batch insert UserAgents: {} (duplicates skipped)", e);
        }

        for parsed in &pending {
            self.known_hashes.insert(parsed.hash.clone());
            self.pending_inserts.remove(&parsed.hash);
        }

        if count > 0 {
            debug!("Flushed {} UserAgents to database", count);
        }

        Ok(count)
    }
}

impl Default for UserAgentStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Debounced flush scheduling for the UA store.
///
/// A burst of new UA strings triggers one flush once the burst settles
/// instead of one insert round-trip per request. A periodic background
/// flush (see runtime startup) bounds the worst-case delay.
pub struct UaFlushScheduler {
    store: std::sync::Arc<UserAgentStore>,
    db: DatabaseConnection,
    debounce: crate::utils::throttle::Debounce,
}

impl UaFlushScheduler {
    pub fn new(
        store: std::sync::Arc<UserAgentStore>,
        db: DatabaseConnection,
        wait: std::time::Duration,
    ) -> Self {
        Self {
            store,
            db,
            debounce: crate::utils::throttle::Debounce::new(wait),
        }
    }

    /// Request a flush; repeated calls within the wait window coalesce
    pub fn schedule_flush(&self) {
        if self.store.pending_count() == 0 {
            return;
        }

        let store = self.store.clone();
        let db = self.db.clone();
        self.debounce.call(move || async move {
            if let Err(e) = store.flush_pending(&db).await {
                tracing::warn!("UserAgent flush failed: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_android_phone_classified_mobile() {
        let info = parse_user_agent("Mozilla/5.0 (Linux; Android 10)");
        assert_eq!(info.device_type, DeviceType::Mobile);
        assert_eq!(info.platform, Platform::Android);
    }

    #[test]
    fn test_ipad_classified_tablet_ios() {
        // ios must win over the generic "mac" marker in iPad UAs
        let info = parse_user_agent("Mozilla/5.0 (iPad; CPU OS 14_0 like Mac OS X)");
        assert_eq!(info.device_type, DeviceType::Tablet);
        assert_eq!(info.platform, Platform::Ios);
    }

    #[test]
    fn test_iphone_classified_mobile_ios() {
        let info = parse_user_agent(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Version/17.0 Mobile/15E148",
        );
        assert_eq!(info.device_type, DeviceType::Mobile);
        assert_eq!(info.platform, Platform::Ios);
    }

    #[test]
    fn test_desktop_platforms() {
        let windows = parse_user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64)");
        assert_eq!(windows.device_type, DeviceType::Desktop);
        assert_eq!(windows.platform, Platform::Windows);

        let macos = parse_user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)");
        assert_eq!(macos.device_type, DeviceType::Desktop);
        assert_eq!(macos.platform, Platform::Macos);

        let linux = parse_user_agent("Mozilla/5.0 (X11; Linux x86_64)");
        assert_eq!(linux.device_type, DeviceType::Desktop);
        assert_eq!(linux.platform, Platform::Linux);
    }

    #[test]
    fn test_unknown_falls_back_to_desktop_unknown() {
        let info = parse_user_agent("curl/8.5.0");
        assert_eq!(info.device_type, DeviceType::Desktop);
        assert_eq!(info.platform, Platform::Unknown);

        let empty = parse_user_agent("");
        assert_eq!(empty.device_type, DeviceType::Desktop);
        assert_eq!(empty.platform, Platform::Unknown);
    }

    #[test]
    fn test_enum_string_forms() {
        assert_eq!(DeviceType::Mobile.as_ref(), "mobile");
        assert_eq!(DeviceType::Desktop.as_ref(), "desktop");
        assert_eq!(Platform::Ios.as_ref(), "ios");
        assert_eq!(Platform::Unknown.as_ref(), "unknown");
    }

    #[test]
    fn test_compute_hash() {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";
        let hash = UserAgentStore::compute_hash(ua);

        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, UserAgentStore::compute_hash(ua));
        assert_ne!(hash, UserAgentStore::compute_hash("Other/1.0"));
    }

    #[test]
    fn test_get_or_create_hash_queues_once() {
        let store = UserAgentStore::new();
        let ua = "Test/1.0";

        let hash1 = store.get_or_create_hash(ua);
        assert_eq!(store.pending_count(), 1);

        let hash2 = store.get_or_create_hash(ua);
        assert_eq!(hash1, hash2);
        assert_eq!(store.pending_count(), 1);

        store.get_or_create_hash("Other/2.0");
        assert_eq!(store.pending_count(), 2);
    }

    #[test]
    fn test_known_hash_skips_pending() {
        let store = UserAgentStore::new();
        let ua = "Test/1.0";
        let hash = UserAgentStore::compute_hash(ua);

        store.known_hashes.insert(hash.clone());

        let result = store.get_or_create_hash(ua);
        assert_eq!(result, hash);
        assert_eq!(store.pending_count(), 0);
    }

    #[test]
    fn test_parse_details_googlebot() {
        let ua = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
        let parsed = UserAgentStore::parse_details(ua, "test_hash");

        assert_eq!(parsed.device_category, Some("crawler".to_string()));
        assert!(parsed.is_bot);
    }
}
