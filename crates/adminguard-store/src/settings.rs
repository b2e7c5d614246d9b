//! Persisted session settings: the session-start marker and the cached
//! timeout settings blob.
//!
//! Every read and write here is best effort. Failures are logged at `warn`
//! and swallowed so a broken store never blocks a session.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, warn};

use adminguard_core::traits::store::KeyValueStore;
use adminguard_core::types::settings::TimeoutSettings;

use crate::keys;

/// Typed, failure-tolerant view over a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct PersistedSettings {
    store: Arc<dyn KeyValueStore>,
}

impl PersistedSettings {
    /// Wrap a store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Load the session-start marker.
    ///
    /// Non-numeric or out-of-range values are treated as absent.
    pub async fn load_session_start(&self) -> Option<DateTime<Utc>> {
        let key = keys::session_start();
        let raw = match self.store.get(&key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read session start marker");
                return None;
            }
        };

        let Ok(millis) = raw.trim().parse::<i64>() else {
            warn!(key = %key, value = %raw, "Ignoring non-numeric session start marker");
            return None;
        };

        let start = Utc.timestamp_millis_opt(millis).single();
        if start.is_none() {
            warn!(key = %key, millis, "Ignoring out-of-range session start marker");
        }
        start
    }

    /// Persist the session-start marker as epoch milliseconds.
    pub async fn save_session_start(&self, start: DateTime<Utc>) {
        let key = keys::session_start();
        let value = start.timestamp_millis().to_string();
        match self.store.set(&key, &value).await {
            Ok(()) => debug!(key = %key, millis = %value, "Session start marker saved"),
            Err(e) => warn!(key = %key, error = %e, "Failed to save session start marker"),
        }
    }

    /// Remove the session-start marker.
    pub async fn clear_session_start(&self) {
        let key = keys::session_start();
        if let Err(e) = self.store.delete(&key).await {
            warn!(key = %key, error = %e, "Failed to clear session start marker");
        }
    }

    /// Load the cached timeout settings.
    ///
    /// A blob that does not parse, or parses to invalid settings, is ignored.
    pub async fn load_timeout_settings(&self) -> Option<TimeoutSettings> {
        let key = keys::timeout_settings();
        let raw = match self.store.get(&key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read cached timeout settings");
                return None;
            }
        };

        let settings: TimeoutSettings = match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring unparseable cached timeout settings");
                return None;
            }
        };

        if let Err(e) = settings.ensure_valid() {
            warn!(key = %key, error = %e, "Ignoring invalid cached timeout settings");
            return None;
        }

        Some(settings)
    }

    /// Cache the timeout settings.
    pub async fn save_timeout_settings(&self, settings: &TimeoutSettings) {
        let key = keys::timeout_settings();
        let json = match serde_json::to_string(settings) {
            Ok(json) => json,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize timeout settings");
                return;
            }
        };

        if let Err(e) = self.store.set(&key, &json).await {
            warn!(key = %key, error = %e, "Failed to cache timeout settings");
        }
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use adminguard_core::error::AppError;
    use adminguard_core::result::AppResult;
    use async_trait::async_trait;

    /// Store whose every operation fails.
    #[derive(Debug)]
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Err(AppError::storage("disk on fire"))
        }

        async fn set(&self, _key: &str, _value: &str) -> AppResult<()> {
            Err(AppError::storage("disk on fire"))
        }

        async fn delete(&self, _key: &str) -> AppResult<()> {
            Err(AppError::storage("disk on fire"))
        }

        async fn keys(&self) -> AppResult<Vec<String>> {
            Err(AppError::storage("disk on fire"))
        }

        async fn health_check(&self) -> AppResult<bool> {
            Ok(false)
        }
    }

    fn memory() -> (Arc<MemoryStore>, PersistedSettings) {
        let store = Arc::new(MemoryStore::default());
        let settings = PersistedSettings::new(store.clone());
        (store, settings)
    }

    #[tokio::test]
    async fn test_session_start_is_stored_as_millis() {
        let (store, settings) = memory();
        let start = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();

        settings.save_session_start(start).await;

        assert_eq!(
            store.get(&keys::session_start()).await.unwrap().as_deref(),
            Some("1700000000123")
        );
        assert_eq!(settings.load_session_start().await, Some(start));
    }

    #[tokio::test]
    async fn test_non_numeric_marker_is_absent() {
        let (store, settings) = memory();
        store.set(&keys::session_start(), "yesterday").await.unwrap();
        assert_eq!(settings.load_session_start().await, None);
    }

    #[tokio::test]
    async fn test_clear_session_start() {
        let (_, settings) = memory();
        settings.save_session_start(Utc::now()).await;
        settings.clear_session_start().await;
        assert_eq!(settings.load_session_start().await, None);
    }

    #[tokio::test]
    async fn test_invalid_cached_settings_are_ignored() {
        let (store, settings) = memory();
        store
            .set(
                &keys::timeout_settings(),
                r#"{"inactivityTimeoutMinutes":10,"maxSessionDurationMinutes":60,"dbHeartbeatIntervalMinutes":10}"#,
            )
            .await
            .unwrap();
        assert_eq!(settings.load_timeout_settings().await, None);

        store.set(&keys::timeout_settings(), "not json").await.unwrap();
        assert_eq!(settings.load_timeout_settings().await, None);
    }

    #[tokio::test]
    async fn test_cached_settings_round_trip() {
        let (_, settings) = memory();
        let custom = TimeoutSettings {
            inactivity_timeout_minutes: 15,
            max_session_duration_minutes: 120,
            db_heartbeat_interval_minutes: 5,
        };
        settings.save_timeout_settings(&custom).await;
        assert_eq!(settings.load_timeout_settings().await, Some(custom));
    }

    #[tokio::test]
    async fn test_store_failures_are_swallowed() {
        let settings = PersistedSettings::new(Arc::new(BrokenStore));

        settings.save_session_start(Utc::now()).await;
        settings.clear_session_start().await;
        settings
            .save_timeout_settings(&TimeoutSettings::default())
            .await;

        assert_eq!(settings.load_session_start().await, None);
        assert_eq!(settings.load_timeout_settings().await, None);
    }
}
