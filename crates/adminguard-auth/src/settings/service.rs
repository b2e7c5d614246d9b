//! Loads and saves the timeout settings that drive session supervision.
//!
//! Resolution order on load is defaults, then the locally cached blob, then
//! the backend row. The backend wins whenever it answers, and its values are
//! cached again for the next start.

use std::sync::Arc;

use tracing::{debug, info, warn};

use adminguard_core::result::AppResult;
use adminguard_core::traits::backend::Backend;
use adminguard_core::types::settings::{SecuritySettingsRecord, TimeoutSettings};
use adminguard_store::settings::PersistedSettings;

use crate::session::state::Published;

/// Settings resolved by [`TimeoutSettingsService::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecuritySettings {
    /// Effective timeout limits.
    pub timeouts: TimeoutSettings,
    /// Global site-login policy.
    pub require_site_login: bool,
}

/// Owns the in-memory copy of the timeout settings.
pub struct TimeoutSettingsService {
    /// Backend client.
    backend: Arc<dyn Backend>,
    /// Local cache.
    persisted: PersistedSettings,
    /// Effective timeouts used by the supervisor.
    current: Published<TimeoutSettings>,
    /// Last row seen from the backend; preserves unrelated columns on save.
    record: Published<SecuritySettingsRecord>,
}

impl std::fmt::Debug for TimeoutSettingsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeoutSettingsService")
            .field("current", &self.current.get())
            .finish()
    }
}

impl TimeoutSettingsService {
    /// Creates a service starting from the default limits.
    pub fn new(backend: Arc<dyn Backend>, persisted: PersistedSettings) -> Self {
        Self {
            backend,
            persisted,
            current: Published::new(TimeoutSettings::default()),
            record: Published::new(SecuritySettingsRecord::default()),
        }
    }

    /// The effective timeout limits.
    pub fn current(&self) -> TimeoutSettings {
        self.current.get()
    }

    /// Subscribe to changes of the effective limits.
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<TimeoutSettings> {
        self.current.subscribe()
    }

    /// Resolve the effective settings. Never fails; unreadable sources are
    /// skipped.
    pub async fn load(&self) -> SecuritySettings {
        let mut timeouts = TimeoutSettings::default();
        let mut require_site_login = false;

        if let Some(cached) = self.persisted.load_timeout_settings().await {
            debug!(?cached, "Using cached timeout settings");
            timeouts = cached;
        }

        match self.backend.fetch_security_settings().await {
            Ok(Some(record)) => {
                require_site_login = record.require_site_login;
                let remote = record.timeouts();
                match remote.ensure_valid() {
                    Ok(()) => {
                        timeouts = remote;
                        self.persisted.save_timeout_settings(&remote).await;
                    }
                    Err(e) => {
                        warn!(error = %e, "Ignoring invalid timeout settings from backend");
                    }
                }
                self.record.set(record);
            }
            Ok(None) => debug!("No security settings row; keeping local timeout settings"),
            Err(e) => warn!(error = %e, "Failed to fetch security settings"),
        }

        self.current.set(timeouts);

        info!(
            inactivity_timeout_minutes = timeouts.inactivity_timeout_minutes,
            max_session_duration_minutes = timeouts.max_session_duration_minutes,
            db_heartbeat_interval_minutes = timeouts.db_heartbeat_interval_minutes,
            require_site_login,
            "Security settings loaded"
        );

        SecuritySettings {
            timeouts,
            require_site_login,
        }
    }

    /// Validate and store new limits.
    ///
    /// Invalid values are rejected before anything is written. The backend
    /// row is written first; the local cache and the in-memory copy follow
    /// only if it succeeds.
    pub async fn save(&self, settings: TimeoutSettings) -> AppResult<()> {
        settings.ensure_valid()?;

        let record = self.record.get().with_timeouts(&settings);
        self.backend.save_security_settings(&record).await?;
        self.record.set(record);

        self.persisted.save_timeout_settings(&settings).await;
        self.current.set(settings);

        info!(
            inactivity_timeout_minutes = settings.inactivity_timeout_minutes,
            max_session_duration_minutes = settings.max_session_duration_minutes,
            db_heartbeat_interval_minutes = settings.db_heartbeat_interval_minutes,
            "Timeout settings saved"
        );
        Ok(())
    }
}
