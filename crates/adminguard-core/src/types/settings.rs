//! Admin-editable session timeout settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::result::AppResult;

/// Timeout limits enforced on admin sessions.
///
/// Serialized in camelCase because the same blob is cached in the client's
/// persisted store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TimeoutSettings {
    /// Minutes without tracked activity before an admin is logged out.
    #[validate(range(min = 5, message = "must be at least 5 minutes"))]
    pub inactivity_timeout_minutes: u32,
    /// Minutes since session start before an admin is logged out.
    #[validate(range(min = 30, message = "must be at least 30 minutes"))]
    pub max_session_duration_minutes: u32,
    /// Minutes between database keep-alive calls.
    #[validate(range(min = 1, message = "must be at least 1 minute"))]
    pub db_heartbeat_interval_minutes: u32,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            inactivity_timeout_minutes: 30,
            max_session_duration_minutes: 480,
            db_heartbeat_interval_minutes: 1,
        }
    }
}

impl TimeoutSettings {
    /// Checks the per-field ranges and the heartbeat/inactivity relation.
    ///
    /// The heartbeat must fire strictly more often than the inactivity
    /// timeout.
    pub fn ensure_valid(&self) -> AppResult<()> {
        self.validate()?;

        if self.db_heartbeat_interval_minutes >= self.inactivity_timeout_minutes {
            return Err(AppError::validation(format!(
                "db_heartbeat_interval_minutes: must be less than the inactivity timeout ({} minutes)",
                self.inactivity_timeout_minutes
            )));
        }

        Ok(())
    }

    /// Inactivity timeout as a duration.
    pub fn inactivity_timeout(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.inactivity_timeout_minutes))
    }

    /// Maximum session duration as a duration.
    pub fn max_session_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.max_session_duration_minutes))
    }

    /// Heartbeat interval as a std duration, for timers.
    pub fn heartbeat_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.db_heartbeat_interval_minutes) * 60)
    }
}

/// The backend's single security settings row.
///
/// Columns are nullable; missing values fall back to [`TimeoutSettings`]
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuritySettingsRecord {
    /// Whether visitors must sign in before using the public site.
    #[serde(default)]
    pub require_site_login: bool,
    /// Inactivity timeout column.
    #[serde(default)]
    pub inactivity_timeout_minutes: Option<u32>,
    /// Maximum session duration column.
    #[serde(default)]
    pub max_session_duration_minutes: Option<u32>,
    /// Heartbeat interval column.
    #[serde(default)]
    pub db_heartbeat_interval_minutes: Option<u32>,
}

impl SecuritySettingsRecord {
    /// Fixed primary key of the settings row.
    pub const ROW_ID: i64 = 1;

    /// Timeout settings from this row, defaulting missing columns.
    pub fn timeouts(&self) -> TimeoutSettings {
        let defaults = TimeoutSettings::default();
        TimeoutSettings {
            inactivity_timeout_minutes: self
                .inactivity_timeout_minutes
                .unwrap_or(defaults.inactivity_timeout_minutes),
            max_session_duration_minutes: self
                .max_session_duration_minutes
                .unwrap_or(defaults.max_session_duration_minutes),
            db_heartbeat_interval_minutes: self
                .db_heartbeat_interval_minutes
                .unwrap_or(defaults.db_heartbeat_interval_minutes),
        }
    }

    /// Replace the timeout columns, keeping the site-login flag.
    pub fn with_timeouts(mut self, settings: &TimeoutSettings) -> Self {
        self.inactivity_timeout_minutes = Some(settings.inactivity_timeout_minutes);
        self.max_session_duration_minutes = Some(settings.max_session_duration_minutes);
        self.db_heartbeat_interval_minutes = Some(settings.db_heartbeat_interval_minutes);
        self
    }
}
