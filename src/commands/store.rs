//! Persisted store CLI commands.

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;

use adminguard_core::config::AppConfig;
use adminguard_core::error::AppError;
use adminguard_core::traits::store::KeyValueStore;
use adminguard_core::types::settings::TimeoutSettings;
use adminguard_store::{PersistedSettings, StoreManager, keys};

use crate::output::{self, OutputFormat};

/// Arguments for store commands
#[derive(Debug, Args)]
pub struct StoreArgs {
    /// Store subcommand
    #[command(subcommand)]
    pub command: StoreCommand,
}

/// Store subcommands
#[derive(Debug, Subcommand)]
pub enum StoreCommand {
    /// Show the session-start marker and cached settings
    Show,
    /// Remove the session-start marker
    ClearMarker,
}

/// What the store currently holds
#[derive(Debug, Serialize)]
struct StoreReport {
    /// Store provider
    provider: String,
    /// Session-start marker
    session_start: Option<DateTime<Utc>>,
    /// Cached timeout settings
    timeout_settings: Option<TimeoutSettings>,
    /// AdminGuard keys present
    keys: Vec<String>,
}

/// Execute store commands
pub async fn execute(
    args: &StoreArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let manager = StoreManager::new(&config.storage)?;
    let settings = PersistedSettings::new(manager.store());

    match &args.command {
        StoreCommand::Show => {
            let mut owned: Vec<String> = manager
                .keys()
                .await?
                .into_iter()
                .filter(|k| keys::is_owned(k))
                .collect();
            owned.sort();

            let report = StoreReport {
                provider: config.storage.provider.clone(),
                session_start: settings.load_session_start().await,
                timeout_settings: settings.load_timeout_settings().await,
                keys: owned,
            };
            output::print_item(&report, format);
        }
        StoreCommand::ClearMarker => {
            settings.clear_session_start().await;
            let remaining = settings.store().exists(&keys::session_start()).await?;
            if remaining {
                return Err(AppError::storage("Session start marker could not be removed"));
            }
            output::print_success("Session start marker cleared");
        }
    }
    Ok(())
}
