//! Timeout settings CLI commands.

use clap::{Args, Subcommand};

use adminguard_core::error::AppError;
use adminguard_core::types::settings::TimeoutSettings;

use crate::output::{self, OutputFormat};

/// Arguments for settings commands
#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Settings subcommand
    #[command(subcommand)]
    pub command: SettingsCommand,
}

/// Settings subcommands
#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Check candidate timeout values without saving them
    Validate {
        /// Inactivity timeout in minutes
        #[arg(long, default_value_t = 30)]
        inactivity: u32,
        /// Maximum session duration in minutes
        #[arg(long, default_value_t = 480)]
        max_duration: u32,
        /// Database heartbeat interval in minutes
        #[arg(long, default_value_t = 1)]
        heartbeat: u32,
    },
}

/// Execute settings commands
pub fn execute(args: &SettingsArgs, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        SettingsCommand::Validate {
            inactivity,
            max_duration,
            heartbeat,
        } => {
            let settings = TimeoutSettings {
                inactivity_timeout_minutes: *inactivity,
                max_session_duration_minutes: *max_duration,
                db_heartbeat_interval_minutes: *heartbeat,
            };
            settings.ensure_valid()?;
            output::print_item(&settings, format);
            output::print_success("Timeout settings are valid");
        }
    }
    Ok(())
}
