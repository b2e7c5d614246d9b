//! CLI command definitions and dispatch.

pub mod settings;
pub mod store;

use clap::{Parser, Subcommand};

use adminguard_core::config::AppConfig;
use adminguard_core::error::AppError;

use crate::output::OutputFormat;

/// AdminGuard admin session lifecycle tooling
#[derive(Debug, Parser)]
#[command(name = "adminguard", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (selects `config/{env}`)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Session timeout settings
    Settings(settings::SettingsArgs),
    /// Persisted key-value store
    Store(store::StoreArgs),
}

impl Cli {
    /// Run the selected command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Settings(args) => settings::execute(args, self.format),
            Commands::Store(args) => store::execute(args, config, self.format).await,
        }
    }
}
