//! SmartFill - AI form autofill
//!
//! Main entry point for the SmartFill CLI.

mod cli;
mod cmd_fill;
mod cmd_profile;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use smartfill_config::{Config, ConfigLoader, ConfigValidator};
use smartfill_protocols::StateStore;
use smartfill_store::FileStateStore;

use crate::cli::{Cli, Commands};

/// Get the .smartfill directory path.
fn smartfill_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".smartfill"))
        .unwrap_or_else(|| PathBuf::from(".smartfill"))
}

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.smartfill/logs/ with daily rotation.
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = smartfill_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("smartfill")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console on stderr so command output stays pipeable.
        .with(
            tracing_fmt::layer()
                .with_target(false)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Ok(())
}

/// An error already phrased for the user.
pub(crate) struct UserError(pub String);

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for UserError {}

fn load_config(path: Option<PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = path.unwrap_or_else(ConfigLoader::default_path);
    let config = ConfigLoader::load_or_default(&path)?;

    let validation = ConfigValidator::validate(&config);
    for warning in &validation.warnings {
        warn!("Config: {}: {}", warning.path, warning.message);
    }
    if !validation.is_valid() {
        let errors: Vec<String> = validation.errors.iter().map(|e| e.to_string()).collect();
        return Err(UserError(format!(
            "Invalid configuration {}:\n  {}",
            path.display(),
            errors.join("\n  ")
        ))
        .into());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    info!("SmartFill v{}", env!("CARGO_PKG_VERSION"));
    let store: Arc<dyn StateStore> = Arc::new(FileStateStore::open(config.storage.path.clone()).await?);

    match cli.command {
        Commands::Fill { yes, page } => cmd_fill::fill(&config, store, &page, yes).await,
        Commands::Undo { page } => cmd_fill::undo(&config, store, &page).await,
        Commands::History { action } => cmd_profile::handle_history_command(store, action).await,
        Commands::Profile { action } => cmd_profile::handle_profile_command(store, action).await,
        Commands::Credential { action } => {
            cmd_profile::handle_credential_command(store, action).await
        }
    }
}
