//! Application configuration module

use clap::Args;

use crate::config::{logging::LoggingConfig, storage::StorageConfig};

pub mod logging;
pub mod storage;

pub use logging::LogFormat;

/// Sands process settings, read from the command line with environment fallbacks.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Data directory, ledger rules and catalog settings.
    #[command(flatten)]
    pub storage: StorageConfig,
}

/// Load `.env` from the working directory if one exists.
pub fn load_dotenv() {
    // Missing .env files are expected.
    _ = dotenvy::dotenv();
}
