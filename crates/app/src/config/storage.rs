//! Storage Config

use std::path::PathBuf;

use clap::Args;

/// Where ledger state lives and which rules apply to it.
#[derive(Debug, Clone, Args)]
pub struct StorageConfig {
    /// Directory holding the JSON ledger files
    #[arg(long, global = true, env = "SANDS_DATA_DIR", default_value = ".sands")]
    pub data_dir: PathBuf,

    /// Secondary data directory, read when the primary fails and kept in step with it
    #[arg(long, global = true, env = "SANDS_FALLBACK_DIR")]
    pub fallback_dir: Option<PathBuf>,

    /// Ledger rules YAML file; built-in storefront rules when omitted
    #[arg(long, global = true, env = "SANDS_LEDGER_CONFIG")]
    pub ledger_config: Option<PathBuf>,

    /// Catalog YAML file; built-in storefront catalog when omitted
    #[arg(long, global = true, env = "SANDS_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Attempts per conditional update before giving up under contention
    #[arg(
        long,
        global = true,
        env = "SANDS_CAS_RETRY_LIMIT",
        default_value_t = 8,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub cas_retry_limit: u32,
}
