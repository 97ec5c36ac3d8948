//! Storage
//!
//! Backends for the domain repositories. Every backend implements all four repository traits so
//! one store instance can back the whole application.

use sands::accounts::AccountId;
use thiserror::Error;

pub mod fallback;
pub mod json;
pub mod memory;

pub use fallback::Fallback;
pub use json::JsonStore;
pub use memory::MemoryStore;

/// Errors raised by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem error.
    #[error("store IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document could not be encoded or decoded.
    #[error("store serialisation error: {0}")]
    Json(#[from] serde_json::Error),

    /// An account with this id already exists.
    #[error("account {0} already exists")]
    AccountExists(AccountId),

    /// The backend is not reachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether the error is the backend failing rather than the store rejecting the write.
    pub fn is_backend_failure(&self) -> bool {
        !matches!(self, Self::AccountExists(_))
    }
}
