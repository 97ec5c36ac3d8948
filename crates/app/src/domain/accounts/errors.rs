//! Accounts service errors.

use sands::accounts::AccountId;
use thiserror::Error;

use crate::storage::StoreError;

/// Errors raised by a conditional account update.
#[derive(Debug, Error)]
pub enum AccountUpdateError {
    /// No such account.
    #[error("account {0} not found")]
    NotFound(AccountId),

    /// The account kept changing between read and write.
    #[error("account {account} changed concurrently on each of {attempts} attempts")]
    Contention {
        /// Contended account.
        account: AccountId,

        /// Attempts made.
        attempts: u32,
    },
}

/// Errors raised by the accounts service.
#[derive(Debug, Error)]
pub enum AccountsServiceError {
    /// Account id already taken.
    #[error("account {0} already exists")]
    AlreadyExists(AccountId),

    /// Account lookup or update failed.
    #[error(transparent)]
    Update(#[from] AccountUpdateError),

    /// Store failure.
    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for AccountsServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::AccountExists(id) => Self::AlreadyExists(id),
            other => Self::Store(other),
        }
    }
}
