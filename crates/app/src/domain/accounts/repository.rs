//! Accounts Repository

use async_trait::async_trait;
use mockall::automock;
use sands::accounts::{Account, AccountId};

use crate::storage::StoreError;

/// Persistent account records.
#[automock]
#[async_trait]
pub trait AccountsRepository: Send + Sync {
    /// Fetch one account, `None` if it does not exist.
    async fn get_account(&self, id: &AccountId) -> Result<Option<Account>, StoreError>;

    /// All accounts, sorted by id.
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;

    /// Store a new account.
    ///
    /// Fails with [`StoreError::AccountExists`] if the id is taken.
    async fn insert_account(&self, account: Account) -> Result<(), StoreError>;

    /// Replace the stored account with `updated` if it still equals `expected`.
    ///
    /// Returns `false`, writing nothing, when the stored record has changed or is missing.
    async fn replace_account(
        &self,
        expected: &Account,
        updated: Account,
    ) -> Result<bool, StoreError>;

    /// Write an account unconditionally.
    async fn put_account(&self, account: Account) -> Result<(), StoreError>;
}
