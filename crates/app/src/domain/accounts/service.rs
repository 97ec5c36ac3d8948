//! Accounts service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use sands::{
    accounts::{Account, AccountId},
    ledger::Ledger,
};
use tracing::{debug, info};

use crate::{
    domain::accounts::{
        errors::{AccountUpdateError, AccountsServiceError},
        models::{AccountSummary, NewAccount},
        repository::AccountsRepository,
    },
    storage::StoreError,
};

/// Read an account, apply `update` and write the result back if nobody else wrote in between.
///
/// `update` sees the account with its tier re-derived under `ledger`'s thresholds. The
/// read-modify-write is retried up to `retry_limit` times, re-running `update` against the fresh
/// record each time.
pub(crate) async fn update_account<F, E>(
    ledger: &Ledger,
    repository: &dyn AccountsRepository,
    id: &AccountId,
    retry_limit: u32,
    mut update: F,
) -> Result<Account, E>
where
    F: FnMut(&Account) -> Result<Account, E> + Send,
    E: From<AccountUpdateError> + From<StoreError> + Send,
{
    let (account, ()) = update_account_with(ledger, repository, id, retry_limit, |current| {
        update(current).map(|updated| (updated, ()))
    })
    .await?;

    Ok(account)
}

/// [`update_account`] for updates that also produce a value, such as the order a checkout
/// places. The value from the attempt that was written is returned.
pub(crate) async fn update_account_with<F, T, E>(
    ledger: &Ledger,
    repository: &dyn AccountsRepository,
    id: &AccountId,
    retry_limit: u32,
    mut update: F,
) -> Result<(Account, T), E>
where
    F: FnMut(&Account) -> Result<(Account, T), E> + Send,
    T: Send,
    E: From<AccountUpdateError> + From<StoreError> + Send,
{
    let attempts = retry_limit.max(1);

    for attempt in 1..=attempts {
        let current = repository
            .get_account(id)
            .await?
            .ok_or_else(|| AccountUpdateError::NotFound(id.clone()))?;

        let (updated, output) = update(&ledger.reconcile(&current))?;

        if repository.replace_account(&current, updated.clone()).await? {
            return Ok((updated, output));
        }

        debug!(account = %id, attempt, "account changed during update, retrying");
    }

    Err(AccountUpdateError::Contention {
        account: id.clone(),
        attempts,
    }
    .into())
}

/// Accounts service backed by an [`AccountsRepository`].
#[derive(Clone)]
pub struct LedgerAccountsService {
    ledger: Ledger,
    repository: Arc<dyn AccountsRepository>,
    retry_limit: u32,
}

impl LedgerAccountsService {
    /// Create the service.
    #[must_use]
    pub fn new(ledger: Ledger, repository: Arc<dyn AccountsRepository>, retry_limit: u32) -> Self {
        Self {
            ledger,
            repository,
            retry_limit,
        }
    }
}

impl fmt::Debug for LedgerAccountsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerAccountsService")
            .field("ledger", &self.ledger)
            .field("retry_limit", &self.retry_limit)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AccountsService for LedgerAccountsService {
    async fn create_account(&self, account: NewAccount) -> Result<Account, AccountsServiceError> {
        let created = Account::new(account.id, account.name);

        self.repository.insert_account(created.clone()).await?;

        info!(account = %created.id(), "account created");

        Ok(created)
    }

    async fn get_account(&self, id: &AccountId) -> Result<Account, AccountsServiceError> {
        let account = self
            .repository
            .get_account(id)
            .await?
            .ok_or_else(|| AccountUpdateError::NotFound(id.clone()))?;

        Ok(self.ledger.reconcile(&account))
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, AccountsServiceError> {
        let accounts = self.repository.list_accounts().await?;

        Ok(accounts
            .iter()
            .map(|account| self.ledger.reconcile(account))
            .collect())
    }

    async fn summary(&self, id: &AccountId) -> Result<AccountSummary, AccountsServiceError> {
        let account = self.get_account(id).await?;
        let progress = self.ledger.progress(&account);

        Ok(AccountSummary { account, progress })
    }

    async fn award_referral(&self, referrer: &AccountId) -> Result<Account, AccountsServiceError> {
        let ledger = self.ledger;

        let account = update_account(
            &ledger,
            self.repository.as_ref(),
            referrer,
            self.retry_limit,
            |current| Ok::<_, AccountsServiceError>(ledger.award_referral(current)),
        )
        .await?;

        info!(
            account = %referrer,
            points = account.points(),
            tier = %account.tier(),
            "referral bonus credited"
        );

        Ok(account)
    }
}

/// Loyalty account operations.
#[automock]
#[async_trait]
pub trait AccountsService: Send + Sync {
    /// Open a new account with no points.
    async fn create_account(&self, account: NewAccount) -> Result<Account, AccountsServiceError>;

    /// Retrieve a single account.
    async fn get_account(&self, id: &AccountId) -> Result<Account, AccountsServiceError>;

    /// All accounts.
    async fn list_accounts(&self) -> Result<Vec<Account>, AccountsServiceError>;

    /// An account with its tier progress.
    async fn summary(&self, id: &AccountId) -> Result<AccountSummary, AccountsServiceError>;

    /// Credit the referral bonus to `referrer` on a completed referral.
    async fn award_referral(&self, referrer: &AccountId) -> Result<Account, AccountsServiceError>;
}
