//! Test context for service-level tests.

use std::sync::Arc;

use sands::{accounts::Account, ledger::Ledger, orders::Order};

use crate::{
    domain::{
        accounts::{AccountsRepository, LedgerAccountsService},
        checkout::LedgerCheckoutService,
        inventory::LedgerInventoryService,
        orders::LedgerOrdersService,
        reviews::LedgerReviewsService,
    },
    storage::{MemoryStore, StoreError},
};

const RETRY_LIMIT: u32 = 8;

/// Every service wired to one in-memory store with the storefront rules.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub ledger: Ledger,
    pub accounts: LedgerAccountsService,
    pub inventory: Arc<LedgerInventoryService>,
    pub orders: LedgerOrdersService,
    pub reviews: LedgerReviewsService,
    pub checkout: LedgerCheckoutService,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let ledger = Ledger::default();
        let inventory = Arc::new(LedgerInventoryService::new(
            ledger,
            store.clone(),
            RETRY_LIMIT,
        ));

        Self {
            accounts: LedgerAccountsService::new(ledger, store.clone(), RETRY_LIMIT),
            orders: LedgerOrdersService::new(ledger, store.clone(), store.clone(), RETRY_LIMIT),
            reviews: LedgerReviewsService::new(ledger, store.clone(), store.clone(), RETRY_LIMIT),
            checkout: LedgerCheckoutService::new(
                ledger,
                store.clone(),
                inventory.clone(),
                store.clone(),
                RETRY_LIMIT,
            ),
            inventory,
            ledger,
            store,
        }
    }

    /// Open an account holding `points` points.
    pub async fn open_account(&self, id: &str, points: u64) -> Result<Account, StoreError> {
        let account = self
            .ledger
            .award_points(&Account::new(id, "Test Customer"), points);

        self.store.insert_account(account.clone()).await?;

        Ok(account)
    }

    /// Open an account that has already placed `order`.
    pub async fn open_account_with_order(
        &self,
        id: &str,
        order: Order,
    ) -> Result<Account, StoreError> {
        let account = Account::new(id, "Test Customer").with_order(order);

        self.store.insert_account(account.clone()).await?;

        Ok(account)
    }
}
