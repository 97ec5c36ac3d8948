//! In-memory store.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use sands::{
    accounts::{Account, AccountId},
    inventory::Inventory,
    products::ProductId,
    reviews::Review,
};
use tokio::sync::RwLock;

use crate::{
    domain::{
        accounts::AccountsRepository,
        inventory::InventoryRepository,
        orders::{OrdersRepository, models::OrderRecord},
        reviews::ReviewsRepository,
    },
    storage::StoreError,
};

#[derive(Debug, Default)]
struct State {
    accounts: FxHashMap<AccountId, Account>,
    inventory: Inventory,

    /// Order log in placement order.
    orders: Vec<OrderRecord>,

    /// Reviews in submission order.
    reviews: Vec<Review>,
}

/// Process-local store. Every update holds the write lock for its whole read-modify-write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `inventory`.
    #[must_use]
    pub fn with_inventory(inventory: Inventory) -> Self {
        Self {
            state: RwLock::new(State {
                inventory,
                ..State::default()
            }),
        }
    }
}

#[async_trait]
impl AccountsRepository for MemoryStore {
    async fn get_account(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.state.read().await.accounts.get(id).cloned())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let mut accounts: Vec<Account> =
            self.state.read().await.accounts.values().cloned().collect();

        accounts.sort_by(|a, b| a.id().cmp(b.id()));

        Ok(accounts)
    }

    async fn insert_account(&self, account: Account) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        if state.accounts.contains_key(account.id()) {
            return Err(StoreError::AccountExists(account.id().clone()));
        }

        state.accounts.insert(account.id().clone(), account);

        Ok(())
    }

    async fn replace_account(
        &self,
        expected: &Account,
        updated: Account,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;

        match state.accounts.get_mut(expected.id()) {
            Some(stored) if stored == expected => {
                *stored = updated;

                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn put_account(&self, account: Account) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .accounts
            .insert(account.id().clone(), account);

        Ok(())
    }
}

#[async_trait]
impl InventoryRepository for MemoryStore {
    async fn inventory(&self) -> Result<Inventory, StoreError> {
        Ok(self.state.read().await.inventory.clone())
    }

    async fn stock(&self, product: &ProductId) -> Result<u32, StoreError> {
        Ok(self.state.read().await.inventory.stock(product))
    }

    async fn compare_and_swap(
        &self,
        product: &ProductId,
        expected: u32,
        new: u32,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;

        if state.inventory.stock(product) != expected {
            return Ok(false);
        }

        state.inventory.set(product.clone(), new);

        Ok(true)
    }

    async fn set_stock(&self, product: &ProductId, stock: u32) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .inventory
            .set(product.clone(), stock);

        Ok(())
    }
}

#[async_trait]
impl OrdersRepository for MemoryStore {
    async fn submit_order(&self, record: OrderRecord) -> Result<(), StoreError> {
        self.state.write().await.orders.push(record);

        Ok(())
    }

    async fn all_orders(&self) -> Result<Vec<OrderRecord>, StoreError> {
        Ok(self.state.read().await.orders.iter().rev().cloned().collect())
    }

    async fn put_order(&self, record: OrderRecord) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        match state
            .orders
            .iter_mut()
            .find(|stored| stored.order.id == record.order.id)
        {
            Some(stored) => *stored = record,
            None => state.orders.push(record),
        }

        Ok(())
    }
}

#[async_trait]
impl ReviewsRepository for MemoryStore {
    async fn add_review(&self, review: Review) -> Result<(), StoreError> {
        self.state.write().await.reviews.push(review);

        Ok(())
    }

    async fn reviews_for_product(&self, product: &ProductId) -> Result<Vec<Review>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .reviews
            .iter()
            .filter(|review| &review.product_id == product)
            .cloned()
            .collect())
    }
}
