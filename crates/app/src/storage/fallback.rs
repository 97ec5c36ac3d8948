//! Fallback store.
//!
//! Pairs a primary store with a secondary one. Reads and writes go to the primary; when the
//! primary fails they go to the secondary instead, with a warning. Successful primary writes are
//! mirrored to the secondary so it stays usable as a fallback.

use std::future::Future;

use async_trait::async_trait;
use sands::{
    accounts::{Account, AccountId},
    inventory::Inventory,
    products::ProductId,
    reviews::Review,
};
use tracing::warn;

use crate::{
    domain::{
        accounts::AccountsRepository,
        inventory::InventoryRepository,
        orders::{OrdersRepository, models::OrderRecord},
        reviews::ReviewsRepository,
    },
    storage::StoreError,
};

/// A primary store backed up by a secondary one.
#[derive(Debug)]
pub struct Fallback<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> Fallback<P, S> {
    /// Pair `primary` with `secondary`.
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }

    /// The primary store.
    pub fn primary(&self) -> &P {
        &self.primary
    }

    /// The secondary store.
    pub fn secondary(&self) -> &S {
        &self.secondary
    }
}

async fn read<T>(
    operation: &'static str,
    primary: impl Future<Output = Result<T, StoreError>>,
    secondary: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match primary.await {
        Err(error) if error.is_backend_failure() => {
            warn!(operation, %error, "primary store failed, reading from secondary");

            secondary.await
        }
        result => result,
    }
}

async fn write<T>(
    operation: &'static str,
    primary: impl Future<Output = Result<T, StoreError>>,
    secondary: impl Future<Output = Result<T, StoreError>>,
    mirror: impl Future<Output = Result<(), StoreError>>,
) -> Result<T, StoreError> {
    match primary.await {
        Ok(value) => {
            mirror_write(operation, mirror).await;

            Ok(value)
        }
        Err(error) if error.is_backend_failure() => {
            warn!(operation, %error, "primary store failed, writing to secondary");

            secondary.await
        }
        Err(error) => Err(error),
    }
}

async fn mirror_write(
    operation: &'static str,
    mirror: impl Future<Output = Result<(), StoreError>>,
) {
    if let Err(error) = mirror.await {
        warn!(operation, %error, "failed to mirror write to secondary store");
    }
}

#[async_trait]
impl<P, S> AccountsRepository for Fallback<P, S>
where
    P: AccountsRepository,
    S: AccountsRepository,
{
    async fn get_account(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        read(
            "get_account",
            self.primary.get_account(id),
            self.secondary.get_account(id),
        )
        .await
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        read(
            "list_accounts",
            self.primary.list_accounts(),
            self.secondary.list_accounts(),
        )
        .await
    }

    async fn insert_account(&self, account: Account) -> Result<(), StoreError> {
        write(
            "insert_account",
            self.primary.insert_account(account.clone()),
            self.secondary.insert_account(account.clone()),
            self.secondary.put_account(account),
        )
        .await
    }

    async fn replace_account(
        &self,
        expected: &Account,
        updated: Account,
    ) -> Result<bool, StoreError> {
        match self.primary.replace_account(expected, updated.clone()).await {
            Ok(true) => {
                mirror_write("replace_account", self.secondary.put_account(updated)).await;

                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(error) if error.is_backend_failure() => {
                warn!(
                    operation = "replace_account",
                    %error,
                    "primary store failed, writing to secondary"
                );

                self.secondary.replace_account(expected, updated).await
            }
            Err(error) => Err(error),
        }
    }

    async fn put_account(&self, account: Account) -> Result<(), StoreError> {
        write(
            "put_account",
            self.primary.put_account(account.clone()),
            self.secondary.put_account(account.clone()),
            self.secondary.put_account(account),
        )
        .await
    }
}

#[async_trait]
impl<P, S> InventoryRepository for Fallback<P, S>
where
    P: InventoryRepository,
    S: InventoryRepository,
{
    async fn inventory(&self) -> Result<Inventory, StoreError> {
        read(
            "inventory",
            self.primary.inventory(),
            self.secondary.inventory(),
        )
        .await
    }

    async fn stock(&self, product: &ProductId) -> Result<u32, StoreError> {
        read(
            "stock",
            self.primary.stock(product),
            self.secondary.stock(product),
        )
        .await
    }

    async fn compare_and_swap(
        &self,
        product: &ProductId,
        expected: u32,
        new: u32,
    ) -> Result<bool, StoreError> {
        match self.primary.compare_and_swap(product, expected, new).await {
            Ok(true) => {
                mirror_write("compare_and_swap", self.secondary.set_stock(product, new)).await;

                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(error) if error.is_backend_failure() => {
                warn!(
                    operation = "compare_and_swap",
                    %error,
                    "primary store failed, writing to secondary"
                );

                self.secondary.compare_and_swap(product, expected, new).await
            }
            Err(error) => Err(error),
        }
    }

    async fn set_stock(&self, product: &ProductId, stock: u32) -> Result<(), StoreError> {
        write(
            "set_stock",
            self.primary.set_stock(product, stock),
            self.secondary.set_stock(product, stock),
            self.secondary.set_stock(product, stock),
        )
        .await
    }
}

#[async_trait]
impl<P, S> OrdersRepository for Fallback<P, S>
where
    P: OrdersRepository,
    S: OrdersRepository,
{
    async fn submit_order(&self, record: OrderRecord) -> Result<(), StoreError> {
        write(
            "submit_order",
            self.primary.submit_order(record.clone()),
            self.secondary.submit_order(record.clone()),
            self.secondary.put_order(record),
        )
        .await
    }

    async fn all_orders(&self) -> Result<Vec<OrderRecord>, StoreError> {
        read(
            "all_orders",
            self.primary.all_orders(),
            self.secondary.all_orders(),
        )
        .await
    }

    async fn put_order(&self, record: OrderRecord) -> Result<(), StoreError> {
        write(
            "put_order",
            self.primary.put_order(record.clone()),
            self.secondary.put_order(record.clone()),
            self.secondary.put_order(record),
        )
        .await
    }
}

#[async_trait]
impl<P, S> ReviewsRepository for Fallback<P, S>
where
    P: ReviewsRepository,
    S: ReviewsRepository,
{
    async fn add_review(&self, review: Review) -> Result<(), StoreError> {
        write(
            "add_review",
            self.primary.add_review(review.clone()),
            self.secondary.add_review(review.clone()),
            self.secondary.add_review(review),
        )
        .await
    }

    async fn reviews_for_product(&self, product: &ProductId) -> Result<Vec<Review>, StoreError> {
        read(
            "reviews_for_product",
            self.primary.reviews_for_product(product),
            self.secondary.reviews_for_product(product),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{accounts::MockAccountsRepository, inventory::MockInventoryRepository},
        storage::MemoryStore,
    };

    use super::*;

    fn offline() -> StoreError {
        StoreError::Unavailable("primary offline".to_owned())
    }

    #[tokio::test]
    async fn reads_secondary_when_primary_fails() -> TestResult {
        let mut primary = MockAccountsRepository::new();
        primary.expect_get_account().returning(|_| Err(offline()));

        let secondary = MemoryStore::new();
        secondary.insert_account(Account::new("u1", "Noor")).await?;

        let store = Fallback::new(primary, secondary);

        let account = store.get_account(&AccountId::from("u1")).await?;

        assert_eq!(
            account.map(|account| account.name().to_owned()),
            Some("Noor".to_owned())
        );

        Ok(())
    }

    #[tokio::test]
    async fn writes_secondary_when_primary_fails() -> TestResult {
        let mut primary = MockAccountsRepository::new();
        primary.expect_insert_account().returning(|_| Err(offline()));

        let store = Fallback::new(primary, MemoryStore::new());

        store.insert_account(Account::new("u1", "Noor")).await?;

        assert!(
            store
                .secondary()
                .get_account(&AccountId::from("u1"))
                .await?
                .is_some()
        );

        Ok(())
    }

    #[tokio::test]
    async fn successful_writes_are_mirrored() -> TestResult {
        let store = Fallback::new(MemoryStore::new(), MemoryStore::new());
        let product = ProductId::from("4");

        store.set_stock(&product, 6).await?;

        assert!(store.compare_and_swap(&product, 6, 5).await?);
        assert!(!store.compare_and_swap(&product, 6, 4).await?);
        assert_eq!(store.primary().stock(&product).await?, 5);
        assert_eq!(store.secondary().stock(&product).await?, 5);

        Ok(())
    }

    #[tokio::test]
    async fn rejected_insert_is_not_retried_on_secondary() -> TestResult {
        let mut primary = MockAccountsRepository::new();
        primary
            .expect_insert_account()
            .returning(|account| Err(StoreError::AccountExists(account.id().clone())));

        let store = Fallback::new(primary, MemoryStore::new());

        let result = store.insert_account(Account::new("u1", "Noor")).await;

        assert!(matches!(result, Err(StoreError::AccountExists(_))));
        assert!(store.secondary().list_accounts().await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn conditional_stock_update_falls_back() -> TestResult {
        let mut primary = MockInventoryRepository::new();
        primary
            .expect_compare_and_swap()
            .returning(|_, _, _| Err(offline()));

        let product = ProductId::from("9");
        let secondary = MemoryStore::with_inventory([(product.clone(), 2)].into_iter().collect());
        let store = Fallback::new(primary, secondary);

        assert!(store.compare_and_swap(&product, 2, 1).await?);
        assert_eq!(store.secondary().stock(&product).await?, 1);

        Ok(())
    }
}
