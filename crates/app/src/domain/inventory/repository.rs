//! Inventory Repository

use async_trait::async_trait;
use mockall::automock;
use sands::{inventory::Inventory, products::ProductId};

use crate::storage::StoreError;

/// Persistent stock records with conditional updates.
#[automock]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Full stock snapshot.
    async fn inventory(&self) -> Result<Inventory, StoreError>;

    /// Stock of one product; zero for products without a record.
    async fn stock(&self, product: &ProductId) -> Result<u32, StoreError>;

    /// Set the stock of `product` to `new` if it is currently `expected`.
    ///
    /// Returns `false`, writing nothing, when the stored count differs from `expected`.
    async fn compare_and_swap(
        &self,
        product: &ProductId,
        expected: u32,
        new: u32,
    ) -> Result<bool, StoreError>;

    /// Set the stock of `product` unconditionally.
    async fn set_stock(&self, product: &ProductId, stock: u32) -> Result<(), StoreError>;
}
