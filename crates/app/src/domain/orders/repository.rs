//! Orders Repository

use async_trait::async_trait;
use mockall::automock;

use crate::{domain::orders::models::OrderRecord, storage::StoreError};

/// The store-wide order log read by the admin dashboard.
#[automock]
#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// Append a newly placed order.
    async fn submit_order(&self, record: OrderRecord) -> Result<(), StoreError>;

    /// Every order, newest first.
    async fn all_orders(&self) -> Result<Vec<OrderRecord>, StoreError>;

    /// Replace the order with the same id, appending it if the log does not have it.
    async fn put_order(&self, record: OrderRecord) -> Result<(), StoreError>;
}
