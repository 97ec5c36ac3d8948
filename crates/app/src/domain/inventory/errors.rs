//! Inventory service errors.

use sands::{inventory::InventoryError, products::ProductId};
use thiserror::Error;

use crate::storage::StoreError;

/// Errors raised by the inventory service.
#[derive(Debug, Error)]
pub enum InventoryServiceError {
    /// The ledger rejected the change.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// The stock record kept changing between read and write.
    #[error("stock for product {product} changed concurrently on each of {attempts} attempts")]
    Contention {
        /// Contended product.
        product: ProductId,

        /// Attempts made.
        attempts: u32,
    },

    /// Taking stock failed and the units already taken could not all be put back.
    #[error("failed to restore stock after {cause}: {restore}")]
    Compensation {
        /// Why the stock was being restored.
        cause: Box<InventoryServiceError>,

        /// The restore failure.
        restore: Box<InventoryServiceError>,
    },

    /// Store failure.
    #[error("storage error")]
    Store(#[from] StoreError),
}
