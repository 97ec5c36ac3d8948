//! Checkout service errors.

use sands::checkout::CheckoutError;
use thiserror::Error;

use crate::{
    domain::{accounts::AccountUpdateError, inventory::InventoryServiceError},
    storage::StoreError,
};

/// Errors raised by the checkout service.
#[derive(Debug, Error)]
pub enum CheckoutServiceError {
    /// The ledger rejected the cart.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Stock could not be reserved.
    #[error(transparent)]
    Inventory(#[from] InventoryServiceError),

    /// The buying account could not be updated.
    #[error(transparent)]
    Account(#[from] AccountUpdateError),

    /// The checkout failed after stock was reserved and the stock could not be put back.
    #[error("failed to restore stock after {cause}: {restore}")]
    Compensation {
        /// Why the checkout failed.
        cause: Box<CheckoutServiceError>,

        /// The restore failure.
        restore: Box<CheckoutServiceError>,
    },

    /// Store failure.
    #[error("storage error")]
    Store(#[from] StoreError),
}
