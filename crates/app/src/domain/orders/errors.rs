//! Orders service errors.

use sands::orders::OrderError;
use thiserror::Error;

use crate::{domain::accounts::AccountUpdateError, storage::StoreError};

/// Errors raised by the orders service.
#[derive(Debug, Error)]
pub enum OrdersServiceError {
    /// The order cannot move on.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The owning account could not be updated.
    #[error(transparent)]
    Account(#[from] AccountUpdateError),

    /// Store failure.
    #[error("storage error")]
    Store(#[from] StoreError),
}
