//! Reviews service errors.

use sands::{redemption::RedemptionError, reviews::ReviewError};
use thiserror::Error;

use crate::{domain::accounts::AccountUpdateError, storage::StoreError};

/// Errors raised by the reviews service.
#[derive(Debug, Error)]
pub enum ReviewsServiceError {
    /// The review was rejected.
    #[error(transparent)]
    Review(#[from] ReviewError),

    /// Taking back a review bonus failed.
    #[error(transparent)]
    Redemption(#[from] RedemptionError),

    /// The reviewing account could not be updated.
    #[error(transparent)]
    Account(#[from] AccountUpdateError),

    /// Storing the review failed and the bonus already credited could not be taken back.
    #[error("failed to take back review bonus after {cause}: {compensation}")]
    Compensation {
        /// Why the bonus was being taken back.
        cause: Box<ReviewsServiceError>,

        /// The failure taking it back.
        compensation: Box<ReviewsServiceError>,
    },

    /// Store failure.
    #[error("storage error")]
    Store(#[from] StoreError),
}
