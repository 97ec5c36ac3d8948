//! Reviews Repository

use async_trait::async_trait;
use mockall::automock;
use sands::{products::ProductId, reviews::Review};

use crate::storage::StoreError;

/// Persistent product reviews.
#[automock]
#[async_trait]
pub trait ReviewsRepository: Send + Sync {
    /// Store an accepted review.
    async fn add_review(&self, review: Review) -> Result<(), StoreError>;

    /// Reviews of one product, oldest first.
    async fn reviews_for_product(&self, product: &ProductId) -> Result<Vec<Review>, StoreError>;
}
