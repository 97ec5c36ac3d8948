//! Reviews service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sands::{
    accounts::AccountId,
    ledger::Ledger,
    products::ProductId,
    reviews::{AcceptedReview, ReviewDraft, average_rating},
};
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{
    accounts::{AccountsRepository, update_account, update_account_with},
    reviews::{
        errors::ReviewsServiceError,
        models::{NewReview, ProductReviews},
        repository::ReviewsRepository,
    },
};

/// Reviews service over the review store and the reviewing accounts.
#[derive(Clone)]
pub struct LedgerReviewsService {
    ledger: Ledger,
    reviews: Arc<dyn ReviewsRepository>,
    accounts: Arc<dyn AccountsRepository>,
    retry_limit: u32,
}

impl LedgerReviewsService {
    /// Create the service.
    #[must_use]
    pub fn new(
        ledger: Ledger,
        reviews: Arc<dyn ReviewsRepository>,
        accounts: Arc<dyn AccountsRepository>,
        retry_limit: u32,
    ) -> Self {
        Self {
            ledger,
            reviews,
            accounts,
            retry_limit,
        }
    }

    /// Undo an accepted review that could not be stored: remove the bonus and the reviewed mark.
    async fn take_back_bonus(
        &self,
        account_id: &AccountId,
        product: &ProductId,
    ) -> Result<(), ReviewsServiceError> {
        let engine = *self.ledger.engine();
        let bonus = engine.rates().per_review;

        update_account(
            &self.ledger,
            self.accounts.as_ref(),
            account_id,
            self.retry_limit,
            |current| {
                let refunded = engine.redeem_points(current, bonus)?;

                Ok::<_, ReviewsServiceError>(refunded.without_review_of(product))
            },
        )
        .await?;

        Ok(())
    }
}

impl fmt::Debug for LedgerReviewsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerReviewsService")
            .field("ledger", &self.ledger)
            .field("retry_limit", &self.retry_limit)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ReviewsService for LedgerReviewsService {
    async fn submit(
        &self,
        account_id: &AccountId,
        review: NewReview,
    ) -> Result<AcceptedReview, ReviewsServiceError> {
        // The account's record of reviewed products is checked and updated in the same
        // conditional write as the bonus, so concurrent submissions cannot both be accepted.
        let existing = self.reviews.reviews_for_product(&review.product_id).await?;
        let draft = ReviewDraft {
            id: Uuid::now_v7().to_string(),
            product_id: review.product_id,
            rating: review.rating,
            comment: review.comment,
            created_at: Timestamp::now(),
        };

        let ledger = self.ledger;

        let (account, review) = update_account_with(
            &ledger,
            self.accounts.as_ref(),
            account_id,
            self.retry_limit,
            |current| {
                let accepted = ledger.submit_review(current, draft.clone(), &existing)?;

                Ok::<_, ReviewsServiceError>((accepted.account, accepted.review))
            },
        )
        .await?;

        if let Err(cause) = self.reviews.add_review(review.clone()).await {
            let cause = ReviewsServiceError::from(cause);

            if let Err(compensation) = self.take_back_bonus(account_id, &review.product_id).await {
                error!(
                    account = %account_id,
                    review = %review.id,
                    %cause,
                    %compensation,
                    "review bonus credited but review not stored"
                );

                return Err(ReviewsServiceError::Compensation {
                    cause: Box::new(cause),
                    compensation: Box::new(compensation),
                });
            }

            return Err(cause);
        }

        info!(
            account = %account_id,
            product = %review.product_id,
            rating = review.rating.stars(),
            "review accepted"
        );

        Ok(AcceptedReview { account, review })
    }

    async fn product_reviews(
        &self,
        product: &ProductId,
    ) -> Result<ProductReviews, ReviewsServiceError> {
        let reviews = self.reviews.reviews_for_product(product).await?;
        let average = average_rating(&reviews);

        Ok(ProductReviews { reviews, average })
    }
}

/// Product review operations.
#[automock]
#[async_trait]
pub trait ReviewsService: Send + Sync {
    /// Accept a review from a purchaser and credit the review bonus.
    async fn submit(
        &self,
        account_id: &AccountId,
        review: NewReview,
    ) -> Result<AcceptedReview, ReviewsServiceError>;

    /// Reviews of a product with their average rating.
    async fn product_reviews(
        &self,
        product: &ProductId,
    ) -> Result<ProductReviews, ReviewsServiceError>;
}
