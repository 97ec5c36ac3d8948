//! Reviews
//!
//! Review submission is gated: an account may review a product once, and only after buying it.

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    accounts::{Account, AccountId},
    loyalty::PointsEngine,
    products::ProductId,
};

/// Why an account may not review a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    /// No order on the account contains the product.
    NotPurchased,

    /// The account has already reviewed the product.
    AlreadyReviewed,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligibility::NotPurchased => f.write_str("product has not been purchased"),
            Ineligibility::AlreadyReviewed => f.write_str("product has already been reviewed"),
        }
    }
}

/// Errors raised when submitting a review.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    /// The account is not allowed to review the product.
    #[error("account {account} may not review product {product}: {reason}")]
    IneligibleReview {
        /// Reviewing account.
        account: AccountId,

        /// Reviewed product.
        product: ProductId,

        /// Reason for the rejection.
        reason: Ineligibility,
    },

    /// Ratings are whole stars from 1 to 5.
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
}

/// Star rating from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Number of stars.
    pub const fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ReviewError;

    fn try_from(stars: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(ReviewError::InvalidRating(stars))
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// A customer review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Review identifier.
    pub id: String,

    /// Reviewed product.
    pub product_id: ProductId,

    /// Reviewing account.
    pub account_id: AccountId,

    /// Reviewer display name.
    pub author: String,

    /// Star rating.
    pub rating: Rating,

    /// Free-text comment.
    pub comment: String,

    /// When the review was written.
    pub created_at: Timestamp,
}

/// Review content before it has been accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    /// Identifier to give the accepted review.
    pub id: String,

    /// Product to review.
    pub product_id: ProductId,

    /// Star rating.
    pub rating: Rating,

    /// Free-text comment.
    pub comment: String,

    /// Submission time.
    pub created_at: Timestamp,
}

/// An accepted review and the account after its points award.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedReview {
    /// Account with the review bonus applied.
    pub account: Account,

    /// Review to persist.
    pub review: Review,
}

/// Check whether `account` may review `product`, given its record of reviewed products and the
/// product's existing reviews.
///
/// # Errors
///
/// Returns [`ReviewError::IneligibleReview`] when the account has not bought the product or has
/// already reviewed it.
pub fn check_eligibility(
    account: &Account,
    product: &ProductId,
    existing: &[Review],
) -> Result<(), ReviewError> {
    let reject = |reason| ReviewError::IneligibleReview {
        account: account.id().clone(),
        product: product.clone(),
        reason,
    };

    if !account.has_purchased(product) {
        return Err(reject(Ineligibility::NotPurchased));
    }

    let already_reviewed = account.has_reviewed(product)
        || existing
            .iter()
            .any(|review| &review.product_id == product && review.account_id == *account.id());

    if already_reviewed {
        return Err(reject(Ineligibility::AlreadyReviewed));
    }

    Ok(())
}

/// Accept a review, award the review bonus and record the product as reviewed on the account,
/// or reject it with nothing changed.
///
/// # Errors
///
/// See [`check_eligibility`].
pub fn submit_review(
    engine: &PointsEngine,
    account: &Account,
    draft: ReviewDraft,
    existing: &[Review],
) -> Result<AcceptedReview, ReviewError> {
    check_eligibility(account, &draft.product_id, existing)?;

    let review = Review {
        id: draft.id,
        product_id: draft.product_id,
        account_id: account.id().clone(),
        author: account.name().to_owned(),
        rating: draft.rating,
        comment: draft.comment,
        created_at: draft.created_at,
    };

    Ok(AcceptedReview {
        account: engine.award_review(account).with_review_of(&review.product_id),
        review,
    })
}

/// Mean star rating, `None` when there are no reviews.
pub fn average_rating(reviews: &[Review]) -> Option<Decimal> {
    if reviews.is_empty() {
        return None;
    }

    let total: u64 = reviews
        .iter()
        .map(|review| u64::from(review.rating.stars()))
        .sum();

    Some(Decimal::from(total) / Decimal::from(reviews.len()))
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::orders::{LineItem, Order, OrderId, OrderStatus};

    use super::*;

    fn buyer_of(product: &str) -> Account {
        Account::new("u1", "Noor").with_order(Order {
            id: OrderId::from("ORD-1"),
            created_at: Timestamp::UNIX_EPOCH,
            status: OrderStatus::Delivered,
            total: 65_000,
            items: smallvec![LineItem::new(product, 65_000, "43")],
            discount_applied: 0,
            points_redeemed: 0,
            points_earned: 650,
        })
    }

    fn draft(product: &str, stars: u8) -> Result<ReviewDraft, ReviewError> {
        Ok(ReviewDraft {
            id: "rev-1".to_owned(),
            product_id: ProductId::from(product),
            rating: Rating::try_from(stars)?,
            comment: "Comfortable all day".to_owned(),
            created_at: Timestamp::UNIX_EPOCH,
        })
    }

    #[test]
    fn purchaser_review_is_accepted_with_bonus() -> TestResult {
        let engine = PointsEngine::default();
        let account = buyer_of("3");

        let accepted = submit_review(&engine, &account, draft("3", 5)?, &[])?;

        assert_eq!(accepted.account.points(), account.points() + 50);
        assert_eq!(accepted.review.author, "Noor");
        assert_eq!(accepted.review.account_id, AccountId::from("u1"));

        Ok(())
    }

    #[test]
    fn review_without_purchase_is_ineligible() -> TestResult {
        let engine = PointsEngine::default();
        let account = Account::new("u1", "Noor");

        let result = submit_review(&engine, &account, draft("3", 4)?, &[]);

        assert_eq!(
            result,
            Err(ReviewError::IneligibleReview {
                account: AccountId::from("u1"),
                product: ProductId::from("3"),
                reason: Ineligibility::NotPurchased,
            })
        );

        Ok(())
    }

    #[test]
    fn account_record_blocks_second_review_before_it_is_stored() -> TestResult {
        let engine = PointsEngine::default();
        let first = submit_review(&engine, &buyer_of("3"), draft("3", 5)?, &[])?;

        assert!(first.account.has_reviewed(&ProductId::from("3")));

        let result = submit_review(&engine, &first.account, draft("3", 4)?, &[]);

        assert!(
            matches!(
                result,
                Err(ReviewError::IneligibleReview {
                    reason: Ineligibility::AlreadyReviewed,
                    ..
                })
            ),
            "expected AlreadyReviewed, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn second_review_is_ineligible() -> TestResult {
        let engine = PointsEngine::default();
        let account = buyer_of("3");
        let first = submit_review(&engine, &account, draft("3", 5)?, &[])?;

        let result = submit_review(&engine, &first.account, draft("3", 2)?, &[first.review]);

        assert!(
            matches!(
                result,
                Err(ReviewError::IneligibleReview {
                    reason: Ineligibility::AlreadyReviewed,
                    ..
                })
            ),
            "expected AlreadyReviewed, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn other_accounts_reviews_do_not_block() -> TestResult {
        let engine = PointsEngine::default();
        let other = Review {
            id: "rev-0".to_owned(),
            product_id: ProductId::from("3"),
            account_id: AccountId::from("u2"),
            author: "Sara".to_owned(),
            rating: Rating::try_from(3_u8)?,
            comment: String::new(),
            created_at: Timestamp::UNIX_EPOCH,
        };

        let accepted = submit_review(&engine, &buyer_of("3"), draft("3", 5)?, &[other]);

        assert!(accepted.is_ok(), "review should be accepted: {accepted:?}");

        Ok(())
    }

    #[test]
    fn rating_must_be_one_to_five() {
        assert_eq!(Rating::try_from(0_u8), Err(ReviewError::InvalidRating(0)));
        assert_eq!(Rating::try_from(6_u8), Err(ReviewError::InvalidRating(6)));
        assert_eq!(Rating::try_from(5_u8).map(Rating::stars), Ok(5));
    }

    #[test]
    fn average_rating_of_reviews() -> TestResult {
        let review = |stars: u8| -> Result<Review, ReviewError> {
            Ok(Review {
                id: "rev".to_owned(),
                product_id: ProductId::from("3"),
                account_id: AccountId::from("u1"),
                author: "Noor".to_owned(),
                rating: Rating::try_from(stars)?,
                comment: String::new(),
                created_at: Timestamp::UNIX_EPOCH,
            })
        };

        let reviews = [review(5)?, review(4)?];

        assert_eq!(average_rating(&reviews), Some(Decimal::new(45, 1)));
        assert_eq!(average_rating(&[]), None);

        Ok(())
    }
}
