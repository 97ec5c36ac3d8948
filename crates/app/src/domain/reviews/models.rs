//! Review models

use rust_decimal::Decimal;
use sands::{
    products::ProductId,
    reviews::{Rating, Review},
};

/// A review as submitted by a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    /// Product to review.
    pub product_id: ProductId,

    /// Star rating.
    pub rating: Rating,

    /// Free-text comment.
    pub comment: String,
}

/// Reviews shown on a product page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductReviews {
    /// Reviews, oldest first.
    pub reviews: Vec<Review>,

    /// Mean rating, `None` without reviews.
    pub average: Option<Decimal>,
}
