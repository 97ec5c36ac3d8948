//! Reviews

pub mod errors;
pub mod models;
pub mod repository;
pub mod service;

pub use errors::ReviewsServiceError;
pub use repository::{MockReviewsRepository, ReviewsRepository};
pub use service::*;
