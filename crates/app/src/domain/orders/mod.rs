//! Orders

pub mod errors;
pub mod models;
pub mod repository;
pub mod service;

pub use errors::OrdersServiceError;
pub use repository::{MockOrdersRepository, OrdersRepository};
pub use service::*;
