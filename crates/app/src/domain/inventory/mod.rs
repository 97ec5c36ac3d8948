//! Inventory

pub mod errors;
pub mod models;
pub mod repository;
pub mod service;

pub use errors::InventoryServiceError;
pub use repository::{InventoryRepository, MockInventoryRepository};
pub use service::*;
