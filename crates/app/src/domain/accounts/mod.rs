//! Accounts

pub mod errors;
pub mod models;
pub mod repository;
pub mod service;

pub use errors::{AccountUpdateError, AccountsServiceError};
pub use repository::{AccountsRepository, MockAccountsRepository};
pub use service::*;
