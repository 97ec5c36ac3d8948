//! Sands Domain Concerns

pub mod accounts;
pub mod checkout;
pub mod inventory;
pub mod orders;
pub mod reviews;
