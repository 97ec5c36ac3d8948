//! Sands
//!
//! Sands is the loyalty and inventory ledger behind the Sands & Souls storefront: point awards,
//! membership tiers, points redemption at checkout and per-product stock bookkeeping.
//!
//! Every operation is a pure function over snapshots. Callers own persistence and are expected to
//! apply the returned snapshots with an atomic read-modify-write against their store.

pub mod accounts;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod inventory;
pub mod ledger;
pub mod loyalty;
pub mod orders;
pub mod prelude;
pub mod products;
pub mod redemption;
pub mod reviews;
