//! Sands application: stores, services and reports.

pub mod config;
pub mod context;
pub mod domain;
pub mod observability;
pub mod reports;
pub mod storage;

#[cfg(test)]
mod test;
