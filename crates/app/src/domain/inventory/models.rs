//! Inventory models

use sands::{inventory::StockLevel, products::ProductId};

/// Stock of one product with its availability flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockReport {
    /// Product.
    pub product_id: ProductId,

    /// Units in stock.
    pub stock: u32,

    /// Availability against the low-stock threshold.
    pub level: StockLevel,
}

/// Units taken from stock for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// Product.
    pub product_id: ProductId,

    /// Units taken.
    pub quantity: u32,
}
