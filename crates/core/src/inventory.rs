//! Inventory Ledger
//!
//! Per-product stock counts. Counts are unsigned, so a decrement that would take stock below
//! zero is rejected before anything changes. Products without a record have no stock.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{orders::LineItem, products::ProductId};

/// Errors raised by inventory updates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    /// Fewer units are in stock than were requested.
    #[error("product {product} is out of stock: requested {requested}, available {available}")]
    OutOfStock {
        /// Product that ran out.
        product: ProductId,

        /// Units requested.
        requested: u32,

        /// Units in stock when the request was checked.
        available: u32,
    },

    /// Administrative overrides must be a non-negative count that fits the ledger.
    #[error("invalid stock level {value} for product {product}")]
    InvalidStock {
        /// Product being overridden.
        product: ProductId,

        /// Rejected stock value.
        value: i64,
    },

    /// Restoring stock would overflow the counter.
    #[error("stock for product {0} would overflow")]
    StockOverflow(ProductId),
}

/// Availability as presented on product pages and the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    /// Nothing left.
    SoldOut,

    /// Some stock, below the low-stock threshold.
    Low(u32),

    /// Stock at or above the low-stock threshold.
    InStock(u32),
}

impl StockLevel {
    /// Classify a stock count against a low-stock threshold.
    pub const fn classify(stock: u32, low_stock_threshold: u32) -> Self {
        if stock == 0 {
            StockLevel::SoldOut
        } else if stock < low_stock_threshold {
            StockLevel::Low(stock)
        } else {
            StockLevel::InStock(stock)
        }
    }

    /// `stock > 0`.
    pub const fn is_available(self) -> bool {
        !matches!(self, StockLevel::SoldOut)
    }

    /// `0 < stock < threshold`.
    pub const fn is_low(self) -> bool {
        matches!(self, StockLevel::Low(_))
    }
}

/// Take `qty` units from `stock`.
///
/// # Errors
///
/// Returns [`InventoryError::OutOfStock`] when `qty` exceeds `stock`.
pub fn checked_decrement(product: &ProductId, stock: u32, qty: u32) -> Result<u32, InventoryError> {
    stock
        .checked_sub(qty)
        .ok_or_else(|| InventoryError::OutOfStock {
            product: product.clone(),
            requested: qty,
            available: stock,
        })
}

/// Validate an administrative stock override.
///
/// # Errors
///
/// Returns [`InventoryError::InvalidStock`] when `new_stock` is negative or too large.
pub fn validate_stock(product: &ProductId, new_stock: i64) -> Result<u32, InventoryError> {
    u32::try_from(new_stock)
        .ok()
        .ok_or_else(|| InventoryError::InvalidStock {
            product: product.clone(),
            value: new_stock,
        })
}

/// Take `qty` units back into `stock`.
///
/// # Errors
///
/// Returns [`InventoryError::StockOverflow`] when the count would overflow.
pub fn checked_restore(product: &ProductId, stock: u32, qty: u32) -> Result<u32, InventoryError> {
    stock
        .checked_add(qty)
        .ok_or_else(|| InventoryError::StockOverflow(product.clone()))
}

/// Count units per product, in order of first appearance.
///
/// A cart may hold the same product several times; each occurrence is one unit.
pub fn quantities(lines: &[LineItem]) -> Vec<(ProductId, u32)> {
    let mut counts: Vec<(ProductId, u32)> = Vec::new();

    for line in lines {
        match counts
            .iter_mut()
            .find(|(product, _)| product == &line.product_id)
        {
            Some((_, qty)) => *qty = qty.saturating_add(1),
            None => counts.push((line.product_id.clone(), 1)),
        }
    }

    counts
}

/// Snapshot of stock per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    stock: FxHashMap<ProductId, u32>,
}

impl Inventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stock for a product; zero when the product has no record.
    pub fn stock(&self, product: &ProductId) -> u32 {
        self.stock.get(product).copied().unwrap_or(0)
    }

    /// Whether the product has a stock record.
    pub fn contains(&self, product: &ProductId) -> bool {
        self.stock.contains_key(product)
    }

    /// Number of products with a stock record.
    pub fn len(&self) -> usize {
        self.stock.len()
    }

    /// Whether no product has a stock record.
    pub fn is_empty(&self) -> bool {
        self.stock.is_empty()
    }

    /// Stock records sorted by product id.
    pub fn entries(&self) -> Vec<(&ProductId, u32)> {
        let mut entries: Vec<_> = self.stock.iter().map(|(id, stock)| (id, *stock)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Availability of a product against a low-stock threshold.
    pub fn level(&self, product: &ProductId, low_stock_threshold: u32) -> StockLevel {
        StockLevel::classify(self.stock(product), low_stock_threshold)
    }

    /// Return a copy with `qty` units of `product` removed.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::OutOfStock`] when `qty` exceeds the current stock; `self` is left
    /// untouched.
    pub fn decrement(&self, product: &ProductId, qty: u32) -> Result<Self, InventoryError> {
        let remaining = checked_decrement(product, self.stock(product), qty)?;

        Ok(self.with_stock(product, remaining))
    }

    /// Return a copy with every line item taken out of stock, or an error and no changes.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::OutOfStock`] for the first product whose total quantity exceeds
    /// its stock.
    pub fn decrement_lines(&self, lines: &[LineItem]) -> Result<Self, InventoryError> {
        quantities(lines)
            .iter()
            .try_fold(self.clone(), |inventory, (product, qty)| {
                inventory.decrement(product, *qty)
            })
    }

    /// Return a copy with `qty` units of `product` put back.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::StockOverflow`] when the count would overflow.
    pub fn restore(&self, product: &ProductId, qty: u32) -> Result<Self, InventoryError> {
        let restored = checked_restore(product, self.stock(product), qty)?;

        Ok(self.with_stock(product, restored))
    }

    /// Return a copy with the stock of `product` overridden.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InvalidStock`] when `new_stock` is negative or too large.
    pub fn set_stock(&self, product: &ProductId, new_stock: i64) -> Result<Self, InventoryError> {
        let stock = validate_stock(product, new_stock)?;

        Ok(self.with_stock(product, stock))
    }

    /// Overwrite the stock record for `product` in place.
    pub fn set(&mut self, product: ProductId, stock: u32) {
        self.stock.insert(product, stock);
    }

    fn with_stock(&self, product: &ProductId, stock: u32) -> Self {
        let mut updated = self.clone();
        updated.set(product.clone(), stock);
        updated
    }
}

impl FromIterator<(ProductId, u32)> for Inventory {
    fn from_iter<T: IntoIterator<Item = (ProductId, u32)>>(iter: T) -> Self {
        Self {
            stock: iter.into_iter().collect(),
        }
    }
}
