//! Orders

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::products::ProductId;

/// Errors raised when moving an order through its lifecycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// The order has already been delivered and cannot advance further.
    #[error("order {0} has already been delivered")]
    AlreadyDelivered(OrderId),

    /// No order with the given identifier exists on the account.
    #[error("order {0} not found")]
    NotFound(OrderId),
}

/// Order identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Creates a new order identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Fulfilment status. Orders only ever move forward: `Processing` → `Shipped` → `Delivered`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Paid and awaiting dispatch.
    #[default]
    Processing,

    /// Handed to the courier.
    Shipped,

    /// Received by the customer. Terminal.
    Delivered,
}

impl OrderStatus {
    /// The following status, `None` once delivered.
    pub const fn next(self) -> Option<Self> {
        match self {
            OrderStatus::Processing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
        };

        f.write_str(label)
    }
}

/// One purchased unit of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Purchased product.
    pub product_id: ProductId,

    /// Unit price in minor currency units.
    pub unit_price: u64,

    /// Chosen shoe size.
    pub size: String,
}

impl LineItem {
    /// Create a line item.
    pub fn new(product_id: impl Into<ProductId>, unit_price: u64, size: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            unit_price,
            size: size.into(),
        }
    }
}

/// A completed purchase.
///
/// Monetary amounts are stored in minor currency units of the ledger currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier.
    pub id: OrderId,

    /// When the order was placed.
    pub created_at: Timestamp,

    /// Fulfilment status.
    pub status: OrderStatus,

    /// Amount charged, after any points discount.
    pub total: u64,

    /// Purchased units.
    pub items: SmallVec<[LineItem; 4]>,

    /// Discount bought with loyalty points.
    #[serde(default)]
    pub discount_applied: u64,

    /// Points spent on the discount.
    #[serde(default)]
    pub points_redeemed: u64,

    /// Points awarded for the purchase.
    #[serde(default)]
    pub points_earned: u64,
}

impl Order {
    /// Whether any line item in the order is for `product`.
    pub fn contains(&self, product: &ProductId) -> bool {
        self.items.iter().any(|item| &item.product_id == product)
    }

    /// Return a copy of the order moved to its next status.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::AlreadyDelivered`] when the order is already delivered.
    pub fn advance(&self) -> Result<Self, OrderError> {
        let status = self
            .status
            .next()
            .ok_or_else(|| OrderError::AlreadyDelivered(self.id.clone()))?;

        Ok(Self {
            status,
            ..self.clone()
        })
    }
}
