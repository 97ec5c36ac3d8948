//! Accounts

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    loyalty::tiers::Tier,
    orders::{Order, OrderError, OrderId},
    products::ProductId,
};

/// Account identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Creates a new account identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AccountId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A loyalty account.
///
/// Points and tier only change through [`crate::loyalty::PointsEngine`], which recomputes the
/// tier on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    name: String,
    points: u64,
    tier: Tier,
    orders: Vec<Order>,

    /// Products the account has reviewed, in review order.
    #[serde(default)]
    reviewed: Vec<ProductId>,
}

impl Account {
    /// Open a new account with no points and no orders.
    pub fn new(id: impl Into<AccountId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            points: 0,
            tier: Tier::Silver,
            orders: Vec::new(),
            reviewed: Vec::new(),
        }
    }

    /// Account identifier.
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cumulative points balance.
    pub fn points(&self) -> u64 {
        self.points
    }

    /// Membership tier.
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Orders, newest first.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Look up one of the account's orders.
    pub fn order(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| &order.id == id)
    }

    /// Whether any order on the account contains `product`.
    pub fn has_purchased(&self, product: &ProductId) -> bool {
        self.orders.iter().any(|order| order.contains(product))
    }

    /// Whether the account has already reviewed `product`.
    pub fn has_reviewed(&self, product: &ProductId) -> bool {
        self.reviewed.contains(product)
    }

    /// Products the account has reviewed.
    pub fn reviewed(&self) -> &[ProductId] {
        &self.reviewed
    }

    /// Return a copy that records a review of `product`.
    #[must_use]
    pub fn with_review_of(&self, product: &ProductId) -> Self {
        let mut updated = self.clone();

        if !updated.reviewed.contains(product) {
            updated.reviewed.push(product.clone());
        }

        updated
    }

    /// Return a copy without the review of `product`, for a review that could not be stored.
    #[must_use]
    pub fn without_review_of(&self, product: &ProductId) -> Self {
        let mut updated = self.clone();
        updated.reviewed.retain(|reviewed| reviewed != product);

        updated
    }

    /// Return a copy with `order` placed at the front of the order history.
    #[must_use]
    pub fn with_order(&self, order: Order) -> Self {
        let mut orders = Vec::with_capacity(self.orders.len() + 1);
        orders.push(order);
        orders.extend(self.orders.iter().cloned());

        Self {
            orders,
            ..self.clone()
        }
    }

    /// Return a copy with the stored order of the same id replaced by `order`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] when the account has no order with that id.
    pub fn with_updated_order(&self, order: Order) -> Result<Self, OrderError> {
        let position = self
            .orders
            .iter()
            .position(|existing| existing.id == order.id)
            .ok_or_else(|| OrderError::NotFound(order.id.clone()))?;

        let mut updated = self.clone();
        if let Some(slot) = updated.orders.get_mut(position) {
            *slot = order;
        }

        Ok(updated)
    }

    #[must_use]
    pub(crate) fn with_points(&self, points: u64, tier: Tier) -> Self {
        Self {
            points,
            tier,
            ..self.clone()
        }
    }
}
