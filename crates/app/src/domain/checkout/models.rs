//! Checkout models

use sands::{
    accounts::{Account, AccountId},
    orders::{LineItem, Order},
    redemption::RedemptionChoice,
};

/// A cart submitted for checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCheckout {
    /// Buying account.
    pub account_id: AccountId,

    /// Units in the cart.
    pub items: Vec<LineItem>,

    /// Whether to spend points on a discount.
    pub redemption: RedemptionChoice,
}

/// Outcome of a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    /// Account after points were spent and awarded.
    pub account: Account,

    /// The placed order.
    pub order: Order,
}
