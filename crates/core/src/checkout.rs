//! Checkout
//!
//! A checkout is planned against an account snapshot and committed against account and
//! inventory snapshots together. The commit is all-or-nothing: either every line item is taken
//! out of stock, the redeemed points are spent, the purchase award is credited and the order is
//! recorded, or nothing changes.

use jiff::Timestamp;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    accounts::Account,
    inventory::{Inventory, InventoryError},
    ledger::Ledger,
    loyalty::PointsError,
    orders::{LineItem, Order, OrderId, OrderStatus},
    redemption::{RedemptionChoice, RedemptionError, RedemptionQuote, quote_choice},
};

/// Errors raised while planning or committing a checkout.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// The cart has no line items.
    #[error("cart is empty")]
    EmptyCart,

    /// A price or total does not fit the ledger's amount range.
    #[error("cart amount overflowed")]
    AmountOverflow,

    /// Wrapped inventory error.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Wrapped redemption error.
    #[error(transparent)]
    Redemption(#[from] RedemptionError),

    /// Wrapped points error.
    #[error(transparent)]
    Points(#[from] PointsError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A cart ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Identifier for the resulting order.
    pub order_id: OrderId,

    /// When the order is placed.
    pub created_at: Timestamp,

    /// One entry per purchased unit.
    pub items: Vec<LineItem>,

    /// Whether to spend points against the subtotal.
    pub redemption: RedemptionChoice,
}

/// Amounts a checkout will charge and award, computed before anything is written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckoutPlan<'a> {
    subtotal: Money<'a, Currency>,
    redemption: RedemptionQuote<'a>,
    total: Money<'a, Currency>,
    points_earned: u64,
}

impl<'a> CheckoutPlan<'a> {
    /// Sum of the line item prices.
    pub fn subtotal(&self) -> &Money<'a, Currency> {
        &self.subtotal
    }

    /// Points discount, empty when redemption was declined.
    pub fn redemption(&self) -> &RedemptionQuote<'a> {
        &self.redemption
    }

    /// Amount charged: subtotal less the points discount.
    pub fn total(&self) -> &Money<'a, Currency> {
        &self.total
    }

    /// Points the purchase earns, computed on the discounted total.
    pub fn points_earned(&self) -> u64 {
        self.points_earned
    }

    /// Apply the plan to an account: spend the redeemed points, credit the purchase award and
    /// record `order`.
    ///
    /// # Errors
    ///
    /// Returns [`RedemptionError::RedemptionOverflow`] when the account no longer holds the
    /// points the plan redeems.
    pub fn settle(
        &self,
        ledger: &Ledger,
        account: &Account,
        order: Order,
    ) -> Result<Account, CheckoutError> {
        let engine = ledger.engine();

        let redeemed = engine.redeem_points(account, self.redemption.points_consumed())?;
        let awarded = engine.award_points(&redeemed, self.points_earned);

        Ok(awarded.with_order(order))
    }

    /// Build the order record this plan produces.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::AmountOverflow`] when an amount cannot be stored.
    pub fn order(
        &self,
        id: OrderId,
        created_at: Timestamp,
        items: &[LineItem],
    ) -> Result<Order, CheckoutError> {
        Ok(Order {
            id,
            created_at,
            status: OrderStatus::Processing,
            total: to_stored(&self.total)?,
            items: items.iter().cloned().collect::<SmallVec<_>>(),
            discount_applied: to_stored(self.redemption.discount())?,
            points_redeemed: self.redemption.points_consumed(),
            points_earned: self.points_earned,
        })
    }
}

/// Snapshots produced by a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedCheckout {
    /// Account with points spent and awarded and the order recorded.
    pub account: Account,

    /// Inventory with every line item taken out of stock.
    pub inventory: Inventory,

    /// The recorded order.
    pub order: Order,
}

/// Sum the line item prices in `currency`.
///
/// # Errors
///
/// Returns [`CheckoutError::AmountOverflow`] when a price or the sum does not fit.
pub fn subtotal<'a>(
    items: &[LineItem],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, CheckoutError> {
    let minor = items.iter().try_fold(0_i64, |acc, item| {
        i64::try_from(item.unit_price)
            .ok()
            .and_then(|price| acc.checked_add(price))
            .ok_or(CheckoutError::AmountOverflow)
    })?;

    Ok(Money::from_minor(minor, currency))
}

/// Work out what a cart costs the account and what it earns, without changing anything.
///
/// # Errors
///
/// - [`CheckoutError::EmptyCart`]: `items` is empty.
/// - [`CheckoutError::AmountOverflow`]: the subtotal does not fit.
/// - [`CheckoutError::Redemption`] / [`CheckoutError::Points`]: see
///   [`crate::redemption::quote`] and [`crate::loyalty::PointsEngine::purchase_points`].
pub fn plan(
    ledger: &Ledger,
    account: &Account,
    items: &[LineItem],
    choice: RedemptionChoice,
) -> Result<CheckoutPlan<'static>, CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let subtotal = subtotal(items, ledger.currency())?;
    let redemption = quote_choice(choice, account.points(), subtotal, ledger.redemption_rate())?;
    let total = redemption.apply(subtotal)?;
    let points_earned = ledger.engine().purchase_points(&total)?;

    Ok(CheckoutPlan {
        subtotal,
        redemption,
        total,
        points_earned,
    })
}

/// Commit a cart against account and inventory snapshots.
///
/// # Errors
///
/// Any [`plan`] error, or [`CheckoutError::Inventory`] when a product has too little stock. No
/// snapshot is modified on error.
pub fn commit(
    ledger: &Ledger,
    account: &Account,
    inventory: &Inventory,
    request: CheckoutRequest,
) -> Result<CommittedCheckout, CheckoutError> {
    let plan = plan(ledger, account, &request.items, request.redemption)?;
    let inventory = inventory.decrement_lines(&request.items)?;
    let order = plan.order(request.order_id, request.created_at, &request.items)?;
    let account = plan.settle(ledger, account, order.clone())?;

    Ok(CommittedCheckout {
        account,
        inventory,
        order,
    })
}

fn to_stored(amount: &Money<'_, Currency>) -> Result<u64, CheckoutError> {
    u64::try_from(amount.to_minor_units())
        .ok()
        .ok_or(CheckoutError::AmountOverflow)
}
