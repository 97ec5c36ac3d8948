//! Points Redemption
//!
//! Converts a points balance into a checkout discount at a fixed number of points per whole
//! currency unit. Quotes are bounded on both sides: the discount never exceeds the subtotal and
//! the points consumed never exceed the points available.

use std::num::NonZeroU64;

use rusty_money::{Money, MoneyError, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while quoting or applying a redemption.
#[derive(Debug, Error, PartialEq)]
pub enum RedemptionError {
    /// More points would be consumed than are available. Never clamped.
    #[error("redemption would consume {consumed} points but only {available} are available")]
    RedemptionOverflow {
        /// Points the redemption would consume.
        consumed: u64,

        /// Points available on the account.
        available: u64,
    },

    /// The discount would exceed the subtotal (discount, subtotal, in minor units).
    #[error("discount of {0} minor units exceeds subtotal of {1} minor units")]
    DiscountExceedsSubtotal(i64, i64),

    /// Subtotals must not be negative.
    #[error("subtotal must not be negative ({0} minor units)")]
    NegativeSubtotal(i64),

    /// Points or currency amounts could not be represented.
    #[error("redemption amount overflowed")]
    Conversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Whether the customer opted to spend points at checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedemptionChoice {
    /// Spend points against the subtotal.
    Redeem,

    /// Keep the points; no discount.
    #[default]
    Decline,
}

impl From<bool> for RedemptionChoice {
    fn from(redeem: bool) -> Self {
        if redeem {
            RedemptionChoice::Redeem
        } else {
            RedemptionChoice::Decline
        }
    }
}

/// A discount bought with points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedemptionQuote<'a> {
    discount: Money<'a, Currency>,
    points_consumed: u64,
}

impl<'a> RedemptionQuote<'a> {
    /// A quote that spends nothing.
    pub fn none(currency: &'a Currency) -> Self {
        Self {
            discount: Money::from_minor(0, currency),
            points_consumed: 0,
        }
    }

    /// Discount off the subtotal.
    pub fn discount(&self) -> &Money<'a, Currency> {
        &self.discount
    }

    /// Points spent on the discount.
    pub fn points_consumed(&self) -> u64 {
        self.points_consumed
    }

    /// Subtotal with the discount taken off.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] when the subtotal is in another currency.
    pub fn apply(&self, subtotal: Money<'a, Currency>) -> Result<Money<'a, Currency>, MoneyError> {
        subtotal.sub(self.discount)
    }
}

/// Quote the discount `points_available` can buy against `subtotal`.
///
/// The discount the balance could buy is `points_available / rate` whole currency units, floored
/// to the currency's minor unit. When that exceeds the subtotal, the discount is the subtotal
/// and only `subtotal × rate` points are consumed (rounded up to a whole point). Otherwise the
/// whole balance is consumed.
///
/// # Errors
///
/// - [`RedemptionError::NegativeSubtotal`]: `subtotal` is negative.
/// - [`RedemptionError::Conversion`]: an intermediate amount does not fit.
/// - [`RedemptionError::RedemptionOverflow`] / [`RedemptionError::DiscountExceedsSubtotal`]: the
///   quote broke one of its bounds. Unreachable for valid inputs; reported rather than clamped.
pub fn quote<'a>(
    points_available: u64,
    subtotal: Money<'a, Currency>,
    rate: NonZeroU64,
) -> Result<RedemptionQuote<'a>, RedemptionError> {
    let currency = subtotal.currency();
    let subtotal_minor = subtotal.to_minor_units();

    let Ok(subtotal_units) = u128::try_from(subtotal_minor) else {
        return Err(RedemptionError::NegativeSubtotal(subtotal_minor));
    };

    let minor_per_unit = 10_u128
        .checked_pow(currency.exponent)
        .ok_or(RedemptionError::Conversion)?;
    let rate = u128::from(rate.get());

    let potential = u128::from(points_available) * minor_per_unit / rate;

    let (discount, consumed) = if potential > subtotal_units {
        let consumed = (subtotal_units * rate).div_ceil(minor_per_unit);

        (subtotal_units, consumed)
    } else {
        (potential, u128::from(points_available))
    };

    let discount = i64::try_from(discount)
        .ok()
        .ok_or(RedemptionError::Conversion)?;
    let points_consumed = u64::try_from(consumed)
        .ok()
        .ok_or(RedemptionError::Conversion)?;

    if points_consumed > points_available {
        return Err(RedemptionError::RedemptionOverflow {
            consumed: points_consumed,
            available: points_available,
        });
    }

    if discount > subtotal_minor {
        return Err(RedemptionError::DiscountExceedsSubtotal(
            discount,
            subtotal_minor,
        ));
    }

    Ok(RedemptionQuote {
        discount: Money::from_minor(discount, currency),
        points_consumed,
    })
}

/// Quote honouring the customer's opt-in; declining always yields an empty quote.
///
/// # Errors
///
/// See [`quote`].
pub fn quote_choice<'a>(
    choice: RedemptionChoice,
    points_available: u64,
    subtotal: Money<'a, Currency>,
    rate: NonZeroU64,
) -> Result<RedemptionQuote<'a>, RedemptionError> {
    match choice {
        RedemptionChoice::Redeem => quote(points_available, subtotal, rate),
        RedemptionChoice::Decline => Ok(RedemptionQuote::none(subtotal.currency())),
    }
}
