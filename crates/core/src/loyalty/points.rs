//! Points Engine

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    accounts::Account,
    loyalty::tiers::{Tier, TierProgress, TierThresholds},
    redemption::RedemptionError,
};

/// Errors raised while computing point awards.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PointsError {
    /// A purchase award was requested for a negative amount.
    #[error("cannot award points for a negative amount ({0} minor units)")]
    NegativeAmount(i64),

    /// The award could not be represented as a whole number of points.
    #[error("points award overflowed or could not be converted")]
    Conversion,
}

/// Fixed point rates for each earning event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PointsRates {
    /// Points earned per whole currency unit spent.
    pub per_currency_unit: Decimal,

    /// Flat award for an accepted review.
    pub per_review: u64,

    /// Flat award credited to a referrer.
    pub per_referral: u64,
}

impl Default for PointsRates {
    fn default() -> Self {
        Self {
            per_currency_unit: Decimal::TEN,
            per_review: 50,
            per_referral: 250,
        }
    }
}

/// Computes point awards and keeps an account's tier in step with its points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointsEngine {
    thresholds: TierThresholds,
    rates: PointsRates,
}

impl PointsEngine {
    /// Create an engine from tier thresholds and point rates.
    pub const fn new(thresholds: TierThresholds, rates: PointsRates) -> Self {
        Self { thresholds, rates }
    }

    /// Tier thresholds in use.
    pub const fn thresholds(&self) -> &TierThresholds {
        &self.thresholds
    }

    /// Point rates in use.
    pub const fn rates(&self) -> &PointsRates {
        &self.rates
    }

    /// Tier for a points balance.
    pub const fn tier_for(&self, points: u64) -> Tier {
        self.thresholds.tier_for(points)
    }

    /// Add `amount` points to the account and recompute its tier.
    ///
    /// The balance saturates at `u64::MAX`.
    #[must_use]
    pub fn award_points(&self, account: &Account, amount: u64) -> Account {
        let points = account.points().saturating_add(amount);

        account.with_points(points, self.tier_for(points))
    }

    /// Remove redeemed points from the account and recompute its tier.
    ///
    /// # Errors
    ///
    /// Returns [`RedemptionError::RedemptionOverflow`] when `amount` exceeds the balance. The
    /// balance is never clamped.
    pub fn redeem_points(&self, account: &Account, amount: u64) -> Result<Account, RedemptionError> {
        let points = account
            .points()
            .checked_sub(amount)
            .ok_or(RedemptionError::RedemptionOverflow {
                consumed: amount,
                available: account.points(),
            })?;

        Ok(account.with_points(points, self.tier_for(points)))
    }

    /// Re-derive the tier from the stored points, e.g. after thresholds change.
    #[must_use]
    pub fn reconcile(&self, account: &Account) -> Account {
        account.with_points(account.points(), self.tier_for(account.points()))
    }

    /// Points earned for spending `spent`: `floor(spent × per_currency_unit)`.
    ///
    /// # Errors
    ///
    /// - [`PointsError::NegativeAmount`]: `spent` is negative.
    /// - [`PointsError::Conversion`]: the award does not fit in a `u64`.
    pub fn purchase_points(&self, spent: &Money<'_, Currency>) -> Result<u64, PointsError> {
        let minor = spent.to_minor_units();

        if minor < 0 {
            return Err(PointsError::NegativeAmount(minor));
        }

        let major = Decimal::try_new(minor, spent.currency().exponent)
            .ok()
            .ok_or(PointsError::Conversion)?;

        major
            .checked_mul(self.rates.per_currency_unit)
            .map(|points| points.floor())
            .and_then(|points| points.to_u64())
            .ok_or(PointsError::Conversion)
    }

    /// Flat award for an accepted review.
    pub const fn review_points(&self) -> u64 {
        self.rates.per_review
    }

    /// Flat award for a completed referral.
    pub const fn referral_points(&self) -> u64 {
        self.rates.per_referral
    }

    /// Award purchase points for `spent`.
    ///
    /// # Errors
    ///
    /// See [`PointsEngine::purchase_points`].
    pub fn award_purchase(
        &self,
        account: &Account,
        spent: &Money<'_, Currency>,
    ) -> Result<Account, PointsError> {
        Ok(self.award_points(account, self.purchase_points(spent)?))
    }

    /// Award the flat review bonus.
    #[must_use]
    pub fn award_review(&self, account: &Account) -> Account {
        self.award_points(account, self.rates.per_review)
    }

    /// Award the flat referral bonus to the referrer.
    #[must_use]
    pub fn award_referral(&self, account: &Account) -> Account {
        self.award_points(account, self.rates.per_referral)
    }

    /// Progress of the account through its current tier.
    pub fn progress(&self, account: &Account) -> TierProgress {
        self.thresholds.progress(account.points())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{KWD, USD};
    use testresult::TestResult;

    use super::*;

    fn account_with(engine: &PointsEngine, points: u64) -> Account {
        engine.award_points(&Account::new("u1", "Noor"), points)
    }

    #[test]
    fn award_points_recomputes_tier() {
        let engine = PointsEngine::default();

        let account = account_with(&engine, 450);
        let account = engine.award_points(&account, 60);

        assert_eq!(account.points(), 510);
        assert_eq!(account.tier(), Tier::Gold);
    }

    #[test]
    fn award_points_saturates() {
        let engine = PointsEngine::default();

        let account = account_with(&engine, u64::MAX - 1);
        let account = engine.award_points(&account, 10);

        assert_eq!(account.points(), u64::MAX);
        assert_eq!(account.tier(), Tier::Platinum);
    }

    #[test]
    fn purchase_points_floor_fractional_units() -> TestResult {
        let engine = PointsEngine::default();

        // 6.059 KWD at 10 points per KWD is 60.59 points.
        let points = engine.purchase_points(&Money::from_minor(6_059, KWD))?;

        assert_eq!(points, 60);

        Ok(())
    }

    #[test]
    fn purchase_points_respect_currency_exponent() -> TestResult {
        let engine = PointsEngine::default();

        let points = engine.purchase_points(&Money::from_minor(1_250, USD))?;

        assert_eq!(points, 125);

        Ok(())
    }

    #[test]
    fn purchase_points_support_fractional_rates() -> TestResult {
        let rates = PointsRates {
            per_currency_unit: Decimal::new(15, 1),
            ..PointsRates::default()
        };
        let engine = PointsEngine::new(TierThresholds::default(), rates);

        let points = engine.purchase_points(&Money::from_minor(3_000, KWD))?;

        assert_eq!(points, 4);

        Ok(())
    }

    #[test]
    fn purchase_points_reject_negative_amounts() {
        let engine = PointsEngine::default();

        assert_eq!(
            engine.purchase_points(&Money::from_minor(-1, KWD)),
            Err(PointsError::NegativeAmount(-1))
        );
    }

    #[test]
    fn flat_awards_use_configured_rates() {
        let engine = PointsEngine::default();
        let account = Account::new("u1", "Noor");

        assert_eq!(engine.award_review(&account).points(), 50);
        assert_eq!(engine.award_referral(&account).points(), 250);
    }

    #[test]
    fn redeem_points_can_drop_tier() -> TestResult {
        let engine = PointsEngine::default();
        let account = account_with(&engine, 520);

        let account = engine.redeem_points(&account, 100)?;

        assert_eq!(account.points(), 420);
        assert_eq!(account.tier(), Tier::Silver);

        Ok(())
    }

    #[test]
    fn redeem_points_never_clamps() {
        let engine = PointsEngine::default();
        let account = account_with(&engine, 20);

        assert_eq!(
            engine.redeem_points(&account, 21),
            Err(RedemptionError::RedemptionOverflow {
                consumed: 21,
                available: 20,
            })
        );
    }

    #[test]
    fn reconcile_applies_new_thresholds() -> TestResult {
        let account = account_with(&PointsEngine::default(), 600);
        let stricter = PointsEngine::new(TierThresholds::new(1000, 2000)?, PointsRates::default());

        assert_eq!(stricter.reconcile(&account).tier(), Tier::Silver);

        Ok(())
    }
}
