//! Ledger
//!
//! [`Ledger`] binds a [`LedgerConfig`] to the operations that need it, so callers configure the
//! rules once and pass snapshots through.

use std::num::NonZeroU64;

use rusty_money::{
    Money,
    iso::{self, Currency},
};

use crate::{
    accounts::Account,
    checkout::{self, CheckoutError, CheckoutPlan, CheckoutRequest, CommittedCheckout},
    config::{ConfigError, LedgerConfig},
    inventory::{Inventory, StockLevel},
    loyalty::{PointsEngine, Tier, TierProgress},
    orders::LineItem,
    products::ProductId,
    redemption::{self, RedemptionChoice, RedemptionQuote},
    reviews::{self, AcceptedReview, Review, ReviewDraft, ReviewError},
};

/// Configured loyalty and inventory rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ledger {
    engine: PointsEngine,
    redemption_rate: NonZeroU64,
    low_stock_threshold: u32,
    currency: &'static Currency,
}

impl Ledger {
    /// Build a ledger from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] when the configured currency is not an ISO code.
    pub fn new(config: &LedgerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: PointsEngine::new(config.tiers, config.points),
            redemption_rate: config.redemption_rate,
            low_stock_threshold: config.low_stock_threshold,
            currency: config.currency()?,
        })
    }

    /// Points engine.
    pub const fn engine(&self) -> &PointsEngine {
        &self.engine
    }

    /// Points per whole currency unit of discount.
    pub const fn redemption_rate(&self) -> NonZeroU64 {
        self.redemption_rate
    }

    /// Low-stock threshold.
    pub const fn low_stock_threshold(&self) -> u32 {
        self.low_stock_threshold
    }

    /// Store currency.
    pub const fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// An amount in minor units of the store currency.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::AmountOverflow`] when `minor` does not fit.
    pub fn money(&self, minor: u64) -> Result<Money<'static, Currency>, CheckoutError> {
        let minor = i64::try_from(minor)
            .ok()
            .ok_or(CheckoutError::AmountOverflow)?;

        Ok(Money::from_minor(minor, self.currency))
    }

    /// Tier for a points balance.
    pub const fn tier_for(&self, points: u64) -> Tier {
        self.engine.tier_for(points)
    }

    /// Add points and recompute the tier.
    #[must_use]
    pub fn award_points(&self, account: &Account, amount: u64) -> Account {
        self.engine.award_points(account, amount)
    }

    /// Credit the referral bonus to the referrer.
    #[must_use]
    pub fn award_referral(&self, referrer: &Account) -> Account {
        self.engine.award_referral(referrer)
    }

    /// Progress through the account's tier.
    pub fn progress(&self, account: &Account) -> TierProgress {
        self.engine.progress(account)
    }

    /// The account with its tier re-derived from its points under these rules.
    #[must_use]
    pub fn reconcile(&self, account: &Account) -> Account {
        self.engine.reconcile(account)
    }

    /// Quote the discount `points` can buy against a subtotal in minor units.
    ///
    /// # Errors
    ///
    /// See [`redemption::quote`].
    pub fn quote(
        &self,
        points: u64,
        subtotal: u64,
        choice: RedemptionChoice,
    ) -> Result<RedemptionQuote<'static>, CheckoutError> {
        let subtotal = self.money(subtotal)?;

        Ok(redemption::quote_choice(
            choice,
            points,
            subtotal,
            self.redemption_rate,
        )?)
    }

    /// Price a cart for an account without changing anything.
    ///
    /// # Errors
    ///
    /// See [`checkout::plan`].
    pub fn plan_checkout(
        &self,
        account: &Account,
        items: &[LineItem],
        choice: RedemptionChoice,
    ) -> Result<CheckoutPlan<'static>, CheckoutError> {
        checkout::plan(self, account, items, choice)
    }

    /// Commit a cart against account and inventory snapshots.
    ///
    /// # Errors
    ///
    /// See [`checkout::commit`].
    pub fn commit_checkout(
        &self,
        account: &Account,
        inventory: &Inventory,
        request: CheckoutRequest,
    ) -> Result<CommittedCheckout, CheckoutError> {
        checkout::commit(self, account, inventory, request)
    }

    /// Availability of a product.
    pub fn stock_level(&self, inventory: &Inventory, product: &ProductId) -> StockLevel {
        inventory.level(product, self.low_stock_threshold)
    }

    /// Accept a review and award the review bonus.
    ///
    /// # Errors
    ///
    /// See [`reviews::submit_review`].
    pub fn submit_review(
        &self,
        account: &Account,
        draft: ReviewDraft,
        existing: &[Review],
    ) -> Result<AcceptedReview, ReviewError> {
        reviews::submit_review(&self.engine, account, draft, existing)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        let config = LedgerConfig::default();

        Self {
            engine: PointsEngine::new(config.tiers, config.points),
            redemption_rate: config.redemption_rate,
            low_stock_threshold: config.low_stock_threshold,
            currency: iso::KWD,
        }
    }
}
