//! Sands prelude.
//!
//! Convenience exports for ledger consumers.

pub use crate::{
    accounts::{Account, AccountId},
    catalog::{Catalog, CatalogError, Category, Product},
    checkout::{CheckoutError, CheckoutPlan, CheckoutRequest, CommittedCheckout},
    config::{ConfigError, LedgerConfig},
    inventory::{Inventory, InventoryError, StockLevel},
    ledger::Ledger,
    loyalty::{
        PointsEngine, PointsError, PointsRates, Tier, TierError, TierProgress, TierThresholds,
    },
    orders::{LineItem, Order, OrderError, OrderId, OrderStatus},
    products::ProductId,
    redemption::{RedemptionChoice, RedemptionError, RedemptionQuote},
    reviews::{
        AcceptedReview, Ineligibility, Rating, Review, ReviewDraft, ReviewError, average_rating,
    },
};
