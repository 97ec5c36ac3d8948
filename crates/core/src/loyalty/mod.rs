//! Loyalty
//!
//! Point awards for purchases, reviews and referrals, and the membership tier derived from a
//! points balance.

pub mod points;
pub mod tiers;

pub use points::{PointsEngine, PointsError, PointsRates};
pub use tiers::{Tier, TierError, TierProgress, TierThresholds};
