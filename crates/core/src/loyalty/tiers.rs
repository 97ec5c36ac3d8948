//! Membership Tiers

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when tier thresholds do not describe three contiguous ranges.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TierError {
    /// The gold threshold must be above zero so silver is a non-empty range.
    #[error("gold threshold must be greater than zero")]
    ZeroGoldThreshold,

    /// The platinum threshold must be above the gold threshold (gold, platinum).
    #[error("platinum threshold {1} must be greater than gold threshold {0}")]
    InvalidThresholds(u64, u64),
}

/// Membership tier, derived purely from cumulative points.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    /// Entry tier.
    #[default]
    Silver,

    /// Middle tier.
    Gold,

    /// Top tier.
    Platinum,
}

impl Tier {
    /// The tier above this one, if any.
    pub const fn next(self) -> Option<Self> {
        match self {
            Tier::Silver => Some(Tier::Gold),
            Tier::Gold => Some(Tier::Platinum),
            Tier::Platinum => None,
        }
    }

    /// Upper-case tier name, as shown on the storefront badge.
    pub const fn as_str(self) -> &'static str {
        match self {
            Tier::Silver => "SILVER",
            Tier::Gold => "GOLD",
            Tier::Platinum => "PLATINUM",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower bounds of the gold and platinum tiers.
///
/// Silver covers `[0, gold)`, gold covers `[gold, platinum)` and platinum covers
/// `[platinum, ∞)`. Construction rejects thresholds that would leave a range empty or make
/// ranges overlap, so [`TierThresholds::tier_for`] is total over every points value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawThresholds", into = "RawThresholds")]
pub struct TierThresholds {
    gold: u64,
    platinum: u64,
}

impl TierThresholds {
    /// Create thresholds for the gold and platinum tiers.
    ///
    /// # Errors
    ///
    /// - [`TierError::ZeroGoldThreshold`]: `gold` is zero.
    /// - [`TierError::InvalidThresholds`]: `platinum` is not above `gold`.
    pub const fn new(gold: u64, platinum: u64) -> Result<Self, TierError> {
        if gold == 0 {
            return Err(TierError::ZeroGoldThreshold);
        }

        if platinum <= gold {
            return Err(TierError::InvalidThresholds(gold, platinum));
        }

        Ok(Self { gold, platinum })
    }

    /// Map cumulative points to the tier whose range contains them.
    pub const fn tier_for(&self, points: u64) -> Tier {
        if points >= self.platinum {
            Tier::Platinum
        } else if points >= self.gold {
            Tier::Gold
        } else {
            Tier::Silver
        }
    }

    /// Lowest points value inside the given tier.
    pub const fn floor(&self, tier: Tier) -> u64 {
        match tier {
            Tier::Silver => 0,
            Tier::Gold => self.gold,
            Tier::Platinum => self.platinum,
        }
    }

    /// Describe how far `points` are through their current tier.
    pub fn progress(&self, points: u64) -> TierProgress {
        let tier = self.tier_for(points);

        let Some(next) = tier.next() else {
            return TierProgress {
                tier,
                next: None,
                points_to_next: 0,
                percent: 100,
            };
        };

        let floor = self.floor(tier);
        let ceiling = self.floor(next);

        // `floor <= points < ceiling`, so the band is non-empty and the ratio stays below 100.
        let band = u128::from(ceiling - floor);
        let covered = u128::from(points - floor);
        let percent = u8::try_from(covered * 100 / band).unwrap_or(100);

        TierProgress {
            tier,
            next: Some(next),
            points_to_next: ceiling - points,
            percent,
        }
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            gold: 500,
            platinum: 1500,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawThresholds {
    gold: u64,
    platinum: u64,
}

impl TryFrom<RawThresholds> for TierThresholds {
    type Error = TierError;

    fn try_from(raw: RawThresholds) -> Result<Self, Self::Error> {
        Self::new(raw.gold, raw.platinum)
    }
}

impl From<TierThresholds> for RawThresholds {
    fn from(thresholds: TierThresholds) -> Self {
        Self {
            gold: thresholds.gold,
            platinum: thresholds.platinum,
        }
    }
}

/// Progress through the current tier towards the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierProgress {
    /// Current tier.
    pub tier: Tier,

    /// Next tier, `None` at the top tier.
    pub next: Option<Tier>,

    /// Points still needed to reach the next tier; zero at the top tier.
    pub points_to_next: u64,

    /// Whole-percent progress through the current tier's band; 100 at the top tier.
    pub percent: u8,
}
