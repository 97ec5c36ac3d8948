//! Ledger Configuration
//!
//! Every rate and threshold the ledger applies. Defaults are the storefront's published loyalty
//! programme: KWD prices, gold at 500 points, platinum at 1500, 10 points per KWD spent, 50 per
//! review, 250 per referral, 100 points per KWD of discount and a low-stock warning below 5 pairs.

use std::{fs, num::NonZeroU64, path::Path};

use rusty_money::iso::{self, Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::loyalty::{PointsRates, TierThresholds};

const DEFAULT_REDEMPTION_RATE: NonZeroU64 = match NonZeroU64::new(100) {
    Some(rate) => rate,
    None => NonZeroU64::MIN,
};

/// Errors raised while loading ledger configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration file.
    #[error("failed to read ledger config: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error, including invalid tier thresholds.
    #[error("failed to parse ledger config: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Currency code not recognised as an ISO currency.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Ledger rules, injected into [`crate::ledger::Ledger`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// ISO 4217 code of the store currency.
    pub currency: String,

    /// Tier thresholds.
    pub tiers: TierThresholds,

    /// Points earned per event.
    pub points: PointsRates,

    /// Points per whole currency unit of discount.
    pub redemption_rate: NonZeroU64,

    /// Stock below this count (and above zero) is flagged as low.
    pub low_stock_threshold: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            currency: iso::KWD.iso_alpha_code.to_owned(),
            tiers: TierThresholds::default(),
            points: PointsRates::default(),
            redemption_rate: DEFAULT_REDEMPTION_RATE,
            low_stock_threshold: 5,
        }
    }
}

impl LedgerConfig {
    /// Parse configuration from YAML. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] for malformed YAML, unknown fields or invalid thresholds,
    /// and [`ConfigError::UnknownCurrency`] for an unrecognised currency code.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_norway::from_str(yaml)?;

        config.currency()?;

        Ok(config)
    }

    /// Read and parse a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise see
    /// [`LedgerConfig::from_yaml_str`].
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path)?;

        Self::from_yaml_str(&yaml)
    }

    /// Resolve the configured currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] for an unrecognised code.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        iso::find(&self.currency).ok_or_else(|| ConfigError::UnknownCurrency(self.currency.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::loyalty::Tier;

    use super::*;

    #[test]
    fn defaults_match_storefront_programme() -> TestResult {
        let config = LedgerConfig::default();

        assert_eq!(config.currency()?, iso::KWD);
        assert_eq!(config.redemption_rate.get(), 100);
        assert_eq!(config.low_stock_threshold, 5);
        assert_eq!(config.points.per_currency_unit, Decimal::TEN);
        assert_eq!(config.tiers.tier_for(500), Tier::Gold);

        Ok(())
    }

    #[test]
    fn partial_yaml_keeps_defaults() -> TestResult {
        let config = LedgerConfig::from_yaml_str("low_stock_threshold: 3\n")?;

        assert_eq!(config.low_stock_threshold, 3);
        assert_eq!(config.redemption_rate.get(), 100);

        Ok(())
    }

    #[test]
    fn full_yaml_overrides_everything() -> TestResult {
        let config = LedgerConfig::from_yaml_str(
            "currency: USD
tiers:
  gold: 1000
  platinum: 5000
points:
  per_currency_unit: \"2.5\"
  per_review: 20
  per_referral: 100
redemption_rate: 50
low_stock_threshold: 2
",
        )?;

        assert_eq!(config.currency()?, iso::USD);
        assert_eq!(config.tiers.tier_for(999), Tier::Silver);
        assert_eq!(config.points.per_currency_unit, Decimal::new(25, 1));
        assert_eq!(config.points.per_review, 20);
        assert_eq!(config.redemption_rate.get(), 50);

        Ok(())
    }

    #[test]
    fn zero_redemption_rate_is_rejected() {
        let result = LedgerConfig::from_yaml_str("redemption_rate: 0\n");

        assert!(
            matches!(result, Err(ConfigError::Yaml(_))),
            "expected YAML error, got {result:?}"
        );
    }

    #[test]
    fn unknown_currency_is_rejected() {
        let result = LedgerConfig::from_yaml_str("currency: XYZ\n");

        assert!(
            matches!(result, Err(ConfigError::UnknownCurrency(ref code)) if code == "XYZ"),
            "expected unknown currency, got {result:?}"
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = LedgerConfig::from_yaml_str("points_per_kwd: 10\n");

        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn loads_from_file() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "tiers:\n  gold: 10\n  platinum: 20")?;

        let config = LedgerConfig::from_yaml_file(file.path())?;

        assert_eq!(config.tiers.tier_for(15), Tier::Gold);

        Ok(())
    }
}
