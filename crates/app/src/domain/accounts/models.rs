//! Account models

use sands::{
    accounts::{Account, AccountId},
    loyalty::TierProgress,
};

/// Details for opening an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Account identifier.
    pub id: AccountId,

    /// Display name.
    pub name: String,
}

/// An account with its progress through the membership tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSummary {
    /// The account.
    pub account: Account,

    /// Tier progress as shown on the account page.
    pub progress: TierProgress,
}
