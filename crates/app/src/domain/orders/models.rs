//! Order models

use sands::{accounts::AccountId, orders::Order};
use serde::{Deserialize, Serialize};

/// An order in the store-wide order log, tagged with the account that placed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Account that placed the order.
    pub account_id: AccountId,

    /// The order.
    #[serde(flatten)]
    pub order: Order,
}
