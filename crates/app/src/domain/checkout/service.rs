//! Checkout service.
//!
//! A checkout touches three stores that share no transaction, so it runs as a sequence of
//! compensable steps:
//!
//! 1. reserve stock for every line item, or none of them;
//! 2. settle the account (spend redeemed points, award purchase points, record the order);
//! 3. append the order to the store-wide order log.
//!
//! If settling fails the reserved stock is put back. The order log is written last and on a best
//! effort basis: the account's own order history is authoritative.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sands::{accounts::Account, checkout::CheckoutPlan, ledger::Ledger, orders::OrderId};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    accounts::{AccountUpdateError, AccountsRepository, update_account_with},
    checkout::{
        errors::CheckoutServiceError,
        models::{CheckoutReceipt, NewCheckout},
    },
    inventory::{InventoryService, models::Reservation},
    orders::{OrdersRepository, models::OrderRecord},
};

/// Checkout service coordinating accounts, stock and the order log.
#[derive(Clone)]
pub struct LedgerCheckoutService {
    ledger: Ledger,
    accounts: Arc<dyn AccountsRepository>,
    inventory: Arc<dyn InventoryService>,
    orders: Arc<dyn OrdersRepository>,
    retry_limit: u32,
}

impl LedgerCheckoutService {
    /// Create the service.
    #[must_use]
    pub fn new(
        ledger: Ledger,
        accounts: Arc<dyn AccountsRepository>,
        inventory: Arc<dyn InventoryService>,
        orders: Arc<dyn OrdersRepository>,
        retry_limit: u32,
    ) -> Self {
        Self {
            ledger,
            accounts,
            inventory,
            orders,
            retry_limit,
        }
    }

    async fn load_account(&self, cart: &NewCheckout) -> Result<Account, CheckoutServiceError> {
        let account = self
            .accounts
            .get_account(&cart.account_id)
            .await?
            .ok_or_else(|| AccountUpdateError::NotFound(cart.account_id.clone()))?;

        Ok(self.ledger.reconcile(&account))
    }

    /// Put reserved stock back after `cause` aborted the checkout.
    async fn abort(
        &self,
        cause: CheckoutServiceError,
        reservations: &[Reservation],
    ) -> CheckoutServiceError {
        match self.inventory.release(reservations).await {
            Ok(()) => cause,
            Err(restore) => {
                error!(%cause, %restore, "checkout aborted but reserved stock was not restored");

                CheckoutServiceError::Compensation {
                    cause: Box::new(cause),
                    restore: Box::new(restore.into()),
                }
            }
        }
    }
}

impl fmt::Debug for LedgerCheckoutService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerCheckoutService")
            .field("ledger", &self.ledger)
            .field("retry_limit", &self.retry_limit)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CheckoutService for LedgerCheckoutService {
    async fn quote(&self, cart: &NewCheckout) -> Result<CheckoutPlan<'static>, CheckoutServiceError> {
        let account = self.load_account(cart).await?;

        Ok(self
            .ledger
            .plan_checkout(&account, &cart.items, cart.redemption)?)
    }

    async fn checkout(&self, cart: NewCheckout) -> Result<CheckoutReceipt, CheckoutServiceError> {
        // Reject bad carts before any stock is taken.
        self.quote(&cart).await?;

        let reservations = self.inventory.reserve(&cart.items).await?;

        let ledger = self.ledger;
        let order_id = OrderId::from(format!("ORD-{}", Uuid::now_v7()));
        let created_at = Timestamp::now();

        let settled = update_account_with(
            &ledger,
            self.accounts.as_ref(),
            &cart.account_id,
            self.retry_limit,
            |current| {
                let plan = ledger.plan_checkout(current, &cart.items, cart.redemption)?;
                let order = plan.order(order_id.clone(), created_at, &cart.items)?;
                let account = plan.settle(&ledger, current, order.clone())?;

                Ok::<_, CheckoutServiceError>((account, order))
            },
        )
        .await;

        let (account, order) = match settled {
            Ok(settled) => settled,
            Err(cause) => return Err(self.abort(cause, &reservations).await),
        };

        let record = OrderRecord {
            account_id: cart.account_id.clone(),
            order: order.clone(),
        };

        if let Err(failure) = self.orders.submit_order(record).await {
            warn!(
                account = %cart.account_id,
                order = %order.id,
                %failure,
                "order placed but not added to the order log"
            );
        }

        info!(
            account = %cart.account_id,
            order = %order.id,
            total = order.total,
            points_redeemed = order.points_redeemed,
            points_earned = order.points_earned,
            tier = %account.tier(),
            "checkout completed"
        );

        Ok(CheckoutReceipt { account, order })
    }
}

/// Cart pricing and checkout.
#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Price a cart for its account without changing anything.
    async fn quote(&self, cart: &NewCheckout) -> Result<CheckoutPlan<'static>, CheckoutServiceError>;

    /// Place an order: take the stock, settle the account and log the order.
    async fn checkout(&self, cart: NewCheckout) -> Result<CheckoutReceipt, CheckoutServiceError>;
}
