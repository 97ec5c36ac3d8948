//! Orders service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use sands::{
    accounts::AccountId,
    ledger::Ledger,
    orders::{OrderError, OrderId},
};
use tracing::info;

use crate::domain::{
    accounts::{AccountsRepository, update_account},
    orders::{errors::OrdersServiceError, models::OrderRecord, repository::OrdersRepository},
};

/// Orders service over the order log and the owning accounts.
#[derive(Clone)]
pub struct LedgerOrdersService {
    ledger: Ledger,
    orders: Arc<dyn OrdersRepository>,
    accounts: Arc<dyn AccountsRepository>,
    retry_limit: u32,
}

impl LedgerOrdersService {
    /// Create the service.
    #[must_use]
    pub fn new(
        ledger: Ledger,
        orders: Arc<dyn OrdersRepository>,
        accounts: Arc<dyn AccountsRepository>,
        retry_limit: u32,
    ) -> Self {
        Self {
            ledger,
            orders,
            accounts,
            retry_limit,
        }
    }
}

impl fmt::Debug for LedgerOrdersService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerOrdersService")
            .field("ledger", &self.ledger)
            .field("retry_limit", &self.retry_limit)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl OrdersService for LedgerOrdersService {
    async fn all_orders(&self) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        Ok(self.orders.all_orders().await?)
    }

    async fn advance(
        &self,
        account_id: &AccountId,
        order_id: &OrderId,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let account = update_account(
            &self.ledger,
            self.accounts.as_ref(),
            account_id,
            self.retry_limit,
            |current| {
                let order = current
                    .order(order_id)
                    .ok_or_else(|| OrderError::NotFound(order_id.clone()))?
                    .advance()?;

                Ok::<_, OrdersServiceError>(current.with_updated_order(order)?)
            },
        )
        .await?;

        let order = account
            .order(order_id)
            .cloned()
            .ok_or_else(|| OrderError::NotFound(order_id.clone()))?;

        let record = OrderRecord {
            account_id: account_id.clone(),
            order,
        };

        self.orders.put_order(record.clone()).await?;

        info!(
            account = %account_id,
            order = %order_id,
            status = %record.order.status,
            "order advanced"
        );

        Ok(record)
    }
}

/// Order log operations for the admin dashboard.
#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Every order in the store, newest first.
    async fn all_orders(&self) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Move an order to its next fulfilment status.
    async fn advance(
        &self,
        account_id: &AccountId,
        order_id: &OrderId,
    ) -> Result<OrderRecord, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use sands::orders::{LineItem, Order, OrderStatus};
    use testresult::TestResult;

    use crate::{domain::accounts::AccountsService, test::TestContext};

    use super::*;

    fn placed_order(id: &str) -> Order {
        Order {
            id: OrderId::from(id),
            created_at: Timestamp::UNIX_EPOCH,
            status: OrderStatus::Processing,
            total: 55_000,
            items: [LineItem::new("1", 55_000, "US 9")].into_iter().collect(),
            discount_applied: 0,
            points_redeemed: 0,
            points_earned: 550,
        }
    }

    #[tokio::test]
    async fn advance_moves_order_forward_everywhere() -> TestResult {
        let ctx = TestContext::new();
        ctx.open_account_with_order("u1", placed_order("ORD-1")).await?;

        let shipped = ctx
            .orders
            .advance(&AccountId::from("u1"), &OrderId::from("ORD-1"))
            .await?;

        assert_eq!(shipped.order.status, OrderStatus::Shipped);

        let account = ctx.accounts.get_account(&AccountId::from("u1")).await?;
        let log = ctx.orders.all_orders().await?;

        assert_eq!(
            account.order(&OrderId::from("ORD-1")).map(|order| order.status),
            Some(OrderStatus::Shipped)
        );
        assert_eq!(log, [shipped]);

        Ok(())
    }

    #[tokio::test]
    async fn delivered_orders_do_not_advance() -> TestResult {
        let ctx = TestContext::new();
        ctx.open_account_with_order("u1", placed_order("ORD-1")).await?;

        let account_id = AccountId::from("u1");
        let order_id = OrderId::from("ORD-1");

        ctx.orders.advance(&account_id, &order_id).await?;
        ctx.orders.advance(&account_id, &order_id).await?;

        let result = ctx.orders.advance(&account_id, &order_id).await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::Order(OrderError::AlreadyDelivered(_)))
            ),
            "expected AlreadyDelivered, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() -> TestResult {
        let ctx = TestContext::new();
        ctx.open_account("u1", 0).await?;

        let result = ctx
            .orders
            .advance(&AccountId::from("u1"), &OrderId::from("ORD-404"))
            .await;

        assert!(matches!(
            result,
            Err(OrdersServiceError::Order(OrderError::NotFound(_)))
        ));

        Ok(())
    }
}
