//! Inventory service.
//!
//! Stock changes go through the repository's compare-and-swap: read the count, compute the new
//! count with the ledger, and write it only if the count is still the one that was read.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use sands::{
    inventory::{self, Inventory},
    ledger::Ledger,
    orders::LineItem,
    products::ProductId,
};
use tracing::{debug, error, info, warn};

use crate::domain::inventory::{
    errors::InventoryServiceError,
    models::{Reservation, StockReport},
    repository::InventoryRepository,
};

/// Inventory service backed by an [`InventoryRepository`].
#[derive(Clone)]
pub struct LedgerInventoryService {
    ledger: Ledger,
    repository: Arc<dyn InventoryRepository>,
    retry_limit: u32,
}

impl LedgerInventoryService {
    /// Create the service.
    #[must_use]
    pub fn new(
        ledger: Ledger,
        repository: Arc<dyn InventoryRepository>,
        retry_limit: u32,
    ) -> Self {
        Self {
            ledger,
            repository,
            retry_limit,
        }
    }

    fn report(&self, product_id: ProductId, stock: u32) -> StockReport {
        let level = inventory::StockLevel::classify(stock, self.ledger.low_stock_threshold());

        StockReport {
            product_id,
            stock,
            level,
        }
    }

    async fn update_stock<F>(
        &self,
        product: &ProductId,
        mut update: F,
    ) -> Result<u32, InventoryServiceError>
    where
        F: FnMut(u32) -> Result<u32, InventoryServiceError> + Send,
    {
        let attempts = self.retry_limit.max(1);

        for attempt in 1..=attempts {
            let observed = self.repository.stock(product).await?;
            let new = update(observed)?;

            if self
                .repository
                .compare_and_swap(product, observed, new)
                .await?
            {
                return Ok(new);
            }

            debug!(%product, attempt, observed, "stock changed during update, retrying");
        }

        Err(InventoryServiceError::Contention {
            product: product.clone(),
            attempts,
        })
    }
}

impl fmt::Debug for LedgerInventoryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerInventoryService")
            .field("ledger", &self.ledger)
            .field("retry_limit", &self.retry_limit)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl InventoryService for LedgerInventoryService {
    async fn inventory(&self) -> Result<Inventory, InventoryServiceError> {
        Ok(self.repository.inventory().await?)
    }

    async fn stock_report(&self) -> Result<Vec<StockReport>, InventoryServiceError> {
        let inventory = self.repository.inventory().await?;

        Ok(inventory
            .entries()
            .into_iter()
            .map(|(product, stock)| self.report(product.clone(), stock))
            .collect())
    }

    async fn stock_level(&self, product: &ProductId) -> Result<StockReport, InventoryServiceError> {
        let stock = self.repository.stock(product).await?;

        Ok(self.report(product.clone(), stock))
    }

    async fn decrement(
        &self,
        product: &ProductId,
        quantity: u32,
    ) -> Result<u32, InventoryServiceError> {
        let remaining = self
            .update_stock(product, |stock| {
                Ok(inventory::checked_decrement(product, stock, quantity)?)
            })
            .await?;

        if self.report(product.clone(), remaining).level.is_low() {
            warn!(%product, remaining, "stock is running low");
        }

        Ok(remaining)
    }

    async fn restore(&self, product: &ProductId, quantity: u32) -> Result<u32, InventoryServiceError> {
        self.update_stock(product, |stock| {
            Ok(inventory::checked_restore(product, stock, quantity)?)
        })
        .await
    }

    async fn reserve(&self, lines: &[LineItem]) -> Result<Vec<Reservation>, InventoryServiceError> {
        let mut reserved: Vec<Reservation> = Vec::new();

        for (product_id, quantity) in inventory::quantities(lines) {
            match self.decrement(&product_id, quantity).await {
                Ok(_) => reserved.push(Reservation {
                    product_id,
                    quantity,
                }),
                Err(cause) => {
                    if let Err(restore) = self.release(&reserved).await {
                        return Err(InventoryServiceError::Compensation {
                            cause: Box::new(cause),
                            restore: Box::new(restore),
                        });
                    }

                    return Err(cause);
                }
            }
        }

        Ok(reserved)
    }

    async fn release(&self, reservations: &[Reservation]) -> Result<(), InventoryServiceError> {
        let mut first_failure = None;

        for reservation in reservations {
            if let Err(failure) = self
                .restore(&reservation.product_id, reservation.quantity)
                .await
            {
                error!(
                    product = %reservation.product_id,
                    quantity = reservation.quantity,
                    %failure,
                    "failed to restore reserved stock; inventory is inconsistent"
                );

                first_failure.get_or_insert(failure);
            }
        }

        first_failure.map_or(Ok(()), Err)
    }

    async fn set_stock(&self, product: &ProductId, stock: i64) -> Result<u32, InventoryServiceError> {
        let stock = inventory::validate_stock(product, stock)?;

        self.repository.set_stock(product, stock).await?;

        info!(%product, stock, "stock overridden");

        Ok(stock)
    }
}

/// Stock bookkeeping.
#[automock]
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Full stock snapshot.
    async fn inventory(&self) -> Result<Inventory, InventoryServiceError>;

    /// Stock and availability for every product with a record, sorted by product id.
    async fn stock_report(&self) -> Result<Vec<StockReport>, InventoryServiceError>;

    /// Stock and availability for one product.
    async fn stock_level(&self, product: &ProductId) -> Result<StockReport, InventoryServiceError>;

    /// Take `quantity` units of `product`, returning the remaining stock.
    async fn decrement(
        &self,
        product: &ProductId,
        quantity: u32,
    ) -> Result<u32, InventoryServiceError>;

    /// Put `quantity` units of `product` back, returning the new stock.
    async fn restore(&self, product: &ProductId, quantity: u32) -> Result<u32, InventoryServiceError>;

    /// Take every line item out of stock, or none of them.
    async fn reserve(&self, lines: &[LineItem]) -> Result<Vec<Reservation>, InventoryServiceError>;

    /// Put reserved units back. Every reservation is attempted; the first failure is returned.
    async fn release(&self, reservations: &[Reservation]) -> Result<(), InventoryServiceError>;

    /// Administrative override of a product's stock.
    async fn set_stock(&self, product: &ProductId, stock: i64) -> Result<u32, InventoryServiceError>;
}
