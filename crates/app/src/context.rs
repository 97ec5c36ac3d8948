//! App Context

use std::{fmt, path::Path, sync::Arc};

use sands::{
    catalog::{Catalog, CatalogError},
    config::{ConfigError, LedgerConfig},
    ledger::Ledger,
};
use thiserror::Error;
use tracing::info;

use crate::{
    config::AppConfig,
    domain::{
        accounts::{AccountsRepository, AccountsService, LedgerAccountsService},
        checkout::{CheckoutService, LedgerCheckoutService},
        inventory::{InventoryRepository, InventoryService, LedgerInventoryService},
        orders::{LedgerOrdersService, OrdersRepository, OrdersService},
        reviews::{LedgerReviewsService, ReviewsRepository, ReviewsService},
    },
    storage::{Fallback, JsonStore, StoreError},
};

/// Errors raised while building the application context.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The ledger rules could not be loaded.
    #[error("failed to load ledger config")]
    Config(#[from] ConfigError),

    /// The catalog could not be loaded.
    #[error("failed to load catalog")]
    Catalog(#[from] CatalogError),

    /// The built-in catalog is priced in another currency than the ledger's.
    #[error("built-in catalog is priced in {catalog}, ledger uses {ledger}; pass --catalog")]
    CurrencyMismatch {
        /// Ledger currency code.
        ledger: &'static str,

        /// Catalog currency code.
        catalog: &'static str,
    },

    /// The data directory could not be opened.
    #[error("failed to open store")]
    Store(#[from] StoreError),
}

/// A store backing every repository.
trait Store: AccountsRepository + InventoryRepository + OrdersRepository + ReviewsRepository {}

impl<T> Store for T where
    T: AccountsRepository + InventoryRepository + OrdersRepository + ReviewsRepository
{
}

/// Ledger rules, catalog and the services built on them.
#[derive(Clone)]
pub struct AppContext {
    /// Ledger rules.
    pub ledger: Ledger,

    /// Products on sale.
    pub catalog: Arc<Catalog>,

    /// Loyalty accounts.
    pub accounts: Arc<dyn AccountsService>,

    /// Stock.
    pub inventory: Arc<dyn InventoryService>,

    /// Order log.
    pub orders: Arc<dyn OrdersService>,

    /// Product reviews.
    pub reviews: Arc<dyn ReviewsService>,

    /// Cart pricing and checkout.
    pub checkout: Arc<dyn CheckoutService>,
}

impl AppContext {
    /// Build application context from process settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the ledger config or catalog cannot be loaded or the data
    /// directories cannot be opened.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let storage = &config.storage;

        let ledger = load_ledger(storage.ledger_config.as_deref())?;
        let catalog = load_catalog(storage.catalog.as_deref(), &ledger)?;
        let primary = JsonStore::open(&storage.data_dir).await?;

        info!(
            data_dir = %storage.data_dir.display(),
            currency = ledger.currency().iso_alpha_code,
            products = catalog.products().len(),
            "ledger loaded"
        );

        let context = match &storage.fallback_dir {
            Some(fallback_dir) => {
                let secondary = JsonStore::open(fallback_dir).await?;

                Self::with_store(
                    ledger,
                    catalog,
                    Arc::new(Fallback::new(primary, secondary)),
                    storage.cas_retry_limit,
                )
            }
            None => Self::with_store(ledger, catalog, Arc::new(primary), storage.cas_retry_limit),
        };

        Ok(context)
    }

    fn with_store<S>(ledger: Ledger, catalog: Catalog, store: Arc<S>, retry_limit: u32) -> Self
    where
        S: Store + 'static,
    {
        let inventory: Arc<dyn InventoryService> = Arc::new(LedgerInventoryService::new(
            ledger,
            store.clone(),
            retry_limit,
        ));

        Self {
            ledger,
            catalog: Arc::new(catalog),
            accounts: Arc::new(LedgerAccountsService::new(ledger, store.clone(), retry_limit)),
            orders: Arc::new(LedgerOrdersService::new(
                ledger,
                store.clone(),
                store.clone(),
                retry_limit,
            )),
            reviews: Arc::new(LedgerReviewsService::new(
                ledger,
                store.clone(),
                store.clone(),
                retry_limit,
            )),
            checkout: Arc::new(LedgerCheckoutService::new(
                ledger,
                store.clone(),
                inventory.clone(),
                store,
                retry_limit,
            )),
            inventory,
        }
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("ledger", &self.ledger)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

fn load_ledger(path: Option<&Path>) -> Result<Ledger, ConfigError> {
    let config = match path {
        Some(path) => LedgerConfig::from_yaml_file(path)?,
        None => LedgerConfig::default(),
    };

    Ledger::new(&config)
}

fn load_catalog(path: Option<&Path>, ledger: &Ledger) -> Result<Catalog, AppInitError> {
    let Some(path) = path else {
        let catalog = Catalog::storefront()?;

        if catalog.currency() != ledger.currency() {
            return Err(AppInitError::CurrencyMismatch {
                ledger: ledger.currency().iso_alpha_code,
                catalog: catalog.currency().iso_alpha_code,
            });
        }

        return Ok(catalog);
    };

    Ok(Catalog::from_yaml_file(path, ledger.currency())?)
}
