//! JSON file store.
//!
//! One JSON document per collection in a data directory:
//!
//! - `accounts.json`: accounts, sorted by id
//! - `inventory.json`: product id to stock count
//! - `orders.json`: the order log, in placement order
//! - `reviews.json`: reviews, in submission order
//!
//! A missing file reads as an empty collection. Writes go to a temporary file that is then
//! renamed over the document. Every read-modify-write holds an exclusive lock on `.lock` in the
//! data directory, so stores in other processes sharing the directory wait for it.

use std::{
    fs::{File, OpenOptions},
    io,
    path::PathBuf,
};

use async_trait::async_trait;
use sands::{
    accounts::{Account, AccountId},
    inventory::Inventory,
    products::ProductId,
    reviews::Review,
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::{
    fs,
    io::ErrorKind,
    sync::{Mutex, MutexGuard},
    task,
};
use tracing::debug;

use crate::{
    domain::{
        accounts::AccountsRepository,
        inventory::InventoryRepository,
        orders::{OrdersRepository, models::OrderRecord},
        reviews::ReviewsRepository,
    },
    storage::StoreError,
};

const ACCOUNTS: &str = "accounts.json";
const INVENTORY: &str = "inventory.json";
const ORDERS: &str = "orders.json";
const REVIEWS: &str = "reviews.json";
const LOCK: &str = ".lock";

/// File-backed store rooted at a data directory.
#[derive(Debug)]
pub struct JsonStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

/// Exclusive access to the data directory. Dropping it closes the lock file, which releases the
/// lock.
struct WriteLock<'a> {
    _file: File,
    _guard: MutexGuard<'a, ()>,
}

impl JsonStore {
    /// Open a store in `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();

        fs::create_dir_all(&dir).await?;

        debug!(dir = %dir.display(), "opened JSON store");

        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    /// Take the directory lock, waiting for other writers in this or any other process.
    async fn write_lock(&self) -> Result<WriteLock<'_>, StoreError> {
        let guard = self.lock.lock().await;
        let path = self.dir.join(LOCK);

        let file = task::spawn_blocking(move || -> io::Result<File> {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(path)?;
            file.lock()?;

            Ok(file)
        })
        .await
        .map_err(io::Error::other)??;

        Ok(WriteLock {
            _file: file,
            _guard: guard,
        })
    }

    async fn load<T>(&self, name: &str) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        match fs::read(self.dir.join(name)).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(T::default()),
            Err(err) => Err(err.into()),
        }
    }

    async fn save<T>(&self, name: &str, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + Sync,
    {
        let path = self.dir.join(name);
        let staging = self.dir.join(format!("{name}.tmp"));

        fs::write(&staging, serde_json::to_vec_pretty(value)?).await?;
        fs::rename(&staging, &path).await?;

        Ok(())
    }

    async fn save_accounts(&self, mut accounts: Vec<Account>) -> Result<(), StoreError> {
        accounts.sort_by(|a, b| a.id().cmp(b.id()));

        self.save(ACCOUNTS, &accounts).await
    }
}

#[async_trait]
impl AccountsRepository for JsonStore {
    async fn get_account(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        let accounts: Vec<Account> = self.load(ACCOUNTS).await?;

        Ok(accounts.into_iter().find(|account| account.id() == id))
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        self.load(ACCOUNTS).await
    }

    async fn insert_account(&self, account: Account) -> Result<(), StoreError> {
        let _lock = self.write_lock().await?;
        let mut accounts: Vec<Account> = self.load(ACCOUNTS).await?;

        if accounts.iter().any(|stored| stored.id() == account.id()) {
            return Err(StoreError::AccountExists(account.id().clone()));
        }

        accounts.push(account);

        self.save_accounts(accounts).await
    }

    async fn replace_account(
        &self,
        expected: &Account,
        updated: Account,
    ) -> Result<bool, StoreError> {
        let _lock = self.write_lock().await?;
        let mut accounts: Vec<Account> = self.load(ACCOUNTS).await?;

        let Some(stored) = accounts
            .iter_mut()
            .find(|stored| stored.id() == expected.id())
        else {
            return Ok(false);
        };

        if stored != expected {
            return Ok(false);
        }

        *stored = updated;

        self.save_accounts(accounts).await?;

        Ok(true)
    }

    async fn put_account(&self, account: Account) -> Result<(), StoreError> {
        let _lock = self.write_lock().await?;
        let mut accounts: Vec<Account> = self.load(ACCOUNTS).await?;

        accounts.retain(|stored| stored.id() != account.id());
        accounts.push(account);

        self.save_accounts(accounts).await
    }
}

#[async_trait]
impl InventoryRepository for JsonStore {
    async fn inventory(&self) -> Result<Inventory, StoreError> {
        self.load(INVENTORY).await
    }

    async fn stock(&self, product: &ProductId) -> Result<u32, StoreError> {
        let inventory: Inventory = self.load(INVENTORY).await?;

        Ok(inventory.stock(product))
    }

    async fn compare_and_swap(
        &self,
        product: &ProductId,
        expected: u32,
        new: u32,
    ) -> Result<bool, StoreError> {
        let _lock = self.write_lock().await?;
        let mut inventory: Inventory = self.load(INVENTORY).await?;

        if inventory.stock(product) != expected {
            return Ok(false);
        }

        inventory.set(product.clone(), new);
        self.save(INVENTORY, &inventory).await?;

        Ok(true)
    }

    async fn set_stock(&self, product: &ProductId, stock: u32) -> Result<(), StoreError> {
        let _lock = self.write_lock().await?;
        let mut inventory: Inventory = self.load(INVENTORY).await?;

        inventory.set(product.clone(), stock);

        self.save(INVENTORY, &inventory).await
    }
}

#[async_trait]
impl OrdersRepository for JsonStore {
    async fn submit_order(&self, record: OrderRecord) -> Result<(), StoreError> {
        let _lock = self.write_lock().await?;
        let mut orders: Vec<OrderRecord> = self.load(ORDERS).await?;

        orders.push(record);

        self.save(ORDERS, &orders).await
    }

    async fn all_orders(&self) -> Result<Vec<OrderRecord>, StoreError> {
        let mut orders: Vec<OrderRecord> = self.load(ORDERS).await?;

        orders.reverse();

        Ok(orders)
    }

    async fn put_order(&self, record: OrderRecord) -> Result<(), StoreError> {
        let _lock = self.write_lock().await?;
        let mut orders: Vec<OrderRecord> = self.load(ORDERS).await?;

        if let Some(stored) = orders
            .iter_mut()
            .find(|stored| stored.order.id == record.order.id)
        {
            *stored = record;
        } else {
            orders.push(record);
        }

        self.save(ORDERS, &orders).await
    }
}

#[async_trait]
impl ReviewsRepository for JsonStore {
    async fn add_review(&self, review: Review) -> Result<(), StoreError> {
        let _lock = self.write_lock().await?;
        let mut reviews: Vec<Review> = self.load(REVIEWS).await?;

        reviews.push(review);

        self.save(REVIEWS, &reviews).await
    }

    async fn reviews_for_product(&self, product: &ProductId) -> Result<Vec<Review>, StoreError> {
        let reviews: Vec<Review> = self.load(REVIEWS).await?;

        Ok(reviews
            .into_iter()
            .filter(|review| &review.product_id == product)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use sands::{
        ledger::Ledger,
        orders::{LineItem, Order, OrderId, OrderStatus},
        reviews::Rating,
    };
    use tempfile::tempdir;
    use testresult::TestResult;

    use super::*;

    fn record(account: &str, order: &str) -> OrderRecord {
        OrderRecord {
            account_id: AccountId::from(account),
            order: Order {
                id: OrderId::from(order),
                created_at: Timestamp::UNIX_EPOCH,
                status: OrderStatus::Processing,
                total: 48_000,
                items: [LineItem::new("6", 50_000, "US 9")].into_iter().collect(),
                discount_applied: 2_000,
                points_redeemed: 200,
                points_earned: 480,
            },
        }
    }

    #[tokio::test]
    async fn empty_directory_reads_as_empty_store() -> TestResult {
        let dir = tempdir()?;
        let store = JsonStore::open(dir.path()).await?;

        assert!(store.list_accounts().await?.is_empty());
        assert!(store.inventory().await?.is_empty());
        assert!(store.all_orders().await?.is_empty());
        assert!(
            store
                .reviews_for_product(&ProductId::from("1"))
                .await?
                .is_empty()
        );

        Ok(())
    }

    #[tokio::test]
    async fn documents_survive_reopening() -> TestResult {
        let dir = tempdir()?;
        let account = Ledger::default().award_points(&Account::new("u1", "Noor"), 650);

        {
            let store = JsonStore::open(dir.path()).await?;
            store.insert_account(account.clone()).await?;
            store.set_stock(&ProductId::from("3"), 4).await?;
            store.submit_order(record("u1", "ORD-1")).await?;
            store
                .add_review(Review {
                    id: "r1".to_owned(),
                    product_id: ProductId::from("3"),
                    account_id: AccountId::from("u1"),
                    author: "Noor".to_owned(),
                    rating: Rating::try_from(4_u8)?,
                    comment: "Comfortable".to_owned(),
                    created_at: Timestamp::UNIX_EPOCH,
                })
                .await?;
        }

        let reopened = JsonStore::open(dir.path()).await?;

        assert_eq!(reopened.get_account(&AccountId::from("u1")).await?, Some(account));
        assert_eq!(reopened.stock(&ProductId::from("3")).await?, 4);
        assert_eq!(reopened.all_orders().await?, [record("u1", "ORD-1")]);
        assert_eq!(
            reopened
                .reviews_for_product(&ProductId::from("3"))
                .await?
                .len(),
            1
        );

        Ok(())
    }

    #[tokio::test]
    async fn orders_are_listed_newest_first_and_put_replaces() -> TestResult {
        let dir = tempdir()?;
        let store = JsonStore::open(dir.path()).await?;

        store.submit_order(record("u1", "ORD-1")).await?;
        store.submit_order(record("u2", "ORD-2")).await?;

        let mut shipped = record("u1", "ORD-1");
        shipped.order.status = OrderStatus::Shipped;
        store.put_order(shipped.clone()).await?;

        assert_eq!(store.all_orders().await?, [record("u2", "ORD-2"), shipped]);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_insert_and_stale_replace_are_rejected() -> TestResult {
        let dir = tempdir()?;
        let store = JsonStore::open(dir.path()).await?;
        let original = Account::new("u1", "Noor");
        let ledger = Ledger::default();

        store.insert_account(original.clone()).await?;

        assert!(matches!(
            store.insert_account(original.clone()).await,
            Err(StoreError::AccountExists(_))
        ));
        assert!(
            store
                .replace_account(&original, ledger.award_points(&original, 10))
                .await?
        );
        assert!(
            !store
                .replace_account(&original, ledger.award_points(&original, 20))
                .await?
        );
        assert_eq!(
            store
                .get_account(original.id())
                .await?
                .map(|account| account.points()),
            Some(10)
        );

        Ok(())
    }

    #[tokio::test]
    async fn stores_sharing_a_directory_serialise_conditional_updates() -> TestResult {
        let dir = tempdir()?;
        let first = JsonStore::open(dir.path()).await?;
        let second = JsonStore::open(dir.path()).await?;
        let product = ProductId::from("7");

        first.set_stock(&product, 3).await?;

        let (a, b) = tokio::join!(
            first.compare_and_swap(&product, 3, 1),
            second.compare_and_swap(&product, 3, 1)
        );

        assert!(a? != b?, "exactly one conditional update may win");
        assert_eq!(second.stock(&product).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn corrupt_document_is_an_error() -> TestResult {
        let dir = tempdir()?;
        std::fs::write(dir.path().join(INVENTORY), "{ not json")?;

        let store = JsonStore::open(dir.path()).await?;

        assert!(matches!(store.inventory().await, Err(StoreError::Json(_))));

        Ok(())
    }
}
