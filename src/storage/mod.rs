//! Persistence for the storefront aggregates.
//!
//! Each aggregate is read and written as a whole document. Two backends
//! implement the store traits:
//!
//! - `PgStore`: PostgreSQL, documents kept in `JSONB` columns
//! - `MemoryStore`: in-process maps, used by tests and local runs

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::aggregates::{AddressBook, Cart, Order, OrderStatus, Product, SupportQuery, User};
use crate::domain::search::{PageRequest, ProductSearch};
use crate::domain::value_objects::{OrderId, ProductId, UserId};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("data corruption: {0}")]
    DataCorruption(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: &Product) -> Result<()>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>>;

    /// Products for the given ids, in no particular order. Unknown ids are skipped.
    async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>>;

    /// One page of matches, newest first, plus the total match count.
    async fn search(&self, search: &ProductSearch, page: PageRequest) -> Result<(Vec<Product>, u64)>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn get(&self, user: UserId) -> Result<Option<Cart>>;

    /// Inserts or replaces the user's cart.
    async fn save(&self, cart: &Cart) -> Result<()>;

    /// Returns whether a cart existed.
    async fn delete(&self, user: UserId) -> Result<bool>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &Order) -> Result<()>;

    /// The order, only if it belongs to `user`.
    async fn get_for_user(&self, id: OrderId, user: UserId) -> Result<Option<Order>>;

    /// The user's orders, newest first.
    async fn list_for_user(&self, user: UserId) -> Result<Vec<Order>>;

    /// Moves the order from `from` to `to` in a single keyed write.
    ///
    /// `None` if `user` has no such order or its status is no longer `from`.
    async fn update_status(&self, id: OrderId, user: UserId, from: OrderStatus, to: OrderStatus) -> Result<Option<Order>>;
}

#[async_trait]
pub trait AddressStore: Send + Sync {
    async fn get(&self, user: UserId) -> Result<Option<AddressBook>>;

    async fn save(&self, book: &AddressBook) -> Result<()>;
}

#[async_trait]
pub trait SupportQueryStore: Send + Sync {
    async fn insert(&self, query: &SupportQuery) -> Result<()>;

    async fn list_for_user(&self, user: UserId) -> Result<Vec<SupportQuery>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: UserId) -> Result<Option<User>>;

    async fn find_by_subject(&self, auth0_id: &str) -> Result<Option<User>>;

    async fn insert(&self, user: &User) -> Result<()>;

    async fn update(&self, user: &User) -> Result<()>;
}

/// The full set of stores handed to request handlers.
#[derive(Clone)]
pub struct Stores {
    pub products: Arc<dyn ProductStore>,
    pub carts: Arc<dyn CartStore>,
    pub orders: Arc<dyn OrderStore>,
    pub addresses: Arc<dyn AddressStore>,
    pub queries: Arc<dyn SupportQueryStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    pub fn postgres(store: PgStore) -> Self {
        Self::from_backend(Arc::new(store))
    }

    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(MemoryStore::new()))
    }

    fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ProductStore + CartStore + OrderStore + AddressStore + SupportQueryStore + UserStore + 'static,
    {
        Self {
            products: backend.clone(),
            carts: backend.clone(),
            orders: backend.clone(),
            addresses: backend.clone(),
            queries: backend.clone(),
            users: backend,
        }
    }
}
