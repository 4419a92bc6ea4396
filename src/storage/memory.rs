//! In-memory store for tests and local runs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{AddressStore, CartStore, OrderStore, ProductStore, Result, SupportQueryStore, UserStore};
use crate::domain::aggregates::{AddressBook, Cart, Order, OrderStatus, Product, SupportQuery, User};
use crate::domain::search::{PageRequest, ProductSearch};
use crate::domain::value_objects::{OrderId, ProductId, UserId};

/// Every aggregate kept in a map behind its own lock.
#[derive(Default)]
pub struct MemoryStore {
    products: RwLock<HashMap<ProductId, Product>>,
    carts: RwLock<HashMap<UserId, Cart>>,
    orders: RwLock<HashMap<OrderId, Order>>,
    addresses: RwLock<HashMap<UserId, AddressBook>>,
    queries: RwLock<Vec<SupportQuery>>,
    users: RwLock<HashMap<UserId, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert(&self, product: &Product) -> Result<()> {
        self.products.write().await.insert(product.id, product.clone());
        Ok(())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn search(&self, search: &ProductSearch, page: PageRequest) -> Result<(Vec<Product>, u64)> {
        let products = self.products.read().await;
        let mut matches: Vec<&Product> = products.values().filter(|p| search.matches(p)).collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matches.len() as u64;
        let data = matches
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok((data, total))
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn get(&self, user: UserId) -> Result<Option<Cart>> {
        Ok(self.carts.read().await.get(&user).cloned())
    }

    async fn save(&self, cart: &Cart) -> Result<()> {
        self.carts.write().await.insert(cart.user(), cart.clone());
        Ok(())
    }

    async fn delete(&self, user: UserId) -> Result<bool> {
        Ok(self.carts.write().await.remove(&user).is_some())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn get_for_user(&self, id: OrderId, user: UserId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&id).filter(|o| o.user == user).cloned())
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut mine: Vec<Order> = orders.values().filter(|o| o.user == user).cloned().collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }

    async fn update_status(&self, id: OrderId, user: UserId, from: OrderStatus, to: OrderStatus) -> Result<Option<Order>> {
        let mut orders = self.orders.write().await;
        Ok(orders.get_mut(&id).filter(|o| o.user == user && o.status == from).map(|order| {
            order.status = to;
            order.updated_at = Utc::now();
            order.clone()
        }))
    }
}

#[async_trait]
impl AddressStore for MemoryStore {
    async fn get(&self, user: UserId) -> Result<Option<AddressBook>> {
        Ok(self.addresses.read().await.get(&user).cloned())
    }

    async fn save(&self, book: &AddressBook) -> Result<()> {
        self.addresses.write().await.insert(book.user, book.clone());
        Ok(())
    }
}

#[async_trait]
impl SupportQueryStore for MemoryStore {
    async fn insert(&self, query: &SupportQuery) -> Result<()> {
        self.queries.write().await.push(query.clone());
        Ok(())
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<SupportQuery>> {
        Ok(self.queries.read().await.iter().filter(|q| q.user == user).cloned().collect())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_subject(&self, auth0_id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.values().find(|u| u.auth0_id == auth0_id).cloned())
    }

    async fn insert(&self, user: &User) -> Result<()> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<()> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }
}
