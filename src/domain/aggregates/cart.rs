//! Cart Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::Product;
use crate::domain::value_objects::{normalize_size, ProductId, Quantity, UserId};

/// A (product, size, quantity) entry, shared by carts and orders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product: ProductId,
    pub quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl LineItem {
    pub fn new(product: ProductId, quantity: Quantity, size: Option<String>) -> Self {
        Self { product, quantity, size: normalize_size(size) }
    }

    fn is_variant(&self, product: ProductId, size: Option<&str>) -> bool {
        self.product == product && self.size.as_deref() == size
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    user: UserId,
    items: Vec<LineItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(user: UserId) -> Self {
        let now = Utc::now();
        Self { user, items: vec![], created_at: now, updated_at: now }
    }

    pub fn restore(user: UserId, items: Vec<LineItem>, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self { user, items, created_at, updated_at }
    }

    pub fn user(&self) -> UserId { self.user }
    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Same product and size increments the existing line; otherwise a new line is appended.
    pub fn add_item(&mut self, item: LineItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.is_variant(item.product, item.size.as_deref())) {
            existing.quantity = existing.quantity.add(item.quantity);
        } else {
            self.items.push(item);
        }
        self.touch();
    }

    pub fn set_quantity(&mut self, product: ProductId, size: Option<&str>, quantity: Quantity) -> Result<(), CartError> {
        let item = self.items.iter_mut().find(|i| i.is_variant(product, size)).ok_or(CartError::ItemNotFound)?;
        item.quantity = quantity;
        self.touch();
        Ok(())
    }

    /// Removes every line matching the pair; returns how many were removed.
    pub fn remove_item(&mut self, product: ProductId, size: Option<&str>) -> usize {
        let before = self.items.len();
        self.items.retain(|i| !i.is_variant(product, size));
        let removed = before - self.items.len();
        if removed > 0 { self.touch(); }
        removed
    }

    pub fn product_ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self.items.iter().map(|i| i.product).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Resolves product references against the given records. Missing products resolve to `None`.
    pub fn resolve(&self, products: &[Product]) -> CartView {
        CartView {
            user: self.user,
            items: self.items.iter().map(|item| ResolvedLineItem {
                product: products.iter().find(|p| p.id == item.product).cloned(),
                quantity: item.quantity,
                size: item.size.clone(),
            }).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

/// Cart with product references replaced by the product records.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub user: UserId,
    pub items: Vec<ResolvedLineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResolvedLineItem {
    pub product: Option<Product>,
    pub quantity: Quantity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("Product not found")]
    ProductNotFound,
    #[error("Cart not found")]
    CartNotFound,
    #[error("Item not found in cart")]
    ItemNotFound,
    #[error("Quantity must be at least 1")]
    InvalidQuantity,
}
