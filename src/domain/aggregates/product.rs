//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::domain::events::{DomainEvent, ProductEvent};
use crate::domain::value_objects::ProductId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub product_name: String,
    pub brand: String,
    pub price: Decimal,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: i32,
    pub category: String,
    pub gender: Gender,
    pub product_description: String,
    pub product_images: Vec<String>,
    pub discount: Decimal,
    pub collections: String,
    pub best_seller: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender { Men, Women, Unisex }

impl Gender {
    pub const fn as_str(&self) -> &'static str {
        match self { Self::Men => "Men", Self::Women => "Women", Self::Unisex => "Unisex" }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Gender {
    type Err = ProductError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Men" => Ok(Self::Men),
            "Women" => Ok(Self::Women),
            "Unisex" => Ok(Self::Unisex),
            other => Err(ProductError::UnknownGender(other.to_string())),
        }
    }
}

/// Listing request for a new catalog entry. Images are already-hosted URLs.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub product_name: String,
    pub brand: String,
    pub price: Decimal,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    pub stock: i32,
    pub category: String,
    pub gender: Gender,
    pub product_description: String,
    #[serde(default)]
    pub product_images: Vec<String>,
    pub discount: Decimal,
    pub collections: String,
    #[serde(default)]
    pub best_seller: bool,
    #[serde(default)]
    pub is_featured: bool,
}

impl Product {
    pub fn create(new: NewProduct) -> Result<(Self, DomainEvent), ProductError> {
        let product_name = required(new.product_name, "productName")?;
        let brand = required(new.brand, "brand")?;
        let category = required(new.category, "category")?;
        let product_description = required(new.product_description, "productDescription")?;
        let collections = required(new.collections, "collections")?;
        if new.price < Decimal::ZERO { return Err(ProductError::NegativePrice); }
        if new.stock < 0 { return Err(ProductError::NegativeStock); }
        let product_images: Vec<String> = new.product_images.into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();
        if product_images.is_empty() { return Err(ProductError::MissingImages); }

        let mut sizes: Vec<String> = Vec::with_capacity(new.sizes.len());
        for size in new.sizes.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            if !sizes.contains(&size) { sizes.push(size); }
        }

        let product = Self {
            id: ProductId::new(), product_name, brand, price: new.price, sizes,
            colors: new.colors.into_iter().map(|c| c.trim().to_string()).filter(|c| !c.is_empty()).collect(),
            stock: new.stock, category, gender: new.gender, product_description, product_images,
            discount: new.discount, collections, best_seller: new.best_seller,
            is_featured: new.is_featured, created_at: Utc::now(),
        };
        let event = DomainEvent::Product(ProductEvent::Created {
            product_id: product.id,
            product_name: product.product_name.clone(),
        });
        Ok((product, event))
    }

    pub fn is_in_stock(&self) -> bool { self.stock > 0 }
}

fn required(value: String, field: &'static str) -> Result<String, ProductError> {
    let value = value.trim().to_string();
    if value.is_empty() { Err(ProductError::MissingField(field)) } else { Ok(value) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Price cannot be negative")]
    NegativePrice,
    #[error("Stock cannot be negative")]
    NegativeStock,
    #[error("No product images provided")]
    MissingImages,
    #[error("Unknown gender: {0}")]
    UnknownGender(String),
}
