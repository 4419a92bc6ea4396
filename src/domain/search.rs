//! Catalog search filters and pagination.

use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use crate::domain::aggregates::Product;

/// Products per catalog page.
pub const PAGE_SIZE: u32 = 8;

/// Free-text query plus independent filter dimensions.
///
/// The text matches any searchable field as a case-insensitive substring.
/// Each non-empty dimension must match, and within a dimension any value may
/// match as a case-insensitive whole value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductSearch {
    pub text: Option<String>,
    pub colors: Vec<String>,
    pub categories: Vec<String>,
    pub genders: Vec<String>,
    pub collections: Vec<String>,
    pub max_price: Option<Decimal>,
}

impl ProductSearch {
    /// Builds a search from raw query-string pairs. `color` and `color[]` are equivalent.
    pub fn from_pairs(pairs: &[(String, String)]) -> (Self, PageRequest) {
        let mut search = Self::default();
        let mut page = None;
        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() { continue; }
            match key.trim_end_matches("[]") {
                "searchQuery" => search.text = Some(value.to_string()),
                "color" => search.colors.push(value.to_string()),
                "category" => search.categories.push(value.to_string()),
                "gender" => search.genders.push(value.to_string()),
                "collections" => search.collections.push(value.to_string()),
                "price" => search.max_price = Decimal::from_str(value).ok(),
                "page" => page = value.parse::<u32>().ok(),
                _ => {}
            }
        }
        (search, PageRequest::new(page))
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            let hit = [
                product.product_name.as_str(),
                product.brand.as_str(),
                product.category.as_str(),
                product.product_description.as_str(),
                product.gender.as_str(),
                product.collections.as_str(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
                || product.colors.iter().any(|c| c.to_lowercase().contains(&needle));
            if !hit { return false; }
        }
        if !self.colors.is_empty() && !product.colors.iter().any(|c| any_equal(&self.colors, c)) { return false; }
        if !self.categories.is_empty() && !any_equal(&self.categories, &product.category) { return false; }
        if !self.genders.is_empty() && !any_equal(&self.genders, product.gender.as_str()) { return false; }
        if !self.collections.is_empty() && !any_equal(&self.collections, &product.collections) { return false; }
        if let Some(max) = self.max_price {
            if product.price > max { return false; }
        }
        true
    }

    /// `%text%` with LIKE wildcards escaped, for `ILIKE` matching.
    pub fn like_pattern(&self) -> Option<String> {
        self.text.as_ref().map(|text| {
            let mut escaped = String::with_capacity(text.len() + 2);
            escaped.push('%');
            for ch in text.chars() {
                if matches!(ch, '%' | '_' | '\\') { escaped.push('\\'); }
                escaped.push(ch);
            }
            escaped.push('%');
            escaped
        })
    }
}

fn any_equal(wanted: &[String], value: &str) -> bool {
    wanted.iter().any(|w| w.to_lowercase() == value.to_lowercase())
}

/// Lowercased copy of a filter dimension, for `lower(column) = ANY($n)`.
pub fn lowered(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}

/// One-based page of `PAGE_SIZE` items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest { page: u32 }

impl PageRequest {
    pub fn new(page: Option<u32>) -> Self { Self { page: page.unwrap_or(1).max(1) } }
    pub fn page(&self) -> u32 { self.page }
    pub fn limit(&self) -> u64 { u64::from(PAGE_SIZE) }
    pub fn offset(&self) -> u64 { u64::from(self.page - 1) * u64::from(PAGE_SIZE) }
}

impl Default for PageRequest { fn default() -> Self { Self::new(None) } }

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub pages: u64,
}

impl Pagination {
    pub fn new(total: u64, request: PageRequest) -> Self {
        Self { total, page: request.page(), pages: total.div_ceil(u64::from(PAGE_SIZE)) }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}
