use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{corrupt, PgStore};
use crate::domain::aggregates::Product;
use crate::domain::search::{lowered, PageRequest, ProductSearch};
use crate::domain::value_objects::ProductId;
use crate::storage::{ProductStore, Result};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    product_name: String,
    brand: String,
    price: Decimal,
    sizes: Vec<String>,
    colors: Vec<String>,
    stock: i32,
    category: String,
    gender: String,
    product_description: String,
    product_images: Vec<String>,
    discount: Decimal,
    collections: String,
    best_seller: bool,
    is_featured: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = crate::storage::StorageError;

    fn try_from(r: ProductRow) -> std::result::Result<Self, Self::Error> {
        Ok(Product {
            id: ProductId::from_uuid(r.id),
            gender: r.gender.parse().map_err(|e| corrupt("product gender", e))?,
            product_name: r.product_name, brand: r.brand, price: r.price, sizes: r.sizes, colors: r.colors,
            stock: r.stock, category: r.category, product_description: r.product_description,
            product_images: r.product_images, discount: r.discount, collections: r.collections,
            best_seller: r.best_seller, is_featured: r.is_featured, created_at: r.created_at,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, product_name, brand, price, sizes, colors, stock, category, gender, \
    product_description, product_images, discount, collections, best_seller, is_featured, created_at";

/// Appends the WHERE clause for a catalog search.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, search: &ProductSearch) {
    qb.push(" WHERE TRUE");
    if let Some(pattern) = search.like_pattern() {
        qb.push(" AND (");
        for (i, column) in ["product_name", "brand", "category", "product_description", "gender", "collections"].iter().enumerate() {
            if i > 0 { qb.push(" OR "); }
            qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
        }
        qb.push(" OR EXISTS (SELECT 1 FROM unnest(colors) AS c WHERE c ILIKE ").push_bind(pattern).push("))");
    }
    if !search.colors.is_empty() {
        qb.push(" AND EXISTS (SELECT 1 FROM unnest(colors) AS c WHERE lower(c) = ANY(")
            .push_bind(lowered(&search.colors))
            .push("))");
    }
    for (column, values) in [
        ("category", &search.categories),
        ("gender", &search.genders),
        ("collections", &search.collections),
    ] {
        if !values.is_empty() {
            qb.push(" AND lower(").push(column).push(") = ANY(").push_bind(lowered(values)).push(")");
        }
    }
    if let Some(max) = search.max_price {
        qb.push(" AND price <= ").push_bind(max);
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn insert(&self, p: &Product) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO products ({PRODUCT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"
        ))
        .bind(p.id.as_uuid()).bind(&p.product_name).bind(&p.brand).bind(p.price).bind(&p.sizes).bind(&p.colors)
        .bind(p.stock).bind(&p.category).bind(p.gender.as_str()).bind(&p.product_description)
        .bind(&p.product_images).bind(p.discount).bind(&p.collections).bind(p.best_seller).bind(p.is_featured)
        .bind(p.created_at)
        .execute(self.pool()).await?;
        Ok(())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>> {
        sqlx::query_as::<_, ProductRow>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(self.pool()).await?
            .map(Product::try_from)
            .transpose()
    }

    async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        if ids.is_empty() { return Ok(vec![]); }
        let ids: Vec<Uuid> = ids.iter().map(ProductId::as_uuid).collect();
        sqlx::query_as::<_, ProductRow>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"))
            .bind(ids)
            .fetch_all(self.pool()).await?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    async fn search(&self, search: &ProductSearch, page: PageRequest) -> Result<(Vec<Product>, u64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        push_filters(&mut count, search);
        let (total,): (i64,) = count.build_query_as().fetch_one(self.pool()).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
        push_filters(&mut select, search);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let products = select
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool()).await?
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok((products, u64::try_from(total).unwrap_or_default()))
    }
}
