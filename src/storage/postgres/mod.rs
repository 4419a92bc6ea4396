//! PostgreSQL store.
//!
//! Aggregates that are documents (cart items, order snapshots, address lists)
//! live in `JSONB` columns; the catalog is relational so search can filter in SQL.
//! Migrations are embedded from `migrations/` and applied at startup.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{Result, StorageError};

mod accounts;
mod carts;
mod orders;
mod products;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &SecretString, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url.expose_secret())
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn corrupt(what: &str, err: impl std::fmt::Display) -> StorageError {
    StorageError::DataCorruption(format!("{what}: {err}"))
}
