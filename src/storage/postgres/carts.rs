use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use super::PgStore;
use crate::domain::aggregates::{Cart, LineItem};
use crate::domain::value_objects::UserId;
use crate::storage::{CartStore, Result};

#[derive(sqlx::FromRow)]
struct CartRow {
    user_id: Uuid,
    items: Json<Vec<LineItem>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl CartStore for PgStore {
    async fn get(&self, user: UserId) -> Result<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT user_id, items, created_at, updated_at FROM carts WHERE user_id = $1",
        )
        .bind(user.as_uuid())
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(|r| Cart::restore(UserId::from_uuid(r.user_id), r.items.0, r.created_at, r.updated_at)))
    }

    async fn save(&self, cart: &Cart) -> Result<()> {
        sqlx::query(
            "INSERT INTO carts (user_id, items, created_at, updated_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id) DO UPDATE SET items = EXCLUDED.items, updated_at = EXCLUDED.updated_at",
        )
        .bind(cart.user().as_uuid())
        .bind(Json(cart.items()))
        .bind(cart.created_at())
        .bind(cart.updated_at())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn delete(&self, user: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM carts WHERE user_id = $1")
            .bind(user.as_uuid())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
