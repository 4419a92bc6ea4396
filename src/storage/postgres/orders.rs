use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use uuid::Uuid;

use super::{corrupt, PgStore};
use crate::domain::aggregates::{LineItem, Order, OrderStatus, PaymentConfirmation, ShippingAddress};
use crate::domain::value_objects::{OrderId, UserId};
use crate::storage::{OrderStore, Result, StorageError};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    items: Json<Vec<LineItem>>,
    shipping_address: Json<ShippingAddress>,
    status: String,
    total_amount: Decimal,
    payment_method: String,
    payment_details: Option<Json<PaymentConfirmation>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StorageError;

    fn try_from(r: OrderRow) -> std::result::Result<Self, Self::Error> {
        Ok(Order {
            id: OrderId::from_uuid(r.id),
            user: UserId::from_uuid(r.user_id),
            items: r.items.0,
            shipping_address: r.shipping_address.0,
            status: r.status.parse().map_err(|e| corrupt("order status", e))?,
            total_amount: r.total_amount,
            payment_method: r.payment_method.parse().map_err(|e| corrupt("payment method", e))?,
            payment_details: r.payment_details.map(|d| d.0),
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, user_id, items, shipping_address, status, total_amount, payment_method, \
    payment_details, created_at, updated_at";

#[async_trait]
impl OrderStore for PgStore {
    async fn insert(&self, o: &Order) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO orders ({ORDER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        ))
        .bind(o.id.as_uuid())
        .bind(o.user.as_uuid())
        .bind(Json(&o.items))
        .bind(Json(&o.shipping_address))
        .bind(o.status.as_str())
        .bind(o.total_amount)
        .bind(o.payment_method.as_str())
        .bind(o.payment_details.as_ref().map(Json))
        .bind(o.created_at)
        .bind(o.updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn get_for_user(&self, id: OrderId, user: UserId) -> Result<Option<Order>> {
        sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2"))
            .bind(id.as_uuid())
            .bind(user.as_uuid())
            .fetch_optional(self.pool())
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<Order>> {
        sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user.as_uuid())
        .fetch_all(self.pool())
        .await?
        .into_iter()
        .map(Order::try_from)
        .collect()
    }

    async fn update_status(&self, id: OrderId, user: UserId, from: OrderStatus, to: OrderStatus) -> Result<Option<Order>> {
        sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $4, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND status = $3 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(user.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(self.pool())
        .await?
        .map(Order::try_from)
        .transpose()
    }
}
