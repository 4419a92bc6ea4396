//! Domain events
use rust_decimal::Decimal;
use serde::Serialize;
use crate::domain::aggregates::OrderStatus;
use crate::domain::value_objects::{OrderId, ProductId, UserId};

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum DomainEvent {
    Product(ProductEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: ProductId, product_name: String },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Created { order_id: OrderId, user_id: UserId, total_amount: Decimal, status: OrderStatus },
    Cancelled { order_id: OrderId, user_id: UserId },
    ReturnRequested { order_id: OrderId, user_id: UserId },
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub const fn subject(&self) -> &'static str {
        match self {
            Self::Product(ProductEvent::Created { .. }) => "storefront.products.created",
            Self::Order(OrderEvent::Created { .. }) => "storefront.orders.created",
            Self::Order(OrderEvent::Cancelled { .. }) => "storefront.orders.cancelled",
            Self::Order(OrderEvent::ReturnRequested { .. }) => "storefront.orders.return_requested",
        }
    }
}

impl OrderEvent {
    /// Event for an accepted customer transition into `status`.
    pub fn for_transition(order_id: OrderId, user_id: UserId, status: OrderStatus) -> Option<Self> {
        match status {
            OrderStatus::Cancelled => Some(Self::Cancelled { order_id, user_id }),
            OrderStatus::Return => Some(Self::ReturnRequested { order_id, user_id }),
            _ => None,
        }
    }
}
