//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationErrors};
use crate::domain::aggregates::{LineItem, Product, ShippingAddress};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{OrderId, ProductId, UserId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    #[serde(alias = "Paid")]
    Ordered,
    Shipped,
    Delivered,
    Cancelled,
    Return,
    Returned,
    Refunded,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Ordered => "Ordered",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Return => "Return",
            Self::Returned => "Returned",
            Self::Refunded => "Refunded",
        }
    }

    /// Guard table for customer-initiated transitions.
    pub fn transition(self, action: OrderAction) -> Result<OrderStatus, TransitionRejected> {
        use OrderStatus::*;
        match (action, self) {
            (OrderAction::Cancel, Pending | Ordered) => Ok(Cancelled),
            (OrderAction::Cancel, Cancelled) => Err(TransitionRejected::AlreadyCancelled),
            (OrderAction::Cancel, Return | Returned) => Err(TransitionRejected::CancelReturned),
            (OrderAction::Cancel, status @ (Shipped | Delivered | Refunded)) => Err(TransitionRejected::CancelTooLate(status)),
            (OrderAction::Return, Delivered) => Ok(Return),
            (OrderAction::Return, Return | Returned) => Err(TransitionRejected::AlreadyReturned),
            (OrderAction::Return, Cancelled) => Err(TransitionRejected::ReturnCancelled),
            (OrderAction::Return, _) => Err(TransitionRejected::ReturnNotDelivered),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for OrderStatus {
    type Err = OrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Pending" => Self::Pending,
            "Ordered" | "Paid" => Self::Ordered,
            "Shipped" => Self::Shipped,
            "Delivered" => Self::Delivered,
            "Cancelled" => Self::Cancelled,
            "Return" => Self::Return,
            "Returned" => Self::Returned,
            "Refunded" => Self::Refunded,
            other => return Err(OrderError::UnknownStatus(other.to_string())),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderAction { Cancel, Return }

impl FromStr for OrderAction {
    type Err = OrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cancel" => Ok(Self::Cancel),
            "return" => Ok(Self::Return),
            _ => Err(OrderError::InvalidAction),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionRejected {
    #[error("Order is already cancelled.")]
    AlreadyCancelled,
    #[error("Cannot cancel a returned or return-in-progress order.")]
    CancelReturned,
    #[error("Cannot cancel a {} order.", .0.as_str().to_lowercase())]
    CancelTooLate(OrderStatus),
    #[error("Order is already returned or in return process.")]
    AlreadyReturned,
    #[error("Cannot return a cancelled order.")]
    ReturnCancelled,
    #[error("Can only return a delivered order.")]
    ReturnNotDelivered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Prepaid,
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self { Self::Prepaid => "Prepaid", Self::CashOnDelivery => "Cash on Delivery" }
    }
}

impl FromStr for PaymentMethod {
    type Err = OrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Prepaid" => Ok(Self::Prepaid),
            "Cash on Delivery" => Ok(Self::CashOnDelivery),
            other => Err(OrderError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// Gateway-signed proof that a payment completed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    #[serde(rename = "razorpay_order_id", default)]
    pub gateway_order_id: String,
    #[serde(rename = "razorpay_payment_id", default)]
    pub payment_id: String,
    #[serde(rename = "razorpay_signature", default)]
    pub signature: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user: UserId,
    pub items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentConfirmation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Checkout payload as submitted by the client.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(default)]
    pub items: Vec<LineItem>,
    pub shipping_address: Option<ShippingAddress>,
    pub total_amount: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_details: Option<PaymentConfirmation>,
}

impl Order {
    /// Validates the checkout payload. A verified payment confirmation starts the order as `Ordered`.
    pub fn place(user: UserId, new: NewOrder) -> Result<(Self, DomainEvent), OrderError> {
        if new.items.is_empty() { return Err(OrderError::NoItems); }
        let shipping_address = new.shipping_address.ok_or(OrderError::MissingShippingAddress)?.normalized();
        shipping_address.validate().map_err(OrderError::InvalidShippingAddress)?;
        let total_amount = new.total_amount.filter(|t| *t > Decimal::ZERO).ok_or(OrderError::InvalidTotal)?;
        let payment_method = new.payment_method.ok_or(OrderError::MissingPaymentMethod)?;

        let status = if new.payment_details.is_some() { OrderStatus::Ordered } else { OrderStatus::Pending };
        let now = Utc::now();
        let order = Self {
            id: OrderId::new(),
            user,
            items: new.items.into_iter().map(|i| LineItem::new(i.product, i.quantity, i.size)).collect(),
            shipping_address,
            status,
            total_amount,
            payment_method,
            payment_details: new.payment_details,
            created_at: now,
            updated_at: now,
        };
        let event = DomainEvent::Order(OrderEvent::Created {
            order_id: order.id, user_id: user, total_amount, status,
        });
        Ok((order, event))
    }

    pub fn product_ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self.items.iter().map(|i| i.product).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Order with each item's product resolved to the fields the order history shows.
    pub fn summarize(&self, products: &[Product]) -> OrderView {
        OrderView {
            id: self.id,
            items: self.items.iter().map(|item| OrderLineView {
                product: products.iter().find(|p| p.id == item.product).map(ProductSummary::from),
                quantity: item.quantity.value(),
                size: item.size.clone(),
            }).collect(),
            shipping_address: self.shipping_address.clone(),
            status: self.status,
            total_amount: self.total_amount,
            payment_method: self.payment_method,
            payment_details: self.payment_details.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub items: Vec<OrderLineView>,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentConfirmation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct OrderLineView {
    pub product: Option<ProductSummary>,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub product_name: String,
    pub price: Decimal,
    pub discount: Decimal,
    pub product_images: Vec<String>,
    pub brand: String,
}

impl From<&Product> for ProductSummary {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id, product_name: p.product_name.clone(), price: p.price, discount: p.discount,
            product_images: p.product_images.clone(), brand: p.brand.clone(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum OrderError {
    #[error("Order must have at least one item.")]
    NoItems,
    #[error("Shipping address is required.")]
    MissingShippingAddress,
    #[error("Shipping address is invalid.")]
    InvalidShippingAddress(ValidationErrors),
    #[error("Total amount must be greater than 0.")]
    InvalidTotal,
    #[error("Payment method is required.")]
    MissingPaymentMethod,
    #[error("Invalid or missing orderId.")]
    InvalidOrderId,
    #[error("Invalid action. Must be 'cancel' or 'return'.")]
    InvalidAction,
    #[error("Order not found.")]
    NotFound,
    #[error(transparent)]
    Rejected(#[from] TransitionRejected),
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),
}
