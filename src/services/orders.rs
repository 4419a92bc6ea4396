//! Order placement and the customer-driven status lifecycle.

use tracing::instrument;

use crate::domain::aggregates::{NewOrder, Order, OrderAction, OrderError, OrderView};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{OrderId, UserId};
use crate::error::Result;
use crate::state::AppState;

pub struct OrderService<'a> {
    state: &'a AppState,
}

impl<'a> OrderService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Places an order. An attached payment confirmation must carry a valid signature.
    /// The cart is left untouched.
    #[instrument(skip(self, new))]
    pub async fn create(&self, user: UserId, new: NewOrder) -> Result<Order> {
        let (order, event) = Order::place(user, new)?;
        if let Some(confirmation) = &order.payment_details {
            self.state.signatures().verify_confirmation(confirmation)?;
        }
        self.state.stores().orders.insert(&order).await?;
        tracing::info!(order_id = %order.id, status = %order.status, "Order placed");
        self.state.publisher().publish(&event).await;
        Ok(order)
    }

    /// The user's orders, newest first, with product summaries.
    pub async fn list_mine(&self, user: UserId) -> Result<Vec<OrderView>> {
        let stores = self.state.stores();
        let orders = stores.orders.list_for_user(user).await?;
        let mut ids: Vec<_> = orders.iter().flat_map(Order::product_ids).collect();
        ids.sort();
        ids.dedup();
        let products = stores.products.get_many(&ids).await?;
        Ok(orders.iter().map(|order| order.summarize(&products)).collect())
    }

    /// Applies a cancel or return request to one of the user's orders.
    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        user: UserId,
        order_id: Option<&str>,
        action: Option<&str>,
    ) -> Result<(OrderAction, Order)> {
        let order_id: OrderId = order_id
            .and_then(|raw| raw.parse().ok())
            .ok_or(OrderError::InvalidOrderId)?;
        let action: OrderAction = action.unwrap_or_default().parse()?;

        let orders = &self.state.stores().orders;
        let mut current = orders.get_for_user(order_id, user).await?.ok_or(OrderError::NotFound)?.status;
        loop {
            let next = current.transition(action)?;
            if let Some(updated) = orders.update_status(order_id, user, current, next).await? {
                tracing::info!(%order_id, from = %current, to = %next, "Order status changed");
                if let Some(event) = OrderEvent::for_transition(order_id, user, next) {
                    self.state.publisher().publish(&DomainEvent::Order(event)).await;
                }
                return Ok((action, updated));
            }
            // Status moved since it was read; guard against the stored one.
            current = orders.get_for_user(order_id, user).await?.ok_or(OrderError::NotFound)?.status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{OrderStatus, PaymentConfirmation, PaymentMethod};
    use crate::error::AppError;
    use crate::domain::value_objects::ProductId;
    use crate::storage::{MemoryStore, OrderStore, Result as StorageResult, Stores};
    use crate::test_support::{new_order, state_with_product, state_with_stores, user};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_create_without_confirmation_is_pending() {
        let (state, product) = state_with_product().await;
        let order = OrderService::new(&state).create(user(), new_order(product.id, 100)).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_rejects_forged_confirmation() {
        let (state, product) = state_with_product().await;
        let u = user();
        let mut new = new_order(product.id, 100);
        new.payment_method = Some(PaymentMethod::Prepaid);
        new.payment_details = Some(PaymentConfirmation {
            gateway_order_id: "order_1".into(), payment_id: "pay_1".into(), signature: "forged".into(),
        });
        let err = OrderService::new(&state).create(u, new.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Transaction is not legit!"));
        assert!(state.stores().orders.list_for_user(u).await.unwrap().is_empty());

        let signature = state.signatures().sign("order_1", "pay_1").unwrap();
        if let Some(details) = new.payment_details.as_mut() {
            details.signature = signature;
        }
        let order = OrderService::new(&state).create(u, new).await.unwrap();
        assert_eq!(order.status, OrderStatus::Ordered);
    }

    #[tokio::test]
    async fn test_list_mine_resolves_products() {
        let (state, product) = state_with_product().await;
        let u = user();
        let service = OrderService::new(&state);
        service.create(u, new_order(product.id, 100)).await.unwrap();
        service.create(user(), new_order(product.id, 100)).await.unwrap();

        let mine = service.list_mine(u).await.unwrap();
        assert_eq!(mine.len(), 1);
        let summary = mine[0].items[0].product.as_ref().unwrap();
        assert_eq!(summary.product_name, product.product_name);
    }

    #[tokio::test]
    async fn test_transition_validates_input_then_ownership() {
        let (state, product) = state_with_product().await;
        let service = OrderService::new(&state);
        let u = user();
        let order = service.create(u, new_order(product.id, 100)).await.unwrap();
        let id = order.id.to_string();

        let err = service.transition(u, Some("nope"), Some("cancel")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Invalid or missing orderId."));
        let err = service.transition(u, Some(&id), Some("refund")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Invalid action. Must be 'cancel' or 'return'."));
        let err = service.transition(user(), Some(&id), Some("cancel")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Order not found."));
    }

    #[tokio::test]
    async fn test_cancel_then_cancel_again() {
        let (state, product) = state_with_product().await;
        let service = OrderService::new(&state);
        let u = user();
        let order = service.create(u, new_order(product.id, 100)).await.unwrap();
        let id = order.id.to_string();

        let (action, cancelled) = service.transition(u, Some(&id), Some("cancel")).await.unwrap();
        assert_eq!(action, OrderAction::Cancel);
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let err = service.transition(u, Some(&id), Some("cancel")).await.unwrap_err();
        assert!(matches!(err, AppError::Guard(_)));
        assert_eq!(err.to_string(), "Order is already cancelled.");
    }

    #[tokio::test]
    async fn test_return_requires_delivery() {
        let (state, product) = state_with_product().await;
        let service = OrderService::new(&state);
        let u = user();
        let order = service.create(u, new_order(product.id, 100)).await.unwrap();
        let id = order.id.to_string();

        let err = service.transition(u, Some(&id), Some("return")).await.unwrap_err();
        assert_eq!(err.to_string(), "Can only return a delivered order.");

        state.stores().orders.update_status(order.id, u, OrderStatus::Pending, OrderStatus::Delivered).await.unwrap();
        let err = service.transition(u, Some(&id), Some("cancel")).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot cancel a delivered order.");
        let (_, returned) = service.transition(u, Some(&id), Some("return")).await.unwrap();
        assert_eq!(returned.status, OrderStatus::Return);
    }

    /// Hands out one pre-recorded snapshot before reading through to memory.
    struct StaleFirstRead {
        inner: MemoryStore,
        snapshot: Mutex<Option<Order>>,
    }

    #[async_trait]
    impl OrderStore for StaleFirstRead {
        async fn insert(&self, order: &Order) -> StorageResult<()> {
            OrderStore::insert(&self.inner, order).await
        }

        async fn get_for_user(&self, id: OrderId, user: UserId) -> StorageResult<Option<Order>> {
            let snapshot = self.snapshot.lock().unwrap().take();
            if let Some(order) = snapshot {
                return Ok(Some(order));
            }
            self.inner.get_for_user(id, user).await
        }

        async fn list_for_user(&self, user: UserId) -> StorageResult<Vec<Order>> {
            OrderStore::list_for_user(&self.inner, user).await
        }

        async fn update_status(
            &self,
            id: OrderId,
            user: UserId,
            from: OrderStatus,
            to: OrderStatus,
        ) -> StorageResult<Option<Order>> {
            self.inner.update_status(id, user, from, to).await
        }
    }

    #[tokio::test]
    async fn test_cancel_rechecks_status_changed_after_read() {
        let orders = Arc::new(StaleFirstRead { inner: MemoryStore::new(), snapshot: Mutex::new(None) });
        let mut stores = Stores::in_memory();
        stores.orders = orders.clone();
        let state = state_with_stores(stores);
        let service = OrderService::new(&state);
        let u = user();

        let order = service.create(u, new_order(ProductId::new(), 100)).await.unwrap();
        *orders.snapshot.lock().unwrap() = Some(order.clone());
        orders.inner.update_status(order.id, u, OrderStatus::Pending, OrderStatus::Shipped).await.unwrap();

        let err = service.transition(u, Some(&order.id.to_string()), Some("cancel")).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot cancel a shipped order.");
        let stored = orders.inner.get_for_user(order.id, u).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Shipped);
    }
}
