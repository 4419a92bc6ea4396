//! Cart operations: merge on add, quantity overwrite, removal, product resolution.

use tracing::instrument;

use crate::domain::aggregates::{Cart, CartError, CartView, LineItem};
use crate::domain::value_objects::{normalize_size, ProductId, Quantity, UserId};
use crate::error::Result;
use crate::state::AppState;
use crate::storage::{CartStore, ProductStore};

pub struct CartService<'a> {
    products: &'a dyn ProductStore,
    carts: &'a dyn CartStore,
}

impl<'a> CartService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        let stores = state.stores();
        Self { products: stores.products.as_ref(), carts: stores.carts.as_ref() }
    }

    /// Adds `quantity` of a product variant, creating the cart on first use.
    #[instrument(skip(self))]
    pub async fn add_or_update(
        &self,
        user: UserId,
        product: ProductId,
        quantity: i64,
        size: Option<String>,
    ) -> Result<CartView> {
        let quantity = Quantity::new(quantity).map_err(|_| CartError::InvalidQuantity)?;
        if self.products.get(product).await?.is_none() {
            return Err(CartError::ProductNotFound.into());
        }

        let mut cart = self.carts.get(user).await?.unwrap_or_else(|| Cart::new(user));
        cart.add_item(LineItem::new(product, quantity, size));
        self.carts.save(&cart).await?;
        self.resolve(&cart).await
    }

    /// Overwrites the quantity of an existing line item. The quantity is checked before any read.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        user: UserId,
        product: ProductId,
        size: Option<String>,
        quantity: i64,
    ) -> Result<CartView> {
        let quantity = Quantity::new(quantity).map_err(|_| CartError::InvalidQuantity)?;
        let mut cart = self.carts.get(user).await?.ok_or(CartError::CartNotFound)?;
        cart.set_quantity(product, normalize_size(size).as_deref(), quantity)?;
        self.carts.save(&cart).await?;
        self.resolve(&cart).await
    }

    /// Removes every line for the variant. Removing an absent line leaves the cart unchanged.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, user: UserId, product: ProductId, size: Option<String>) -> Result<CartView> {
        let mut cart = self.carts.get(user).await?.ok_or(CartError::CartNotFound)?;
        if cart.remove_item(product, normalize_size(size).as_deref()) > 0 {
            self.carts.save(&cart).await?;
        }
        self.resolve(&cart).await
    }

    #[instrument(skip(self))]
    pub async fn clear(&self, user: UserId) -> Result<()> {
        let existed = self.carts.delete(user).await?;
        tracing::debug!(existed, "Cart cleared");
        Ok(())
    }

    /// `None` when the user has never added anything.
    pub async fn get(&self, user: UserId) -> Result<Option<CartView>> {
        match self.carts.get(user).await? {
            Some(cart) => Ok(Some(self.resolve(&cart).await?)),
            None => Ok(None),
        }
    }

    async fn resolve(&self, cart: &Cart) -> Result<CartView> {
        let products = self.products.get_many(&cart.product_ids()).await?;
        Ok(cart.resolve(&products))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::test_support::{state_with_product, user};

    #[tokio::test]
    async fn test_add_merges_same_variant() {
        let (state, product) = state_with_product().await;
        let carts = CartService::new(&state);
        let u = user();
        carts.add_or_update(u, product.id, 2, Some("M".into())).await.unwrap();
        let view = carts.add_or_update(u, product.id, 3, Some("M".into())).await.unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].quantity.value(), 5);
        assert_eq!(view.items[0].product.as_ref().unwrap().id, product.id);

        let view = carts.add_or_update(u, product.id, 1, Some("L".into())).await.unwrap();
        assert_eq!(view.items.len(), 2);
    }

    #[tokio::test]
    async fn test_add_unknown_product_is_not_found() {
        let (state, _) = state_with_product().await;
        let err = CartService::new(&state).add_or_update(user(), ProductId::new(), 1, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Product not found"));
    }

    #[tokio::test]
    async fn test_set_quantity_validates_before_lookup() {
        let (state, product) = state_with_product().await;
        let carts = CartService::new(&state);
        // No cart exists, yet the quantity is rejected first.
        for bad in [0, -1] {
            let err = carts.set_quantity(user(), product.id, None, bad).await.unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
        let err = carts.set_quantity(user(), product.id, None, 2).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Cart not found"));
    }

    #[tokio::test]
    async fn test_set_quantity_and_remove() {
        let (state, product) = state_with_product().await;
        let carts = CartService::new(&state);
        let u = user();
        carts.add_or_update(u, product.id, 4, Some("S".into())).await.unwrap();

        let view = carts.set_quantity(u, product.id, Some("S".into()), 1).await.unwrap();
        assert_eq!(view.items[0].quantity.value(), 1);
        let err = carts.set_quantity(u, product.id, Some("XL".into()), 1).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Item not found in cart"));

        let view = carts.remove_item(u, product.id, Some("XL".into())).await.unwrap();
        assert_eq!(view.items.len(), 1);
        let view = carts.remove_item(u, product.id, Some("S".into())).await.unwrap();
        assert!(view.items.is_empty());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let (state, product) = state_with_product().await;
        let carts = CartService::new(&state);
        let u = user();
        carts.add_or_update(u, product.id, 1, None).await.unwrap();
        carts.clear(u).await.unwrap();
        carts.clear(u).await.unwrap();
        assert!(carts.get(u).await.unwrap().is_none());
    }
}
