//! Cart routes.

use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::aggregates::{CartError, CartView};
use crate::domain::value_objects::ProductId;
use crate::error::{AppError, Result};
use crate::extract::JsonBody;
use crate::middleware::AuthUser;
use crate::services::CartService;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).post(add_to_cart).delete(remove_item))
        .route("/change-quantity", post(change_quantity))
        .route("/all", delete(clear_cart))
}

#[derive(Debug, Deserialize)]
struct AddToCartRequest {
    product: Option<String>,
    quantity: Option<i64>,
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineItemRequest {
    product_id: Option<String>,
    size: Option<String>,
    quantity: Option<i64>,
}

fn product_id(raw: &str) -> Result<ProductId> {
    raw.parse().map_err(|_| AppError::BadRequest("Invalid product ID".to_string()))
}

async fn get_cart(State(state): State<AppState>, user: AuthUser) -> Result<Json<Option<CartView>>> {
    Ok(Json(CartService::new(&state).get(user.user_id).await?))
}

async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<AddToCartRequest>,
) -> Result<Json<Value>> {
    // An id that cannot name a product is reported the same as an unknown one.
    let product: ProductId = req
        .product
        .as_deref()
        .and_then(|raw| raw.parse().ok())
        .ok_or(CartError::ProductNotFound)?;
    let cart = CartService::new(&state)
        .add_or_update(user.user_id, product, req.quantity.unwrap_or(1), req.size)
        .await?;
    Ok(Json(json!({ "message": "Cart updated", "cart": cart })))
}

async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<LineItemRequest>,
) -> Result<Json<Value>> {
    let raw = req
        .product_id
        .ok_or_else(|| AppError::BadRequest("Product ID is required".to_string()))?;
    let cart = CartService::new(&state)
        .remove_item(user.user_id, product_id(&raw)?, req.size)
        .await?;
    Ok(Json(json!({ "message": "Item removed from cart", "cart": cart })))
}

async fn change_quantity(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<LineItemRequest>,
) -> Result<Json<Value>> {
    let (Some(raw), Some(quantity)) = (req.product_id, req.quantity) else {
        return Err(AppError::BadRequest("Product ID and quantity are required".to_string()));
    };
    if quantity < 1 {
        return Err(CartError::InvalidQuantity.into());
    }
    let cart = CartService::new(&state)
        .set_quantity(user.user_id, product_id(&raw)?, req.size, quantity)
        .await?;
    Ok(Json(json!({ "message": "Quantity updated", "cart": cart })))
}

async fn clear_cart(State(state): State<AppState>, user: AuthUser) -> Result<Json<Value>> {
    CartService::new(&state).clear(user.user_id).await?;
    Ok(Json(json!({ "message": "Cart cleared successfully" })))
}
