//! HTTP routes.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

mod addresses;
mod cart;
mod orders;
mod payments;
mod products;
mod queries;
mod users;

/// The full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/my/user", users::routes())
        .nest("/api/products", products::routes())
        .nest("/api/cart", cart::routes())
        .nest("/api/my/address", addresses::routes())
        .nest("/api/my/query", queries::routes())
        .nest("/api/my/order", orders::routes())
        .nest("/api/payment", payments::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "storefront-backend" }))
}
