//! Catalog routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::domain::aggregates::{NewProduct, Product};
use crate::domain::search::{Page, PageRequest, Pagination, ProductSearch};
use crate::domain::value_objects::ProductId;
use crate::error::{AppError, Result};
use crate::extract::JsonBody;
use crate::middleware::AuthUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/search", get(search_products))
        .route("/:id", get(get_product))
}

async fn list_products(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Page<Product>>> {
    let (_, page) = ProductSearch::from_pairs(&pairs);
    search(&state, &ProductSearch::default(), page).await
}

async fn search_products(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Page<Product>>> {
    let (filters, page) = ProductSearch::from_pairs(&pairs);
    search(&state, &filters, page).await
}

async fn search(state: &AppState, filters: &ProductSearch, page: PageRequest) -> Result<Json<Page<Product>>> {
    let (data, total) = state.stores().products.search(filters, page).await?;
    Ok(Json(Page { data, pagination: Pagination::new(total, page) }))
}

async fn get_product(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let not_found = || AppError::NotFound("Product not found".to_string());
    let id: ProductId = id.parse().map_err(|_| not_found())?;
    state.stores().products.get(id).await?.map(Json).ok_or_else(not_found)
}

/// Only the configured catalog owner may list products.
async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<Value>,
) -> Result<(StatusCode, Json<Value>)> {
    if state.catalog_owner() != Some(user.user_id) {
        return Err(AppError::Forbidden("Unauthorized access".to_string()));
    }
    let new: NewProduct = serde_json::from_value(body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let (product, event) = Product::create(new)?;
    state.stores().products.insert(&product).await?;
    tracing::info!(product_id = %product.id, "Product created");
    state.publisher().publish(&event).await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Product created successfully", "product": product })),
    ))
}
