//! Order routes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::aggregates::{NewOrder, OrderAction};
use crate::error::Result;
use crate::extract::JsonBody;
use crate::middleware::AuthUser;
use crate::services::OrderService;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/status", patch(update_status))
}

async fn list_orders(State(state): State<AppState>, user: AuthUser) -> Result<Json<Value>> {
    let orders = OrderService::new(&state).list_mine(user.user_id).await?;
    Ok(Json(json!({ "orders": orders })))
}

async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(new): JsonBody<NewOrder>,
) -> Result<(StatusCode, Json<Value>)> {
    let order = OrderService::new(&state).create(user.user_id, new).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Order created successfully.", "order": order })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusRequest {
    order_id: Option<String>,
    action: Option<String>,
}

async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<StatusRequest>,
) -> Result<Json<Value>> {
    let (action, order) = OrderService::new(&state)
        .transition(user.user_id, req.order_id.as_deref(), req.action.as_deref())
        .await?;
    let message = match action {
        OrderAction::Cancel => "Order cancelled successfully.",
        OrderAction::Return => "Order marked for return successfully.",
    };
    Ok(Json(json!({ "message": message, "order": order })))
}
