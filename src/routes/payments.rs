//! Payment gateway routes.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, Enveloped};
use crate::extract::JsonBody;
use crate::middleware::AuthUser;
use crate::payment::gateway::{GatewayOrderRequest, DEFAULT_CURRENCY};
use crate::state::AppState;

type Result<T> = std::result::Result<T, Enveloped>;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_payment_order))
        .route("/validate", post(validate_payment))
}

#[derive(Debug, Deserialize)]
struct CreatePaymentOrder {
    amount: Option<u64>,
    currency: Option<String>,
    receipt: Option<String>,
    notes: Option<Value>,
}

async fn create_payment_order(
    State(state): State<AppState>,
    _user: AuthUser,
    JsonBody(req): JsonBody<CreatePaymentOrder>,
) -> Result<(StatusCode, Json<Value>)> {
    let (Some(amount), Some(receipt)) = (
        req.amount.filter(|a| *a > 0),
        req.receipt.filter(|r| !r.trim().is_empty()),
    ) else {
        return Err(AppError::BadRequest("Amount and receipt are required".to_string()).into());
    };

    let request = GatewayOrderRequest {
        amount,
        currency: req.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        receipt,
        notes: req.notes,
    };
    let order = state.gateway().create_order(&request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "data": order }))))
}

#[derive(Debug, Deserialize)]
struct ValidatePayment {
    razorpay_order_id: Option<String>,
    razorpay_payment_id: Option<String>,
    razorpay_signature: Option<String>,
}

async fn validate_payment(
    State(state): State<AppState>,
    _user: AuthUser,
    JsonBody(req): JsonBody<ValidatePayment>,
) -> Result<Json<Value>> {
    state.signatures().verify(
        req.razorpay_order_id.as_deref(),
        req.razorpay_payment_id.as_deref(),
        req.razorpay_signature.as_deref(),
    )?;
    Ok(Json(json!({
        "success": true,
        "message": "Payment signature verified successfully",
        "orderId": req.razorpay_order_id,
        "paymentId": req.razorpay_payment_id,
    })))
}
