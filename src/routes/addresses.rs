//! Address book routes.

use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::domain::aggregates::{flexible_bool, AddressBook, ShippingAddress};
use crate::error::{AppError, Enveloped, Result};
use crate::extract::FormBody;
use crate::middleware::AuthUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(get_addresses).post(add_address))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressForm {
    #[serde(flatten)]
    address: ShippingAddress,
    #[serde(default, deserialize_with = "flexible_bool")]
    is_default: bool,
}

async fn get_addresses(State(state): State<AppState>, user: AuthUser) -> Result<Json<Option<AddressBook>>> {
    Ok(Json(state.stores().addresses.get(user.user_id).await?))
}

async fn add_address(
    State(state): State<AppState>,
    user: AuthUser,
    form: std::result::Result<FormBody<AddressForm>, AppError>,
) -> std::result::Result<Json<Value>, Enveloped> {
    let FormBody(form) = form?;
    let address = form.address.normalized();
    address.validate()?;

    let addresses = &state.stores().addresses;
    let mut book = addresses
        .get(user.user_id)
        .await?
        .unwrap_or_else(|| AddressBook::new(user.user_id));
    book.add(address, form.is_default);
    addresses.save(&book).await?;

    Ok(Json(json!({ "success": true, "data": book })))
}
