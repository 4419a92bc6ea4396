//! Fixtures shared by the unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::SecretString;

use crate::domain::aggregates::product::tests::new_product;
use crate::domain::aggregates::{LineItem, NewOrder, PaymentMethod, Product, ShippingAddress};
use crate::domain::value_objects::{ProductId, Quantity, UserId};
use crate::middleware::TrustedProxyVerifier;
use crate::payment::{GatewayError, GatewayOrder, GatewayOrderRequest, PaymentGateway, SignatureVerifier};
use crate::publisher::EventPublisher;
use crate::state::AppState;
use crate::storage::Stores;

pub const SECRET: &str = "s3cr3t";

pub struct RefusingGateway;

#[async_trait]
impl PaymentGateway for RefusingGateway {
    async fn create_order(&self, _request: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        Err(GatewayError::Rejected { status: 503, body: "unavailable".into() })
    }
}

pub fn state() -> AppState {
    state_with_stores(Stores::in_memory())
}

pub fn state_with_stores(stores: Stores) -> AppState {
    AppState::new(
        stores,
        Arc::new(RefusingGateway),
        SignatureVerifier::new(SecretString::from(SECRET)),
        Arc::new(TrustedProxyVerifier),
        EventPublisher::disabled(),
        None,
    )
}

pub async fn state_with_product() -> (AppState, Product) {
    let state = state();
    let (product, _) = Product::create(new_product("Classic Tee")).unwrap();
    state.stores().products.insert(&product).await.unwrap();
    (state, product)
}

pub fn user() -> UserId {
    UserId::new()
}

pub fn new_order(product: ProductId, total: i64) -> NewOrder {
    NewOrder {
        items: vec![LineItem::new(product, Quantity::ONE, Some("M".into()))],
        shipping_address: Some(ShippingAddress {
            full_name: "Asha Rao".into(),
            phone_number: "9876543210".into(),
            address_line1: "12 MG Road".into(),
            address_line2: None,
            city: "Bengaluru".into(),
            state: "Karnataka".into(),
            pincode: "560001".into(),
            country: "India".into(),
        }),
        total_amount: Some(Decimal::from(total)),
        payment_method: Some(PaymentMethod::CashOnDelivery),
        payment_details: None,
    }
}
