#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use storefront_backend::domain::aggregates::{Gender, NewProduct, Product, User};
use storefront_backend::domain::events::DomainEvent;
use storefront_backend::middleware::TrustedProxyVerifier;
use storefront_backend::payment::{GatewayError, GatewayOrder, GatewayOrderRequest, PaymentGateway, SignatureVerifier};
use storefront_backend::publisher::EventPublisher;
use storefront_backend::storage::Stores;
use storefront_backend::{router, AppState};

pub const SECRET: &str = "s3cr3t";
pub const SHOPPER: &str = "auth0|shopper";
pub const OWNER: &str = "auth0|owner";

/// Answers every order creation with a fixed gateway order, or fails when told to.
#[derive(Default)]
pub struct FakeGateway {
    pub fail: bool,
    pub requests: Mutex<Vec<GatewayOrderRequest>>,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(GatewayError::Rejected { status: 500, body: "boom".into() });
        }
        Ok(GatewayOrder {
            id: "order_test_1".into(),
            amount: request.amount,
            currency: request.currency.clone(),
            receipt: Some(request.receipt.clone()),
            status: Some("created".into()),
            extra: Default::default(),
        })
    }
}

pub struct TestApp {
    pub state: AppState,
    pub gateway: Arc<FakeGateway>,
    pub events: Arc<Mutex<Vec<DomainEvent>>>,
    pub shopper: User,
    pub owner: User,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_gateway(FakeGateway::default()).await
    }

    pub async fn with_gateway(gateway: FakeGateway) -> Self {
        let stores = Stores::in_memory();
        let shopper = User::register(SHOPPER, "shopper@example.com", Some("Shopper".into()));
        let owner = User::register(OWNER, "owner@example.com", Some("Owner".into()));
        stores.users.insert(&shopper).await.unwrap();
        stores.users.insert(&owner).await.unwrap();

        let gateway = Arc::new(gateway);
        let (publisher, events) = EventPublisher::recording();
        let state = AppState::new(
            stores,
            gateway.clone(),
            SignatureVerifier::new(SecretString::from(SECRET)),
            Arc::new(TrustedProxyVerifier),
            publisher,
            Some(owner.id),
        );
        Self { state, gateway, events, shopper, owner }
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    pub async fn seed_product(&self, name: &str, colors: &[&str], price: i64) -> Product {
        let (product, _) = Product::create(new_product(name, colors, price)).unwrap();
        self.state.stores().products.insert(&product).await.unwrap();
        product
    }

    /// Sends a request as `subject` (no auth header when `None`) and returns status and JSON body.
    pub async fn send(&self, method: Method, uri: &str, subject: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(subject) = subject {
            builder = builder.header("authorization", format!("Bearer {subject}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }
}

pub fn new_product(name: &str, colors: &[&str], price: i64) -> NewProduct {
    NewProduct {
        product_name: name.into(),
        brand: "Acme".into(),
        price: Decimal::from(price),
        sizes: vec!["S".into(), "M".into(), "L".into()],
        colors: colors.iter().map(|c| c.to_string()).collect(),
        stock: 25,
        category: "T-Shirt".into(),
        gender: Gender::Unisex,
        product_description: "Soft cotton".into(),
        product_images: vec!["https://cdn.example.com/p.jpg".into()],
        discount: Decimal::ZERO,
        collections: "Essentials".into(),
        best_seller: false,
        is_featured: false,
    }
}

pub fn address_json() -> Value {
    serde_json::json!({
        "fullName": "Asha Rao",
        "phoneNumber": "9876543210",
        "addressLine1": "12 MG Road",
        "city": "Bengaluru",
        "state": "Karnataka",
        "pincode": "560001"
    })
}
