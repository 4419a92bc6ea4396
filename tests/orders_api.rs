mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{address_json, TestApp, SHOPPER};
use storefront_backend::domain::aggregates::OrderStatus;
use storefront_backend::domain::events::{DomainEvent, OrderEvent};
use storefront_backend::domain::value_objects::{OrderId, ProductId};

fn order_body(product: ProductId, total: i64) -> Value {
    json!({
        "items": [{ "product": product.to_string(), "quantity": 2, "size": "M" }],
        "shippingAddress": address_json(),
        "totalAmount": total,
        "paymentMethod": "Cash on Delivery"
    })
}

async fn place(app: &TestApp, product: ProductId) -> String {
    let (status, body) = app.send(Method::POST, "/api/my/order", Some(SHOPPER), Some(order_body(product, 998))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["order"]["id"].as_str().unwrap().to_string()
}

async fn transition(app: &TestApp, order_id: &str, action: &str) -> (StatusCode, Value) {
    app.send(
        Method::PATCH,
        "/api/my/order/status",
        Some(SHOPPER),
        Some(json!({ "orderId": order_id, "action": action })),
    )
    .await
}

#[tokio::test]
async fn test_create_order_is_pending_and_keeps_cart() {
    let app = TestApp::new().await;
    let product = app.seed_product("Classic Tee", &["Red"], 499).await;
    app.send(Method::POST, "/api/cart", Some(SHOPPER), Some(json!({ "product": product.id.to_string(), "quantity": 2, "size": "M" }))).await;

    let (status, body) = app.send(Method::POST, "/api/my/order", Some(SHOPPER), Some(order_body(product.id, 100))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Order created successfully.");
    assert_eq!(body["order"]["status"], "Pending");
    assert_eq!(body["order"]["shippingAddress"]["country"], "India");

    let (_, cart) = app.send(Method::GET, "/api/cart", Some(SHOPPER), None).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);

    let events = app.events.lock().unwrap();
    assert!(matches!(events.last(), Some(DomainEvent::Order(OrderEvent::Created { .. }))));
}

#[tokio::test]
async fn test_create_order_validation() {
    let app = TestApp::new().await;
    let product = app.seed_product("Classic Tee", &["Red"], 499).await;

    let mut no_items = order_body(product.id, 100);
    no_items["items"] = json!([]);
    let (status, body) = app.send(Method::POST, "/api/my/order", Some(SHOPPER), Some(no_items)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Order must have at least one item.");

    let (status, body) = app.send(Method::POST, "/api/my/order", Some(SHOPPER), Some(order_body(product.id, 0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Total amount must be greater than 0.");

    let mut no_address = order_body(product.id, 100);
    no_address.as_object_mut().unwrap().remove("shippingAddress");
    let (status, body) = app.send(Method::POST, "/api/my/order", Some(SHOPPER), Some(no_address)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Shipping address is required.");

    let mut bad_phone = order_body(product.id, 100);
    bad_phone["shippingAddress"]["phoneNumber"] = json!("12345");
    let (status, body) = app.send(Method::POST, "/api/my/order", Some(SHOPPER), Some(bad_phone)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["path"], "phoneNumber");
}

#[tokio::test]
async fn test_create_with_verified_payment_is_ordered() {
    let app = TestApp::new().await;
    let product = app.seed_product("Classic Tee", &["Red"], 499).await;
    let signature = app.state.signatures().sign("order_1", "pay_1").unwrap();

    let mut body = order_body(product.id, 998);
    body["paymentMethod"] = json!("Prepaid");
    body["paymentDetails"] = json!({
        "razorpay_order_id": "order_1",
        "razorpay_payment_id": "pay_1",
        "razorpay_signature": signature,
    });
    let (status, created) = app.send(Method::POST, "/api/my/order", Some(SHOPPER), Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["order"]["status"], "Ordered");

    body["paymentDetails"]["razorpay_signature"] = json!("0".repeat(64));
    let (status, rejected) = app.send(Method::POST, "/api/my/order", Some(SHOPPER), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected["message"], "Transaction is not legit!");
}

#[tokio::test]
async fn test_list_orders_newest_first_with_summaries() {
    let app = TestApp::new().await;
    let product = app.seed_product("Classic Tee", &["Red"], 499).await;
    let first = place(&app, product.id).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = place(&app, product.id).await;

    let (status, body) = app.send(Method::GET, "/api/my/order", Some(SHOPPER), None).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], second);
    assert_eq!(orders[1]["id"], first);
    assert_eq!(orders[0]["items"][0]["product"]["productName"], "Classic Tee");
    assert_eq!(orders[0]["items"][0]["product"]["brand"], "Acme");
}

#[tokio::test]
async fn test_cancel_flow() {
    let app = TestApp::new().await;
    let product = app.seed_product("Classic Tee", &["Red"], 499).await;
    let id = place(&app, product.id).await;

    let (status, body) = transition(&app, &id, "cancel").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order cancelled successfully.");
    assert_eq!(body["order"]["status"], "Cancelled");

    let (status, body) = transition(&app, &id, "cancel").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Order is already cancelled.");

    let (_, body) = transition(&app, &id, "return").await;
    assert_eq!(body["message"], "Cannot return a cancelled order.");
}

#[tokio::test]
async fn test_return_flow() {
    let app = TestApp::new().await;
    let product = app.seed_product("Classic Tee", &["Red"], 499).await;
    let id = place(&app, product.id).await;

    let (status, body) = transition(&app, &id, "return").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Can only return a delivered order.");

    let order_id: OrderId = id.parse().unwrap();
    app.state.stores().orders.update_status(order_id, app.shopper.id, OrderStatus::Pending, OrderStatus::Delivered).await.unwrap();

    let (status, body) = transition(&app, &id, "cancel").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot cancel a delivered order.");

    let (status, body) = transition(&app, &id, "return").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order marked for return successfully.");
    assert_eq!(body["order"]["status"], "Return");

    let (_, body) = transition(&app, &id, "return").await;
    assert_eq!(body["message"], "Order is already returned or in return process.");

    let (_, body) = transition(&app, &id, "cancel").await;
    assert_eq!(body["message"], "Cannot cancel a returned or return-in-progress order.");

    let events = app.events.lock().unwrap();
    assert!(events.iter().any(|e| matches!(e, DomainEvent::Order(OrderEvent::ReturnRequested { .. }))));
}

#[tokio::test]
async fn test_status_request_validation_and_ownership() {
    let app = TestApp::new().await;
    let product = app.seed_product("Classic Tee", &["Red"], 499).await;
    let id = place(&app, product.id).await;

    let (status, body) = transition(&app, "not-an-id", "cancel").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or missing orderId.");

    let (status, body) = transition(&app, &id, "refund").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid action. Must be 'cancel' or 'return'.");

    let (status, body) = app
        .send(Method::PATCH, "/api/my/order/status", Some(common::OWNER), Some(json!({ "orderId": id, "action": "cancel" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Order not found.");
}
