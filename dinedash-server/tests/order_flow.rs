//! End-to-end order and delivery workflow over HTTP
//!
//! Cart → Placed → Preparing → PickedUp → Delivered with a payment
//! after placement and a contractor claiming the delivery.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use dinedash_server::core::{Config, ServerState, build_router};
use dinedash_server::db::DbService;

async fn test_app() -> Router {
    let db = DbService::new_in_memory()
        .await
        .expect("in-memory database");
    let state = ServerState::with_db(Config::from_env(), db.db);
    build_router(state)
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn register(app: &Router, email: &str, role: Value) -> (String, Value) {
    let mut payload = json!({
        "email": email,
        "password": "password123",
        "display_name": "Somebody"
    });
    for (k, v) in role.as_object().expect("role object") {
        payload[k] = v.clone();
    }
    let (status, body) = call(app, "POST", "/api/auth/register", None, Some(payload)).await;
    assert_eq!(status, StatusCode::OK, "register {email}: {body}");
    let token = body["data"]["token"].as_str().expect("token").to_string();
    (token, body["data"]["account"].clone())
}

async fn set_status(app: &Router, token: &str, order: &str, status_name: &str) -> (StatusCode, Value) {
    call(
        app,
        "POST",
        &format!("/api/orders/{order}/status"),
        Some(token),
        Some(json!({ "status": status_name })),
    )
    .await
}

struct Fixture {
    app: Router,
    staff: String,
    customer: String,
    contractor: String,
    restaurant: String,
    item: String,
}

async fn fixture() -> Fixture {
    let app = test_app().await;

    let (staff, account) = register(
        &app,
        "owner@example.com",
        json!({
            "role": "staff",
            "restaurant": {
                "name": "Burger Barn",
                "description": "Smash burgers",
                "address": "2 Side St",
                "latitude": "40.7000",
                "longitude": "-74.0000",
                "hours": {}
            }
        }),
    )
    .await;
    let restaurant = account["role"]["restaurant"]
        .as_str()
        .expect("restaurant id")
        .to_string();

    let (customer, _) = register(&app, "diner@example.com", json!({ "role": "customer" })).await;
    let (contractor, _) =
        register(&app, "driver@example.com", json!({ "role": "contractor" })).await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/menu_items/{restaurant}"),
        Some(&staff),
        Some(json!({
            "name": "Double Smash",
            "description": "Two patties",
            "price": "9.50"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create item: {body}");
    let item = body["data"]["id"].as_str().expect("item id").to_string();

    Fixture {
        app,
        staff,
        customer,
        contractor,
        restaurant,
        item,
    }
}

#[tokio::test]
async fn order_progresses_from_cart_to_delivered() {
    let f = fixture().await;

    // Add the same item twice; the line quantity accumulates
    for _ in 0..2 {
        let (status, body) = call(
            &f.app,
            "POST",
            &format!("/api/orders/cart/{}/items", f.restaurant),
            Some(&f.customer),
            Some(json!({ "menu_item": f.item, "quantity": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "add item: {body}");
    }

    let (status, body) = call(
        &f.app,
        "GET",
        &format!("/api/orders/cart/{}", f.restaurant),
        Some(&f.customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lines"][0]["quantity"], 2);

    let (status, body) = call(
        &f.app,
        "POST",
        &format!("/api/orders/cart/{}/place", f.restaurant),
        Some(&f.customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "place: {body}");
    assert_eq!(body["data"]["status"], "Placed");
    assert_eq!(body["data"]["total"], "19.00");
    let order = body["data"]["id"].as_str().expect("order id").to_string();

    // Customer pays the frozen total
    let (status, body) = call(
        &f.app,
        "POST",
        &format!("/api/payments/{order}"),
        Some(&f.customer),
        Some(json!({
            "card_number": "4111111111111111",
            "cardholder_name": "D Iner",
            "billing_address": "3 Oak Ave",
            "expiration_month": 12,
            "expiration_year": 2030,
            "cvv": "123",
            "payment_method": "CreditCard"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "pay: {body}");
    assert_eq!(body["data"]["card_last_four"], "1111");
    assert_eq!(body["data"]["amount_paid"], "19.00");

    // Staff starts preparation
    let (status, body) = set_status(&f.app, &f.staff, &order, "Preparing").await;
    assert_eq!(status, StatusCode::OK, "preparing: {body}");

    // Contractor finds and claims it
    let (status, body) = call(&f.app, "GET", "/api/orders/claimable", Some(&f.contractor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (status, body) = call(
        &f.app,
        "POST",
        &format!("/api/orders/{order}/claim"),
        Some(&f.contractor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "claim: {body}");

    let (status, body) = set_status(&f.app, &f.contractor, &order, "PickedUp").await;
    assert_eq!(status, StatusCode::OK, "picked up: {body}");
    let (status, body) = set_status(&f.app, &f.contractor, &order, "Delivered").await;
    assert_eq!(status, StatusCode::OK, "delivered: {body}");
    assert!(body["data"]["date_delivered"].is_i64());
}

#[tokio::test]
async fn paying_twice_conflicts() {
    let f = fixture().await;

    call(
        &f.app,
        "POST",
        &format!("/api/orders/cart/{}/items", f.restaurant),
        Some(&f.customer),
        Some(json!({ "menu_item": f.item, "quantity": 1 })),
    )
    .await;
    let (_, body) = call(
        &f.app,
        "POST",
        &format!("/api/orders/cart/{}/place", f.restaurant),
        Some(&f.customer),
        None,
    )
    .await;
    let order = body["data"]["id"].as_str().expect("order id").to_string();

    let card = json!({
        "card_number": "4111111111111111",
        "cardholder_name": "D Iner",
        "billing_address": "3 Oak Ave",
        "expiration_month": 6,
        "expiration_year": 2031,
        "cvv": "999",
        "payment_method": "DebitCard"
    });
    let (status, _) = call(
        &f.app,
        "POST",
        &format!("/api/payments/{order}"),
        Some(&f.customer),
        Some(card.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &f.app,
        "POST",
        &format!("/api/payments/{order}"),
        Some(&f.customer),
        Some(card),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "double pay: {body}");
    assert_eq!(body["code"], "E0004");
}

#[tokio::test]
async fn cancelled_orders_leave_the_pipeline() {
    let f = fixture().await;

    call(
        &f.app,
        "POST",
        &format!("/api/orders/cart/{}/items", f.restaurant),
        Some(&f.customer),
        Some(json!({ "menu_item": f.item, "quantity": 3 })),
    )
    .await;
    let (_, body) = call(
        &f.app,
        "POST",
        &format!("/api/orders/cart/{}/place", f.restaurant),
        Some(&f.customer),
        None,
    )
    .await;
    let order = body["data"]["id"].as_str().expect("order id").to_string();

    let (status, body) = set_status(&f.app, &f.customer, &order, "Cancelled").await;
    assert_eq!(status, StatusCode::OK, "cancel: {body}");

    // Too late to prepare it now
    let (status, body) = set_status(&f.app, &f.staff, &order, "Preparing").await;
    assert_eq!(status, StatusCode::CONFLICT, "prepare cancelled: {body}");
}
