use std::{str::FromStr, sync::Arc};

use axum::{
  body::Body,
  http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use storefront_store_sqlite::SqliteStore;
use tower::ServiceExt as _;
use uuid::Uuid;

use super::api_router;
use crate::identity::{STORE_HEADER, USER_HEADER};

// ─── Helpers ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
struct Caller {
  user_id:  Uuid,
  store_id: Option<Uuid>,
}

async fn repo() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.unwrap())
}

async fn send(
  repo: &Arc<SqliteStore>,
  method: &str,
  uri: &str,
  caller: Option<Caller>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(caller) = caller {
    builder = builder.header(USER_HEADER, caller.user_id.to_string());
    if let Some(store_id) = caller.store_id {
      builder = builder.header(STORE_HEADER, store_id.to_string());
    }
  }
  let req = match body {
    Some(json) => builder
      .header("content-type", "application/json")
      .body(Body::from(json.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = api_router(repo.clone()).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

fn uuid_at(value: &Value, pointer: &str) -> Uuid {
  Uuid::parse_str(value.pointer(pointer).and_then(Value::as_str).unwrap()).unwrap()
}

fn decimal_at(value: &Value, pointer: &str) -> Decimal {
  Decimal::from_str(value.pointer(pointer).and_then(Value::as_str).unwrap()).unwrap()
}

/// Create a store named `name` and return a caller acting on it.
async fn owner(repo: &Arc<SqliteStore>, name: &str) -> Caller {
  let user_id = Uuid::new_v4();
  let caller = Caller { user_id, store_id: None };
  let (status, body) = send(repo, "POST", "/stores", Some(caller), Some(json!({ "name": name }))).await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  Caller { user_id, store_id: Some(uuid_at(&body, "/store/id")) }
}

/// Create a category holding one product priced 12.00 and return the
/// product id.
async fn burger(repo: &Arc<SqliteStore>, caller: Caller) -> Uuid {
  let (status, body) = send(
    repo,
    "POST",
    "/categories",
    Some(caller),
    Some(json!({
      "name": "Burgers",
      "products": [{ "name": "Classic", "priceInCents": 1200 }]
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  uuid_at(&body, "/products/0/id")
}

fn order_body(product_id: Uuid) -> Value {
  json!({
    "customer": { "name": "Ana", "phone": "11 99999-0000", "address": "Rua A, 10, Centro" },
    "items": [{ "productId": product_id, "quantity": 2, "unitPrice": "12.00" }],
    "paymentMethod": "pix",
    "deliveryFee": "5.00",
    "total": "29.00"
  })
}

// ─── Identity ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_identity_is_unauthorized() {
  let repo = repo().await;
  let (status, body) = send(&repo, "GET", "/settings", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["error"]["kind"], "unauthorized");
}

#[tokio::test]
async fn store_routes_need_the_store_header() {
  let repo = repo().await;
  let caller = Caller { user_id: Uuid::new_v4(), store_id: None };
  let (status, _) = send(&repo, "GET", "/categories", Some(caller), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ─── Stores and settings ─────────────────────────────────────────────────────

#[tokio::test]
async fn created_store_has_slug_and_default_settings() {
  let repo = repo().await;
  let caller = owner(&repo, "Burger House").await;

  let (status, me) = send(&repo, "GET", "/stores/me", Some(caller), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(me["subdomain"], "burger-house");

  let (status, settings) = send(&repo, "GET", "/settings", Some(caller), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(settings["isOpen"], true);
  assert_eq!(uuid_at(&settings, "/storeId"), caller.store_id.unwrap());

  let (status, updated) = send(
    &repo,
    "PUT",
    "/settings",
    Some(caller),
    Some(json!({ "isOpen": false, "deliveryFee": "7.50" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{updated}");
  assert_eq!(updated["isOpen"], false);
  assert_eq!(decimal_at(&updated, "/deliveryFee"), Decimal::new(750, 2));
}

#[tokio::test]
async fn taken_subdomain_is_a_conflict() {
  let repo = repo().await;
  owner(&repo, "Burger House").await;
  let other = owner(&repo, "Pizza Place").await;

  let (status, body) = send(
    &repo,
    "PUT",
    "/store/subdomain",
    Some(other),
    Some(json!({ "subdomain": "burger-house" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["error"]["kind"], "conflict");
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn category_with_nested_product_is_listed() {
  let repo = repo().await;
  let caller = owner(&repo, "Burger House").await;
  let product_id = burger(&repo, caller).await;

  let (status, categories) = send(&repo, "GET", "/categories", Some(caller), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(categories.as_array().unwrap().len(), 1);
  assert_eq!(uuid_at(&categories, "/0/products/0/id"), product_id);

  let (status, product) =
    send(&repo, "GET", &format!("/products/{product_id}"), Some(caller), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(decimal_at(&product, "/price"), Decimal::new(1200, 2));
  assert_eq!(product["categoryName"], "Burgers");
}

#[tokio::test]
async fn unknown_product_is_not_found() {
  let repo = repo().await;
  let caller = owner(&repo, "Burger House").await;

  let uri = format!("/products/{}", Uuid::new_v4());
  let (status, body) = send(&repo, "GET", &uri, Some(caller), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"]["kind"], "not_found");
}

#[tokio::test]
async fn other_stores_products_are_invisible() {
  let repo = repo().await;
  let caller = owner(&repo, "Burger House").await;
  let intruder = owner(&repo, "Pizza Place").await;
  let product_id = burger(&repo, caller).await;

  let uri = format!("/products/{product_id}");
  let (status, _) = send(&repo, "DELETE", &uri, Some(intruder), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(&repo, "GET", &uri, Some(caller), None).await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn ordered_product_cannot_be_deleted() {
  let repo = repo().await;
  let caller = owner(&repo, "Burger House").await;
  let product_id = burger(&repo, caller).await;

  let (status, _) = send(&repo, "POST", "/orders", Some(caller), Some(order_body(product_id))).await;
  assert_eq!(status, StatusCode::CREATED);

  let uri = format!("/products/{product_id}");
  let (status, body) = send(&repo, "DELETE", &uri, Some(caller), None).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["error"]["kind"], "conflict");

  let (status, _) = send(&repo, "GET", &uri, Some(caller), None).await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unordered_product_is_deleted() {
  let repo = repo().await;
  let caller = owner(&repo, "Burger House").await;
  let product_id = burger(&repo, caller).await;

  let uri = format!("/products/{product_id}");
  let (status, body) = send(&repo, "DELETE", &uri, Some(caller), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  assert_eq!(body, Value::Null);

  let (status, _) = send(&repo, "GET", &uri, Some(caller), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Orders ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn order_status_moves_forward_and_rejects_unknown_labels() {
  let repo = repo().await;
  let caller = owner(&repo, "Burger House").await;
  let product_id = burger(&repo, caller).await;

  let (_, order) = send(&repo, "POST", "/orders", Some(caller), Some(order_body(product_id))).await;
  assert_eq!(order["status"], "NEW");
  assert_eq!(decimal_at(&order, "/items/0/lineTotal"), Decimal::new(2400, 2));
  let uri = format!("/orders/{}/status", uuid_at(&order, "/id"));

  let (status, body) =
    send(&repo, "PATCH", &uri, Some(caller), Some(json!({ "status": "teleported" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"]["kind"], "invalid_input");

  let (status, body) =
    send(&repo, "PATCH", &uri, Some(caller), Some(json!({ "status": "preparing" }))).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["status"], "PREPARING");

  let (status, body) = send(
    &repo,
    "PATCH",
    &uri,
    Some(caller),
    Some(json!({ "status": "canceled", "reason": "out of buns", "canceledBy": "store" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["cancelReason"], "out of buns");
  assert!(body["canceledAt"].is_string());
}

#[tokio::test]
async fn order_without_items_is_rejected() {
  let repo = repo().await;
  let caller = owner(&repo, "Burger House").await;

  let (status, body) = send(
    &repo,
    "POST",
    "/orders",
    Some(caller),
    Some(json!({ "items": [], "total": "10.00" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"]["kind"], "invalid_input");

  let (_, orders) = send(&repo, "GET", "/orders", Some(caller), None).await;
  assert_eq!(orders, json!([]));
}

// ─── Public storefront ───────────────────────────────────────────────────────

#[tokio::test]
async fn public_menu_and_checkout() {
  let repo = repo().await;
  let caller = owner(&repo, "Burger House").await;
  let product_id = burger(&repo, caller).await;

  let (status, menu) = send(&repo, "GET", "/public/burger-house/menu", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(menu["store"]["name"], "Burger House");
  assert_eq!(uuid_at(&menu, "/categories/0/products/0/id"), product_id);

  let (status, public) = send(&repo, "GET", "/public/burger-house/settings", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(public["settings"]["isOpen"], true);

  let (status, placed) = send(
    &repo,
    "POST",
    "/public/burger-house/orders",
    None,
    Some(order_body(product_id)),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{placed}");

  let (_, orders) = send(&repo, "GET", "/orders", Some(caller), None).await;
  assert_eq!(orders.as_array().unwrap().len(), 1);
  assert_eq!(orders[0]["id"], placed["id"]);
  assert_eq!(orders[0]["customerName"], "Ana");
}

#[tokio::test]
async fn unknown_subdomain_is_not_found() {
  let repo = repo().await;
  let (status, body) = send(&repo, "GET", "/public/nowhere/menu", None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"]["kind"], "not_found");
}
