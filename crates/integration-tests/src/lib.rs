//! Integration tests for Millet Market.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p millet-market-integration-tests
//! ```
//!
//! The tests need no external services: [`FakeMarketplace`] serves the
//! marketplace REST API in-process on a random localhost port, backed by a
//! small seeded catalog, and records what it was asked so tests can assert on
//! caching and header injection.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use millet_market_client::ClientConfig;
use millet_market_client::api::{Order, OrderItem};
use millet_market_core::{CatalogProduct, OrderId, OrderStatus, PaymentMethod, ProductId};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

/// Email accepted by the fake login endpoint.
pub const TEST_EMAIL: &str = "ravi@fpo.in";
/// Password accepted by the fake login endpoint.
pub const TEST_PASSWORD: &str = "ragi-rotti-42";
/// Token issued on successful login or registration.
pub const TEST_TOKEN: &str = "fake-jwt-token";

/// Seeded catalog: Foxtail (₹50, no supplier), Ragi flour (₹85.50/kg, Kolar
/// FPO) and Kodo (out of stock).
#[must_use]
pub fn seed_catalog() -> Vec<CatalogProduct> {
    vec![
        CatalogProduct {
            id: ProductId::new(1),
            display_name: "Foxtail".to_string(),
            unit_price: Decimal::new(50, 0),
            supplier_name: None,
            image_url: Some("https://cdn.example/foxtail.png".to_string()),
            category: Some("Millet grain".to_string()),
            unit: Some("kg".to_string()),
            stock: Some(120),
        },
        CatalogProduct {
            id: ProductId::new(2),
            display_name: "Ragi flour".to_string(),
            unit_price: Decimal::new(8550, 2),
            supplier_name: Some("Kolar FPO".to_string()),
            image_url: None,
            category: Some("Flour".to_string()),
            unit: Some("kg".to_string()),
            stock: Some(40),
        },
        CatalogProduct {
            id: ProductId::new(3),
            display_name: "Kodo".to_string(),
            unit_price: Decimal::new(70, 0),
            supplier_name: None,
            image_url: None,
            category: None,
            unit: None,
            stock: Some(0),
        },
    ]
}

#[derive(Debug, Default)]
struct Recorded {
    catalog_requests: usize,
    request_ids: Vec<String>,
    orders: Vec<Order>,
    fail_orders: bool,
}

#[derive(Clone)]
struct FakeState {
    catalog: Arc<[CatalogProduct]>,
    recorded: Arc<Mutex<Recorded>>,
}

impl FakeState {
    fn with<R>(&self, f: impl FnOnce(&mut Recorded) -> R) -> R {
        f(&mut self.recorded.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn record_request(&self, headers: &HeaderMap) {
        if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
            let id = id.to_string();
            self.with(|r| r.request_ids.push(id));
        }
    }
}

/// Handle to a running fake marketplace API.
#[derive(Clone)]
pub struct FakeMarketplace {
    addr: SocketAddr,
    state: FakeState,
}

impl FakeMarketplace {
    /// Start the fake API on a random port with the seeded catalog.
    ///
    /// # Panics
    ///
    /// Panics if no localhost port can be bound.
    pub async fn start() -> Self {
        let state = FakeState {
            catalog: seed_catalog().into(),
            recorded: Arc::new(Mutex::new(Recorded::default())),
        };

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/products", get(list_products))
            .route("/api/products/{id}", get(get_product))
            .route("/api/orders", get(list_orders).post(place_order))
            .route("/api/orders/{id}", get(get_order))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake marketplace");
        let addr = listener
            .local_addr()
            .expect("Failed to read fake marketplace address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    /// Base URL of the fake API (`http://127.0.0.1:<port>/api/`).
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api/", self.addr)
    }

    /// Client configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected, which would be a bug in the fake.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.base_url()).expect("fake base URL is valid")
    }

    /// Number of catalog endpoint hits so far.
    #[must_use]
    pub fn catalog_requests(&self) -> usize {
        self.state.with(|r| r.catalog_requests)
    }

    /// Every `X-Request-Id` header received, in order.
    #[must_use]
    pub fn request_ids(&self) -> Vec<String> {
        self.state.with(|r| r.request_ids.clone())
    }

    /// Orders accepted so far.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.state.with(|r| r.orders.clone())
    }

    /// Make `POST orders` answer 503 until switched back.
    pub fn fail_orders(&self, fail: bool) {
        self.state.with(|r| r.fail_orders = fail);
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TEST_TOKEN}"))
}

fn auth_body(name: &str, email: &str, role: &str, city: Option<&str>) -> Value {
    json!({
        "token": TEST_TOKEN,
        "user": {
            "id": 7,
            "name": name,
            "email": email,
            "role": role,
            "city": city,
            "street": "Ward 4",
            "mobile": "9800000000"
        }
    })
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<LoginBody>,
) -> Result<Json<Value>, StatusCode> {
    state.record_request(&headers);
    if body.email == TEST_EMAIL && body.password == TEST_PASSWORD {
        Ok(Json(auth_body("Ravi", TEST_EMAIL, "farmer", Some("Mandya"))))
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

#[derive(Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    role: String,
    city: Option<String>,
}

async fn register(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<RegisterBody>,
) -> Result<Json<Value>, (StatusCode, String)> {
    state.record_request(&headers);
    if body.email == TEST_EMAIL {
        return Err((StatusCode::CONFLICT, "email already registered".to_string()));
    }
    Ok(Json(auth_body(&body.name, &body.email, &body.role, body.city.as_deref())))
}

async fn list_products(
    State(state): State<FakeState>,
    headers: HeaderMap,
) -> Json<Vec<CatalogProduct>> {
    state.record_request(&headers);
    state.with(|r| r.catalog_requests += 1);
    Json(state.catalog.to_vec())
}

async fn get_product(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<CatalogProduct>, StatusCode> {
    state.record_request(&headers);
    state.with(|r| r.catalog_requests += 1);
    state
        .catalog
        .iter()
        .find(|p| p.id.as_i64() == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewOrder {
    items: Vec<NewOrderItem>,
    payment_method: PaymentMethod,
    shipping_address: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewOrderItem {
    product_id: ProductId,
    quantity: u32,
}

async fn place_order(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>), (StatusCode, String)> {
    state.record_request(&headers);
    if !authorized(&headers) {
        return Err((StatusCode::UNAUTHORIZED, String::new()));
    }
    if state.with(|r| r.fail_orders) {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "order service down".to_string(),
        ));
    }

    // Price from the catalog, not from the client.
    let mut items = Vec::with_capacity(body.items.len());
    for item in &body.items {
        let Some(product) = state.catalog.iter().find(|p| p.id == item.product_id) else {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("unknown product {}", item.product_id),
            ));
        };
        items.push(OrderItem {
            product_id: product.id,
            display_name: product.display_name.clone(),
            quantity: item.quantity,
            unit_price: product.unit_price,
        });
    }
    let total: Decimal = items
        .iter()
        .map(|i| i.unit_price * Decimal::from(i.quantity))
        .sum();

    let order = state.with(|r| {
        let next = i64::try_from(r.orders.len()).unwrap_or(i64::MAX - 100) + 100;
        let order = Order {
            id: OrderId::new(next),
            items,
            total,
            status: OrderStatus::Placed,
            payment_method: body.payment_method,
            shipping_address: body.shipping_address,
            created_at: Some(chrono::Utc::now()),
        };
        r.orders.push(order.clone());
        order
    });

    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_orders(
    State(state): State<FakeState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Order>>, StatusCode> {
    state.record_request(&headers);
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(state.with(|r| r.orders.clone())))
}

async fn get_order(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Order>, StatusCode> {
    state.record_request(&headers);
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    state
        .with(|r| r.orders.iter().find(|o| o.id.as_i64() == id).cloned())
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
