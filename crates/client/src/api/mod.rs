//! Marketplace REST API client.
//!
//! # Architecture
//!
//! - `reqwest` with connect/request timeouts from [`ClientConfig`]
//! - Every request carries an `X-Request-Id` header, plus a bearer token once
//!   the user has signed in
//! - Catalog reads are cached in memory via `moka` (TTL from config)
//! - Orders and auth calls are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use millet_market_client::{ApiClient, ClientConfig};
//!
//! let client = ApiClient::new(&ClientConfig::from_env()?)?;
//! let products = client.list_products().await?;
//! ```

mod cache;
pub mod types;

pub use types::*;

use std::sync::Arc;

use millet_market_core::{CatalogProduct, Email, OrderId, ProductId};
use moka::future::Cache;
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, instrument};
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use cache::{CacheKey, CacheValue};

/// Header carrying the per-request correlation ID.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

const USER_AGENT: &str = concat!("millet-market/", env!("CARGO_PKG_VERSION"));
const CACHE_CAPACITY: u64 = 1000;
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Errors that can occur when calling the marketplace API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connect, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint path could not be joined onto the base URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Missing, expired or rejected credentials (401/403).
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API (429).
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("API returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the marketplace REST API.
///
/// Cheap to clone; clones share the HTTP connection pool, the token and the
/// catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client without a token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built (e.g. the
    /// TLS backend fails to initialise).
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
                token: RwLock::new(None),
                cache,
            }),
        })
    }

    /// Base URL all endpoint paths are joined onto.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // =========================================================================
    // Token
    // =========================================================================

    /// Set the bearer token sent with every request.
    pub async fn set_token(&self, token: SecretString) {
        *self.inner.token.write().await = Some(token);
    }

    /// Stop sending a bearer token.
    pub async fn clear_token(&self) {
        *self.inner.token.write().await = None;
    }

    /// Whether a token is set.
    pub async fn has_token(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange email and password for a token and profile.
    ///
    /// Does not install the token; see [`crate::services::auth::login`].
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for bad credentials, or any transport
    /// or parse error.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        let body = types::LoginRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        self.post("auth/login", &body).await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` when the API rejects the registration (e.g.
    /// duplicate email), or any transport or parse error.
    #[instrument(skip(self, registration), fields(email = %registration.email, role = %registration.role))]
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        self.post("auth/register", &types::RegisterRequest::from(registration))
            .await
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// All listed products (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<[CatalogProduct]>, ApiError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!(count = products.len(), "Catalog cache hit");
            return Ok(products);
        }

        let products: Vec<CatalogProduct> = self.get("products").await?;
        let products: Arc<[CatalogProduct]> = products.into();
        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;

        debug!(count = products.len(), "Catalog fetched");
        Ok(products)
    }

    /// A single product (cached).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<CatalogProduct, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Product cache hit");
            return Ok(*product);
        }

        let product: CatalogProduct = self.get(&format!("products/{id}")).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Drop all cached catalog responses.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without a valid token, or any
    /// transport, status or parse error.
    #[instrument(skip(self, order), fields(items = order.items.len(), payment = %order.payment_method))]
    pub async fn place_order(&self, order: &OrderRequest) -> Result<Order, ApiError> {
        self.post("orders", order).await
    }

    /// Orders of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without a valid token, or any
    /// transport, status or parse error.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get("orders").await
    }

    /// A single order, for tracking.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the order does not exist.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.get(&format!("orders/{id}")).await
    }

    // =========================================================================
    // Transport
    // =========================================================================

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.inner.base_url.join(path)?;
        self.execute(path, self.inner.client.get(url)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.inner.base_url.join(path)?;
        self.execute(path, self.inner.client.post(url).json(body))
            .await
    }

    /// Attach headers, send, map the status and parse the JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let request_id = Uuid::new_v4();
        let mut request = request.header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(token) = self.inner.token.read().await.as_ref() {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;
        debug!(%request_id, %status, path, "API response");

        if let Some(err) = status_error(status, retry_after, path, &body) {
            if matches!(err, ApiError::Status { .. }) {
                error!(
                    %request_id,
                    %status,
                    body = %truncate(&body, 500),
                    "API returned non-success status"
                );
            }
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(
                %request_id,
                error = %e,
                body = %truncate(&body, 500),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }
}

/// Map a non-success status to its error; `None` for 2xx.
fn status_error(
    status: StatusCode,
    retry_after: Option<u64>,
    path: &str,
    body: &str,
) -> Option<ApiError> {
    if status.is_success() {
        return None;
    }

    Some(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound(path.to_string()),
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(retry_after.unwrap_or(1)),
        _ => ApiError::Status {
            status: status.as_u16(),
            body: truncate(body, MAX_ERROR_BODY_CHARS),
        },
    })
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
