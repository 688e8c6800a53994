//! Request and response bodies for the marketplace REST API.
//!
//! The API speaks camelCase JSON. Decimal amounts are serialized as strings
//! and accepted as either strings or numbers.

use chrono::{DateTime, Utc};
use millet_market_core::{OrderId, OrderStatus, PaymentMethod, ProductId, UserId, UserRole};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

// =============================================================================
// Auth
// =============================================================================

/// Credentials for `POST auth/login`.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// New account details for `POST auth/register`.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub role: UserRole,
    pub city: Option<String>,
    pub street: Option<String>,
    pub mobile: Option<String>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .field("city", &self.city)
            .field("street", &self.street)
            .field("mobile", &self.mobile)
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<&'a str>,
}

impl<'a> From<&'a Registration> for RegisterRequest<'a> {
    fn from(r: &'a Registration) -> Self {
        Self {
            name: &r.name,
            email: &r.email,
            password: r.password.expose_secret(),
            role: r.role,
            city: r.city.as_deref(),
            street: r.street.as_deref(),
            mobile: r.mobile.as_deref(),
        }
    }
}

/// Successful login or registration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Profile of the signed-in user.
///
/// `role` stays a string here; the API has used several spellings for the
/// SHG/FPO role and the session keeps whatever it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub id: Option<UserId>,
    #[serde(alias = "userName")]
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub mobile: Option<String>,
}

// =============================================================================
// Orders
// =============================================================================

/// One line of a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Body of `POST orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<OrderItemRequest>,
    /// Client-side subtotal; the server recomputes and may reject a mismatch.
    pub subtotal: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
}

/// A line on a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    #[serde(default, alias = "name")]
    pub display_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// An order as stored by the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Sum of item quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}
