//! Turning the cart into an order.

use millet_market_core::PaymentMethod;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError, Order, OrderItemRequest, OrderRequest};
use crate::cart::{CartManager, CartSnapshot};
use crate::session::Session;

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// No token in the session.
    #[error("sign in before placing an order")]
    NotAuthenticated,

    /// The API rejected the order or was unreachable. The cart is untouched.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Build the request body for the current cart contents.
#[must_use]
pub fn order_request(
    cart: &CartSnapshot,
    payment_method: PaymentMethod,
    shipping_address: Option<String>,
) -> OrderRequest {
    OrderRequest {
        items: cart
            .lines()
            .iter()
            .map(|line| OrderItemRequest {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect(),
        subtotal: cart.subtotal(),
        payment_method,
        shipping_address,
    }
}

/// Place an order for everything in the cart.
///
/// The cart is cleared only once the API has accepted the order; on any
/// error it is left as it was.
///
/// # Errors
///
/// - `CheckoutError::EmptyCart` when the cart has no lines
/// - `CheckoutError::NotAuthenticated` when the session has no token
/// - `CheckoutError::Api` when the request fails
#[instrument(skip(api, cart, session), fields(lines = cart.len()))]
pub async fn place_order(
    api: &ApiClient,
    cart: &mut CartManager,
    session: &Session,
    payment_method: PaymentMethod,
) -> Result<Order, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    if !session.is_authenticated() {
        return Err(CheckoutError::NotAuthenticated);
    }

    let request = order_request(&cart.snapshot(), payment_method, session.shipping_address());
    let order = match api.place_order(&request).await {
        Ok(order) => order,
        Err(e) => {
            warn!(error = %e, "Order rejected, cart kept");
            return Err(e.into());
        }
    };

    if order.total != request.subtotal {
        warn!(
            order_id = %order.id,
            client_subtotal = %request.subtotal,
            server_total = %order.total,
            "Server total differs from cart subtotal"
        );
    }

    cart.clear();
    info!(order_id = %order.id, total = %order.total, "Order placed");
    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use millet_market_core::{CatalogProduct, ProductId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::config::ClientConfig;

    fn millet(id: i64, price: i64) -> CatalogProduct {
        CatalogProduct {
            id: ProductId::new(id),
            display_name: format!("Millet {id}"),
            unit_price: Decimal::new(price, 0),
            supplier_name: None,
            image_url: None,
            category: None,
            unit: None,
            stock: None,
        }
    }

    fn offline_api() -> ApiClient {
        ApiClient::new(&ClientConfig::new("http://127.0.0.1:9").unwrap()).unwrap()
    }

    #[test]
    fn test_order_request_mirrors_snapshot() {
        let mut cart = CartManager::new();
        cart.add_item(&millet(1, 50), 2, "").unwrap();
        cart.add_item(&millet(2, 30), 1, "").unwrap();

        let request = order_request(
            &cart.snapshot(),
            PaymentMethod::Card,
            Some("Ward 4, Anantapur".to_string()),
        );

        assert_eq!(request.items.len(), 2);
        assert_eq!(request.items[0].product_id, ProductId::new(1));
        assert_eq!(request.items[0].quantity, 2);
        assert_eq!(request.subtotal, Decimal::new(130, 0));
        assert_eq!(request.shipping_address.as_deref(), Some("Ward 4, Anantapur"));
    }

    #[tokio::test]
    async fn test_empty_cart_refused() {
        let mut cart = CartManager::new();
        let session = Session {
            token: Some("jwt".to_string()),
            ..Session::default()
        };

        let err = place_order(&offline_api(), &mut cart, &session, PaymentMethod::Upi)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[tokio::test]
    async fn test_anonymous_checkout_refused_and_cart_kept() {
        let mut cart = CartManager::new();
        cart.add_item(&millet(1, 50), 1, "").unwrap();

        let err = place_order(
            &offline_api(),
            &mut cart,
            &Session::default(),
            PaymentMethod::Upi,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CheckoutError::NotAuthenticated));
        assert_eq!(cart.len(), 1);
    }
}
