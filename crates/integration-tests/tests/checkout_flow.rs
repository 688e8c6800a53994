//! Integration tests for the sign-in, cart and checkout flow.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use millet_market_client::services::CheckoutError;
use millet_market_client::{ApiError, AppContext, AppError, MemorySessionStore};
use millet_market_core::{OrderStatus, PaymentMethod, ProductId, UserRole};
use millet_market_integration_tests::{FakeMarketplace, TEST_EMAIL, TEST_PASSWORD};
use rust_decimal::Decimal;
use secrecy::SecretString;

async fn setup() -> (FakeMarketplace, AppContext) {
    let server = FakeMarketplace::start().await;
    let ctx = AppContext::new(server.config(), Box::new(MemorySessionStore::new("test")))
        .await
        .unwrap();
    (server, ctx)
}

async fn sign_in(ctx: &AppContext) {
    ctx.login(TEST_EMAIL, &SecretString::from(TEST_PASSWORD))
        .await
        .unwrap();
}

async fn fill_cart(ctx: &mut AppContext) {
    let foxtail = ctx.api().get_product(ProductId::new(1)).await.unwrap();
    ctx.cart_mut().add_item(&foxtail, 2, "").unwrap();
    ctx.cart_mut().update_quantity(ProductId::new(1), 5);
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_login_stores_session() {
    let (_server, ctx) = setup().await;

    sign_in(&ctx).await;

    let session = ctx.session().unwrap();
    assert!(session.is_authenticated());
    assert_eq!(session.user_name.as_deref(), Some("Ravi"));
    assert_eq!(session.role(), Some(UserRole::Farmer));
    assert!(ctx.api().has_token().await);
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let (_server, ctx) = setup().await;

    let err = ctx
        .login(TEST_EMAIL, &SecretString::from("wrong"))
        .await
        .unwrap_err();

    assert!(err.needs_login());
    assert!(!ctx.session().unwrap().is_authenticated());
    assert!(!ctx.api().has_token().await);
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_places_order_and_clears_cart() {
    let (server, mut ctx) = setup().await;
    sign_in(&ctx).await;
    fill_cart(&mut ctx).await;
    assert_eq!(ctx.cart().subtotal(), Decimal::new(250, 0));

    let order = ctx.checkout(PaymentMethod::Upi).await.unwrap();

    assert_eq!(order.total, Decimal::new(250, 0));
    assert_eq!(order.status, OrderStatus::Placed);
    assert_eq!(order.payment_method, PaymentMethod::Upi);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 5);
    assert_eq!(order.shipping_address.as_deref(), Some("Ward 4, Mandya"));
    assert!(ctx.cart().is_empty());
    assert_eq!(server.orders().len(), 1);
}

#[tokio::test]
async fn test_placed_orders_can_be_listed_and_tracked() {
    let (_server, mut ctx) = setup().await;
    sign_in(&ctx).await;
    fill_cart(&mut ctx).await;
    let placed = ctx.checkout(PaymentMethod::CashOnDelivery).await.unwrap();

    let orders = ctx.api().list_orders().await.unwrap();
    let tracked = ctx.api().get_order(placed.id).await.unwrap();

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, placed.id);
    assert_eq!(tracked.total, placed.total);
    assert_eq!(tracked.item_count(), 5);
}

#[tokio::test]
async fn test_failed_order_keeps_cart() {
    let (server, mut ctx) = setup().await;
    sign_in(&ctx).await;
    fill_cart(&mut ctx).await;
    server.fail_orders(true);

    let err = ctx.checkout(PaymentMethod::Card).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Checkout(CheckoutError::Api(ApiError::Status { status: 503, .. }))
    ));
    assert_eq!(ctx.cart().item_count(), 5);
    assert!(server.orders().is_empty());

    server.fail_orders(false);
    ctx.checkout(PaymentMethod::Card).await.unwrap();
    assert!(ctx.cart().is_empty());
}

#[tokio::test]
async fn test_checkout_requires_sign_in() {
    let (server, mut ctx) = setup().await;
    fill_cart(&mut ctx).await;

    let err = ctx.checkout(PaymentMethod::Upi).await.unwrap_err();

    assert!(matches!(err, AppError::Checkout(CheckoutError::NotAuthenticated)));
    assert!(err.needs_login());
    assert_eq!(ctx.cart().len(), 1);
    assert!(server.orders().is_empty());
}

#[tokio::test]
async fn test_empty_cart_is_not_sent() {
    let (server, mut ctx) = setup().await;
    sign_in(&ctx).await;

    let err = ctx.checkout(PaymentMethod::Upi).await.unwrap_err();

    assert!(matches!(err, AppError::Checkout(CheckoutError::EmptyCart)));
    assert!(server.orders().is_empty());
}

#[tokio::test]
async fn test_logout_revokes_access_but_keeps_cart() {
    let (_server, mut ctx) = setup().await;
    sign_in(&ctx).await;
    fill_cart(&mut ctx).await;

    ctx.logout().await.unwrap();

    assert!(!ctx.session().unwrap().is_authenticated());
    assert!(!ctx.cart().is_empty());
    let err = ctx.api().list_orders().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
}
