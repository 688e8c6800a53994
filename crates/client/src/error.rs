//! Unified error handling.
//!
//! Each concern keeps its own error enum; `AppError` gathers them for callers
//! (the CLI) that just want to report whatever went wrong.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::CartError;
use crate::config::ConfigError;
use crate::services::{AuthError, CheckoutError};
use crate::session::SessionError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration failed to load.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Marketplace API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Cart operation rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Sign-in or sign-out failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order placement failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

impl AppError {
    /// Whether signing in again could fix this error.
    #[must_use]
    pub const fn needs_login(&self) -> bool {
        matches!(
            self,
            Self::Api(ApiError::Unauthorized)
                | Self::Auth(AuthError::Api(ApiError::Unauthorized))
                | Self::Checkout(
                    CheckoutError::NotAuthenticated | CheckoutError::Api(ApiError::Unauthorized)
                )
        )
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use millet_market_core::ProductId;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::from(CartError::ProductNotFound(ProductId::new(4)));
        assert_eq!(err.to_string(), "Cart error: product 4 is not in the cart");

        let err = AppError::from(ApiError::NotFound("orders/8".to_string()));
        assert_eq!(err.to_string(), "API error: Not found: orders/8");
    }

    #[test]
    fn test_needs_login() {
        assert!(AppError::from(ApiError::Unauthorized).needs_login());
        assert!(AppError::from(CheckoutError::NotAuthenticated).needs_login());
        assert!(AppError::from(CheckoutError::Api(ApiError::Unauthorized)).needs_login());
        assert!(!AppError::from(CheckoutError::EmptyCart).needs_login());
        assert!(!AppError::from(ApiError::RateLimited(5)).needs_login());
    }
}
