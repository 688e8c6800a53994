//! Cart error types.

use millet_market_core::ProductId;
use thiserror::Error;

/// Errors returned by the checked cart operations.
///
/// The plain `remove_item`/`update_quantity` calls never fail; only
/// `add_item` and the `try_*` variants surface these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantity must be at least 1.
    #[error("quantity must be at least 1 (got {0})")]
    InvalidQuantity(u32),

    /// Adding would push a line past `u32::MAX` units.
    #[error("quantity for product {product_id} would overflow")]
    QuantityOverflow {
        /// Product whose line would overflow.
        product_id: ProductId,
    },

    /// No line exists for the product.
    #[error("product {0} is not in the cart")]
    ProductNotFound(ProductId),
}
