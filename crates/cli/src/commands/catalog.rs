//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! # List all products
//! mm-cli products
//!
//! # Show one product
//! mm-cli product 12
//! ```

#![allow(clippy::print_stdout)]

use millet_market_client::{AppContext, Result};
use millet_market_core::ProductId;

use crate::render;

/// Print the product list.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched.
pub async fn list(ctx: &AppContext, refresh: bool) -> Result<()> {
    if refresh {
        ctx.api().invalidate_catalog();
    }
    let products = ctx.api().list_products().await?;
    print!("{}", render::product_table(&products));
    Ok(())
}

/// Print one product.
///
/// # Errors
///
/// Returns an error if the product does not exist or cannot be fetched.
pub async fn show(ctx: &AppContext, id: ProductId) -> Result<()> {
    let product = ctx.api().get_product(id).await?;
    print!("{}", render::product_detail(&product));
    Ok(())
}
