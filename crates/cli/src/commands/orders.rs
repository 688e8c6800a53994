//! Order history and tracking commands.
//!
//! # Usage
//!
//! ```bash
//! # List your orders
//! mm-cli orders
//!
//! # Track one order
//! mm-cli order 31
//! ```

#![allow(clippy::print_stdout)]

use millet_market_client::{AppContext, Result};
use millet_market_core::OrderId;

use crate::render;

/// Print the signed-in user's orders.
///
/// # Errors
///
/// Returns an error if nobody is signed in or the request fails.
pub async fn list(ctx: &AppContext) -> Result<()> {
    let orders = ctx.api().list_orders().await?;
    print!("{}", render::order_list(&orders));
    Ok(())
}

/// Print one order with its tracking timeline.
///
/// # Errors
///
/// Returns an error if the order does not exist or the request fails.
pub async fn track(ctx: &AppContext, id: OrderId) -> Result<()> {
    let order = ctx.api().get_order(id).await?;
    print!("{}", render::order_tracking(&order));
    Ok(())
}
