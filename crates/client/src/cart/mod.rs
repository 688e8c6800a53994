//! In-process cart state.
//!
//! [`CartManager`] is the single source of truth for the pending order during
//! a session. It is an ordinary owned value: whoever constructs it (normally
//! [`crate::AppContext`]) decides its lifetime, and every mutation goes
//! through `&mut self`, so the borrow checker enforces the single owner.
//!
//! # Observing changes
//!
//! Every effective mutation builds a new immutable [`CartSnapshot`] and
//! publishes it before the call returns:
//!
//! - [`CartManager::subscribe`] hands out a `tokio::sync::watch` receiver that
//!   always holds the latest snapshot;
//! - [`CartManager::subscribe_fn`] registers a callback invoked synchronously,
//!   in registration order, on the mutating thread.
//!
//! Calls that leave the cart unchanged (removing an absent product, setting a
//! quantity of 0) publish nothing.
//!
//! # Example
//!
//! ```rust
//! use millet_market_client::cart::CartManager;
//! use millet_market_core::{CatalogProduct, ProductId};
//! use rust_decimal::Decimal;
//!
//! let foxtail = CatalogProduct {
//!     id: ProductId::new(1),
//!     display_name: "Foxtail".to_string(),
//!     unit_price: Decimal::new(50, 0),
//!     supplier_name: None,
//!     image_url: None,
//!     category: None,
//!     unit: None,
//!     stock: None,
//! };
//!
//! let mut cart = CartManager::new();
//! cart.add_item(&foxtail, 2, "foxtail.png").unwrap();
//! cart.add_item(&foxtail, 3, "foxtail.png").unwrap();
//!
//! assert_eq!(cart.len(), 1);
//! assert_eq!(cart.subtotal(), Decimal::new(250, 0));
//! ```

mod error;
mod line;

pub use error::CartError;
pub use line::{CartLine, CartSnapshot};

use millet_market_core::{CatalogProduct, ProductId};
use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::debug;

/// Handle returned by [`CartManager::subscribe_fn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&CartSnapshot) + Send>;

/// Owner of the cart lines.
pub struct CartManager {
    lines: Vec<CartLine>,
    revision: u64,
    sender: watch::Sender<CartSnapshot>,
    callbacks: Vec<(SubscriptionId, Callback)>,
    next_subscription: u64,
}

impl std::fmt::Debug for CartManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("lines", &self.lines)
            .field("revision", &self.revision)
            .field("callbacks", &self.callbacks.len())
            .finish_non_exhaustive()
    }
}

impl Default for CartManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CartManager {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(CartSnapshot::empty());
        Self {
            lines: Vec::new(),
            revision: 0,
            sender,
            callbacks: Vec::new(),
            next_subscription: 0,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of `product`.
    ///
    /// If the product already has a line its quantity grows and the captured
    /// name, price and supplier stay as they were. Otherwise a new line is
    /// appended, capturing them from `product` now.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`] when `quantity` is 0
    /// - [`CartError::QuantityOverflow`] when the line would exceed `u32::MAX`
    ///
    /// The cart is unchanged on error.
    pub fn add_item(
        &mut self,
        product: &CatalogProduct,
        quantity: u32,
        image_reference: impl Into<String>,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        if let Some(line) = self.line_mut(product.id) {
            line.quantity = line
                .quantity
                .checked_add(quantity)
                .ok_or(CartError::QuantityOverflow {
                    product_id: product.id,
                })?;
            debug!(product_id = %product.id, quantity = line.quantity, "Cart line incremented");
        } else {
            self.lines.push(CartLine::from_product(
                product,
                quantity,
                image_reference.into(),
            ));
            debug!(product_id = %product.id, quantity, "Cart line added");
        }

        self.publish();
        Ok(())
    }

    /// Remove the line for `product_id`. Returns whether a line was removed;
    /// an absent product is not an error.
    pub fn remove_item(&mut self, product_id: ProductId) -> bool {
        self.take_line(product_id).is_some()
    }

    /// Like [`Self::remove_item`] but reports an absent product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ProductNotFound`] if no line exists for the product.
    pub fn try_remove_item(&mut self, product_id: ProductId) -> Result<CartLine, CartError> {
        self.take_line(product_id)
            .ok_or(CartError::ProductNotFound(product_id))
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of 0 is ignored and keeps the line as it is; use
    /// [`Self::remove_item`] to drop a line. Returns whether the cart changed.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return false;
        }
        let Some(line) = self.line_mut(product_id) else {
            return false;
        };
        if line.quantity == quantity {
            return false;
        }

        line.quantity = quantity;
        debug!(%product_id, quantity, "Cart line quantity updated");
        self.publish();
        true
    }

    /// Like [`Self::update_quantity`] but reports rejected input.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`] when `quantity` is 0
    /// - [`CartError::ProductNotFound`] when the product has no line
    pub fn try_update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        if self.line(product_id).is_none() {
            return Err(CartError::ProductNotFound(product_id));
        }
        self.update_quantity(product_id, quantity);
        Ok(())
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        let removed = self.lines.len();
        if removed == 0 {
            return;
        }
        self.lines.clear();
        debug!(removed, "Cart cleared");
        self.publish();
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Exact sum of `unit_price * quantity`; zero for an empty cart.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        line::subtotal_of(&self.lines)
    }

    /// The most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.sender.borrow().clone()
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Receiver that always holds the latest snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.sender.subscribe()
    }

    /// Register a callback run synchronously after every effective mutation.
    pub fn subscribe_fn<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&CartSnapshot) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Drop a callback. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sub, _)| *sub != id);
        self.callbacks.len() != before
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }

    fn take_line(&mut self, product_id: ProductId) -> Option<CartLine> {
        let index = self.lines.iter().position(|l| l.product_id == product_id)?;
        let line = self.lines.remove(index);
        debug!(%product_id, "Cart line removed");
        self.publish();
        Some(line)
    }

    fn publish(&mut self) {
        self.revision += 1;
        let snapshot = CartSnapshot::new(self.revision, &self.lines);
        self.sender.send_replace(snapshot.clone());
        for (_, callback) in &mut self.callbacks {
            callback(&snapshot);
        }
    }
}
