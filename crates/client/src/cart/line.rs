//! Cart lines and immutable cart snapshots.

use std::sync::Arc;

use millet_market_core::{CatalogProduct, Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product entry in the cart.
///
/// Name, price and supplier are captured when the product is first added and
/// are not refreshed from the catalog afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub display_name: String,
    pub unit_price: Decimal,
    /// Always at least 1; a line that would reach 0 is removed instead.
    pub quantity: u32,
    pub image_reference: String,
    pub supplier_name: String,
}

impl CartLine {
    /// Capture a new line from a catalog record.
    pub(crate) fn from_product(
        product: &CatalogProduct,
        quantity: u32,
        image_reference: String,
    ) -> Self {
        Self {
            product_id: product.id,
            display_name: product.display_name.clone(),
            unit_price: product.unit_price,
            quantity,
            image_reference,
            supplier_name: product.supplier_or_default().to_string(),
        }
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Read-only view of the cart at one point in time.
///
/// Snapshots are cheap to clone (the lines are shared) and never change after
/// they are published; each effective mutation of the cart publishes a new one
/// with a higher `revision`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSnapshot {
    revision: u64,
    lines: Arc<[CartLine]>,
    subtotal: Decimal,
    item_count: u64,
}

impl CartSnapshot {
    pub(crate) fn new(revision: u64, lines: &[CartLine]) -> Self {
        Self {
            revision,
            lines: Arc::from(lines),
            subtotal: subtotal_of(lines),
            item_count: lines.iter().map(|l| u64::from(l.quantity)).sum(),
        }
    }

    /// The empty cart at revision 0.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(0, &[])
    }

    /// Mutation counter; 0 for a freshly created cart.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Line for a product, if present.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    #[must_use]
    pub const fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Subtotal formatted for display in rupees.
    #[must_use]
    pub const fn subtotal_price(&self) -> Price {
        Price::inr(self.subtotal)
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub const fn item_count(&self) -> u64 {
        self.item_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for CartSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

pub(crate) fn subtotal_of(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::line_total).sum()
}
