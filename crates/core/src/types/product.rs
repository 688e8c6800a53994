//! Catalog product records as served by the marketplace API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// Supplier label used when a product record carries no supplier name.
pub const DEFAULT_SUPPLIER_NAME: &str = "SHG";

/// A product listed in the remote catalog.
///
/// Only `id`, `displayName` and `unitPrice` are required; the API omits the
/// rest for some listings. `unitPrice` is accepted either as a JSON number or
/// as a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub id: ProductId,
    #[serde(alias = "name")]
    pub display_name: String,
    #[serde(alias = "price")]
    pub unit_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Millet variety or product group, e.g. "Foxtail" or "Ragi flour".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Selling unit, e.g. "kg".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl CatalogProduct {
    /// Supplier label, falling back to [`DEFAULT_SUPPLIER_NAME`] when the
    /// record has none (or only whitespace).
    #[must_use]
    pub fn supplier_or_default(&self) -> &str {
        self.supplier_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SUPPLIER_NAME)
    }

    /// Whether the listing reports stock and that stock is zero.
    #[must_use]
    pub fn is_out_of_stock(&self) -> bool {
        self.stock == Some(0)
    }
}
