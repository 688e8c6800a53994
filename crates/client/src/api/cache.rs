//! Cache types for catalog responses.

use std::sync::Arc;

use millet_market_core::{CatalogProduct, ProductId};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<[CatalogProduct]>),
    Product(Box<CatalogProduct>),
}
