//! Core types for Millet Market.
//!
//! This module provides type-safe wrappers for common marketplace concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod role;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use product::{CatalogProduct, DEFAULT_SUPPLIER_NAME};
pub use role::{ParseRoleError, UserRole};
pub use status::*;
