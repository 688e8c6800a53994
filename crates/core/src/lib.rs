//! Millet Market Core - Shared types library.
//!
//! This crate provides the domain types shared by every Millet Market component:
//! - `client` - Cart state, session store and marketplace API client
//! - `cli` - Command-line front end (catalog, cart shell, orders)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! persistence. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, emails, roles, statuses and catalog products

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
