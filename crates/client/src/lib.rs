//! Millet Market client library.
//!
//! Client-side state and plumbing for the millet marketplace: the cart that
//! screens render and edit, the persisted sign-in session, and the REST client
//! for catalog, auth and orders.
//!
//! # Modules
//!
//! - [`cart`] - In-process cart state with synchronous change notification
//! - [`session`] - Namespaced persistence of token and profile fields
//! - [`api`] - Marketplace REST API client with catalog caching
//! - [`services`] - Login/logout and checkout flows
//! - [`config`] - Environment-driven configuration
//! - [`state`] - [`AppContext`], which owns all of the above for one run

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod state;

pub use api::{ApiClient, ApiError};
pub use cart::{CartError, CartLine, CartManager, CartSnapshot};
pub use config::{ClientConfig, ConfigError};
pub use error::{AppError, Result};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionError, SessionStore};
pub use state::AppContext;
