//! Flows that span the API client, the session store and the cart.

pub mod auth;
pub mod checkout;

pub use auth::AuthError;
pub use checkout::CheckoutError;
