//! Sign-in, registration and sign-out.
//!
//! A successful login writes the token and profile fields to the session
//! store and installs the token on the API client; logout undoes both.

use millet_market_core::{Email, EmailError};
use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, instrument};

use crate::api::{ApiClient, ApiError, AuthResponse, Registration};
use crate::session::{Session, SessionError, SessionStore};

/// Errors from authentication flows.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email failed validation before any request was sent.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The API rejected the request or was unreachable.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session could not be persisted.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Sign in and persist the session.
///
/// # Errors
///
/// Returns `AuthError::InvalidEmail` for a malformed email,
/// `AuthError::Api(ApiError::Unauthorized)` for rejected credentials, or
/// `AuthError::Session` if the session cannot be saved.
#[instrument(skip(api, store, password))]
pub async fn login(
    api: &ApiClient,
    store: &dyn SessionStore,
    email: &str,
    password: &SecretString,
) -> Result<Session, AuthError> {
    let email = Email::parse(email)?;
    let response = api.login(&email, password).await?;
    let session = establish(api, store, response).await?;

    info!(email = %email, role = ?session.role, "Signed in");
    Ok(session)
}

/// Create an account and sign in with it.
///
/// # Errors
///
/// Returns `AuthError::InvalidEmail` for a malformed email, `AuthError::Api`
/// if the API rejects the registration, or `AuthError::Session` if the
/// session cannot be saved.
#[instrument(skip(api, store, registration), fields(email = %registration.email))]
pub async fn register(
    api: &ApiClient,
    store: &dyn SessionStore,
    registration: &Registration,
) -> Result<Session, AuthError> {
    Email::parse(&registration.email)?;
    let response = api.register(registration).await?;
    let session = establish(api, store, response).await?;

    info!(role = %registration.role, "Account registered");
    Ok(session)
}

/// Forget the token and every stored profile field.
///
/// # Errors
///
/// Returns `AuthError::Session` if the stored session cannot be removed. The
/// API client's token is cleared either way.
#[instrument(skip(api, store))]
pub async fn logout(api: &ApiClient, store: &dyn SessionStore) -> Result<(), AuthError> {
    api.clear_token().await;
    store.clear()?;
    info!("Signed out");
    Ok(())
}

/// Persist the session first so a failed save leaves the client signed out.
async fn establish(
    api: &ApiClient,
    store: &dyn SessionStore,
    response: AuthResponse,
) -> Result<Session, AuthError> {
    let session = session_from_auth(response);
    store.save(&session)?;
    if let Some(token) = session.bearer_token() {
        api.set_token(token).await;
    }
    Ok(session)
}

/// Map an auth response onto the persisted session fields.
#[must_use]
pub fn session_from_auth(response: AuthResponse) -> Session {
    let user = response.user;
    Session {
        token: Some(response.token),
        user_name: user.name,
        email: user.email,
        role: user.role,
        city: user.city,
        street: user.street,
        mobile: user.mobile,
    }
}
