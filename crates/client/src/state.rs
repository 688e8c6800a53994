//! Application context owned by the front end.

use millet_market_core::PaymentMethod;
use secrecy::SecretString;
use tracing::{debug, instrument};

use crate::api::{ApiClient, Order, Registration};
use crate::cart::CartManager;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::services::{auth, checkout};
use crate::session::{FileSessionStore, Session, SessionStore};

/// Everything a session of the app needs: configuration, the API client, the
/// cart and the session store.
///
/// The context is created once at startup and owned by the front end; the
/// cart lives and dies with it.
pub struct AppContext {
    config: ClientConfig,
    api: ApiClient,
    cart: CartManager,
    session: Box<dyn SessionStore>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("api", &self.api)
            .field("cart", &self.cart)
            .field("session_namespace", &self.session.namespace())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build a context with an explicit session store.
    ///
    /// A token already present in the store is installed on the API client,
    /// so a previous sign-in carries over.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the stored
    /// session cannot be read.
    #[instrument(skip_all, fields(namespace = %session.namespace()))]
    pub async fn new(config: ClientConfig, session: Box<dyn SessionStore>) -> Result<Self> {
        let api = ApiClient::new(&config)?;

        if let Some(token) = session.load()?.bearer_token() {
            api.set_token(token).await;
            debug!("Restored session token");
        }

        Ok(Self {
            config,
            api,
            cart: CartManager::new(),
            session,
        })
    }

    /// Build a context persisting the session under the configured directory.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the session namespace is not a plain file
    /// name; otherwise see [`Self::new`].
    pub async fn from_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let store = FileSessionStore::new(&config.session_dir, config.session_namespace.clone());
        Self::new(config, Box::new(store)).await
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn cart(&self) -> &CartManager {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartManager {
        &mut self.cart
    }

    #[must_use]
    pub fn session_store(&self) -> &dyn SessionStore {
        self.session.as_ref()
    }

    /// Current stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub fn session(&self) -> Result<Session> {
        Ok(self.session.load()?)
    }

    /// Sign in; see [`auth::login`].
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the session cannot
    /// be saved.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Session> {
        Ok(auth::login(&self.api, self.session.as_ref(), email, password).await?)
    }

    /// Register and sign in; see [`auth::register`].
    ///
    /// # Errors
    ///
    /// Returns an error if the registration is rejected or the session cannot
    /// be saved.
    pub async fn register(&self, registration: &Registration) -> Result<Session> {
        Ok(auth::register(&self.api, self.session.as_ref(), registration).await?)
    }

    /// Sign out. The cart is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored session cannot be removed.
    pub async fn logout(&self) -> Result<()> {
        Ok(auth::logout(&self.api, self.session.as_ref()).await?)
    }

    /// Place an order for the cart; see [`checkout::place_order`].
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty, nobody is signed in, or the API
    /// rejects the order.
    pub async fn checkout(&mut self, payment_method: PaymentMethod) -> Result<Order> {
        let session = self.session.load()?;
        Ok(checkout::place_order(&self.api, &mut self.cart, &session, payment_method).await?)
    }
}
