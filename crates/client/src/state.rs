//! The `Storefront` facade: one object wiring all stores together.
//!
//! Constructed once at application start and passed down explicitly -
//! nothing here is a global. The facade owns the dependency graph: the
//! session store is built first (restoring any persisted identity), the
//! cart and favorites stores subscribe to it, and subscription immediately
//! delivers the current identity, so by the time `connect` returns every
//! store reflects the restored session.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use tangelo_core::Email;

use crate::agent::AgentClient;
use crate::api::ApiClient;
use crate::api::types::{Identity, Order};
use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::config::ClientConfig;
use crate::error::{ApiError, StoreError};
use crate::favorites::FavoritesStore;
use crate::session::SessionStore;
use crate::storage::{FileIdentityStorage, IdentityStorage};

/// Client facade for one storefront session.
///
/// Cheaply cloneable via `Arc`; pages/commands read snapshots from the
/// stores and invoke operations through them - no consumer mutates store
/// state directly.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: ClientConfig,
    api: ApiClient,
    session: SessionStore,
    cart: CartStore,
    favorites: FavoritesStore,
    catalog: Catalog,
    agent: AgentClient,
}

impl Storefront {
    /// Connect with file-backed identity persistence at the configured path.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub async fn connect(config: ClientConfig) -> Result<Self, ApiError> {
        let storage = Box::new(FileIdentityStorage::new(config.identity_path.clone()));
        Self::with_storage(config, storage).await
    }

    /// Connect with explicit identity storage (tests, embedding).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub async fn with_storage(
        config: ClientConfig,
        storage: Box<dyn IdentityStorage>,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config)?;
        let session = SessionStore::new(storage);
        let cart = CartStore::new(api.clone());
        let favorites = FavoritesStore::new(api.clone());

        // Subscription order is notification order: cart first, favorites
        // second. Each subscribe also syncs the store against any restored
        // identity before returning.
        session.subscribe(Arc::new(cart.clone())).await;
        session.subscribe(Arc::new(favorites.clone())).await;

        let catalog = Catalog::new(api.clone());
        let agent = AgentClient::new(api.clone());

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                session,
                cart,
                favorites,
                catalog,
                agent,
            }),
        })
    }

    /// Log in and synchronize every identity-dependent store.
    ///
    /// When this returns, the cart and favorites reflect the new identity.
    ///
    /// # Errors
    ///
    /// `StoreError::InvalidEmail` before any request for a malformed email,
    /// or the backend failure (bad credentials surface the backend's detail
    /// message).
    pub async fn login(
        &self,
        email: &str,
        password: SecretString,
    ) -> Result<Identity, StoreError> {
        let email = Email::parse(email)?;

        let identity = self
            .inner
            .api
            .login(&email, password.expose_secret())
            .await?;

        self.inner.session.set_identity(identity.clone()).await;
        Ok(identity)
    }

    /// Log out: clears the identity and empties every dependent store.
    /// Purely local - no backend call is made for the cart.
    pub async fn logout(&self) {
        self.inner.session.clear_identity().await;
    }

    /// Fetch the current user's order history.
    ///
    /// # Errors
    ///
    /// `StoreError::AuthRequired` when logged out (no request issued), or
    /// the backend failure.
    pub async fn orders(&self, limit: u32) -> Result<Vec<Order>, StoreError> {
        let user = self
            .inner
            .session
            .user_id()
            .ok_or(StoreError::AuthRequired)?;
        Ok(self.inner.api.orders(user, limit).await?)
    }

    /// Send a chat message to the agent proxy with the current identity
    /// attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn chat(&self, text: &str) -> Result<String, ApiError> {
        let identity = self.inner.session.identity();
        self.inner.agent.ask(text, identity.as_ref()).await
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the favorites store.
    #[must_use]
    pub fn favorites(&self) -> &FavoritesStore {
        &self.inner.favorites
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the underlying API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }
}
