//! Favorites store: the local mirror of the user's favorite products.
//!
//! Same identity-driven lifecycle as the cart, but simpler reconciliation:
//! favorites are pure set membership, so each mutation's own success is
//! enough to update the local set - no authoritative-vs-optimistic
//! distinction and no merging.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tangelo_core::{ProductId, UserId};

use crate::api::ApiClient;
use crate::api::types::{Favorite, Identity};
use crate::error::StoreError;
use crate::session::{BoxFuture, IdentityObserver};

#[derive(Debug, Clone)]
enum FavoritesState {
    Guest,
    Ready { user: UserId, items: Vec<Favorite> },
}

impl FavoritesState {
    const fn user(&self) -> Option<UserId> {
        match self {
            Self::Guest => None,
            Self::Ready { user, .. } => Some(*user),
        }
    }
}

/// Store owning the local view of the user's favorites.
///
/// Cheaply cloneable; all clones share state.
#[derive(Clone)]
pub struct FavoritesStore {
    inner: Arc<FavoritesInner>,
}

struct FavoritesInner {
    api: ApiClient,
    state: RwLock<FavoritesState>,
}

impl FavoritesStore {
    /// Create a favorites store in the guest state.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(FavoritesInner {
                api,
                state: RwLock::new(FavoritesState::Guest),
            }),
        }
    }

    /// Re-run the fetch-or-clear logic for an identity transition.
    pub async fn sync(&self, user: Option<UserId>) {
        let Some(user) = user else {
            *self.write_state() = FavoritesState::Guest;
            return;
        };

        // Enter Ready empty first so a logout racing the fetch wins
        *self.write_state() = FavoritesState::Ready {
            user,
            items: Vec::new(),
        };

        let items = match self.inner.api.favorites(user).await {
            Ok(items) => items,
            Err(error) => {
                tracing::warn!(user_id = %user, %error, "failed to fetch favorites");
                Vec::new()
            }
        };

        let mut state = self.write_state();
        if state.user() == Some(user) {
            *state = FavoritesState::Ready { user, items };
        }
    }

    /// Add a product to the favorites.
    ///
    /// # Errors
    ///
    /// [`StoreError::AuthRequired`] when no identity is present (no request
    /// issued), or the backend failure. Local state is unchanged on error.
    pub async fn add(&self, product_id: ProductId) -> Result<Favorite, StoreError> {
        let user = self.require_user()?;

        let favorite = self.inner.api.add_favorite(user, product_id).await?;

        let mut state = self.write_state();
        if let FavoritesState::Ready { user: owner, items } = &mut *state
            && *owner == user
            && !items.iter().any(|f| f.product_id == product_id)
        {
            items.push(favorite.clone());
        }
        Ok(favorite)
    }

    /// Remove a product from the favorites.
    ///
    /// # Errors
    ///
    /// [`StoreError::AuthRequired`] when no identity is present (no request
    /// issued), or the backend failure. Local state is unchanged on error.
    pub async fn remove(&self, product_id: ProductId) -> Result<(), StoreError> {
        let user = self.require_user()?;

        self.inner.api.remove_favorite(user, product_id).await?;

        let mut state = self.write_state();
        if let FavoritesState::Ready { user: owner, items } = &mut *state
            && *owner == user
        {
            items.retain(|f| f.product_id != product_id);
        }
        Ok(())
    }

    /// Re-fetch the favorites from the backend.
    ///
    /// # Errors
    ///
    /// [`StoreError::AuthRequired`] when no identity is present, or the
    /// backend failure.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let user = self.require_user()?;

        let items = self.inner.api.favorites(user).await?;

        let mut state = self.write_state();
        if state.user() == Some(user) {
            *state = FavoritesState::Ready { user, items };
        }
        Ok(())
    }

    /// Snapshot of the favorites.
    #[must_use]
    pub fn items(&self) -> Vec<Favorite> {
        match &*self.read_state() {
            FavoritesState::Ready { items, .. } => items.clone(),
            FavoritesState::Guest => Vec::new(),
        }
    }

    /// Whether a product is currently a favorite.
    #[must_use]
    pub fn is_favorite(&self, product_id: ProductId) -> bool {
        match &*self.read_state() {
            FavoritesState::Ready { items, .. } => {
                items.iter().any(|f| f.product_id == product_id)
            }
            FavoritesState::Guest => false,
        }
    }

    fn require_user(&self) -> Result<UserId, StoreError> {
        self.read_state().user().ok_or(StoreError::AuthRequired)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, FavoritesState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, FavoritesState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdentityObserver for FavoritesStore {
    fn identity_changed(&self, identity: Option<Identity>) -> BoxFuture<'static, ()> {
        let store = self.clone();
        Box::pin(async move {
            store.sync(identity.map(|i| i.id)).await;
        })
    }
}
