//! Cart store: the local mirror of the backend cart.
//!
//! Lifecycle follows the identity: `Guest` until an identity appears, then
//! `Loading` while the remote cart is fetched, then `Ready`. Logout drops
//! straight back to `Guest`, discarding contents locally with no backend
//! call.
//!
//! Reconciliation rules:
//! - **add** trusts the server: the returned line replaces any local line
//!   for the same product, or is appended. The client never computes the
//!   new quantity.
//! - **remove**/**clear** are optimistic: applied locally as soon as the
//!   backend confirms success, with no re-fetch.
//! - Overlapping mutations for the same product are not serialized; the
//!   response that lands last wins. [`CartStore::refresh`] re-fetches the
//!   authoritative cart when callers want to reconcile.
//!
//! Every mutation checks for an identity first and fails with
//! [`StoreError::AuthRequired`] before any request when absent. On any
//! backend failure local state is left untouched.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tangelo_core::{ProductId, UserId};

use crate::api::ApiClient;
use crate::api::types::{CartItem, Identity, Product};
use crate::error::StoreError;
use crate::session::{BoxFuture, IdentityObserver};

/// Externally visible cart lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartPhase {
    /// No identity; the cart is empty and mutations are rejected locally.
    Guest,
    /// Identity present, remote fetch in flight.
    Loading,
    /// Remote contents loaded; mutations permitted.
    Ready,
}

#[derive(Debug, Clone)]
enum CartState {
    Guest,
    Loading { user: UserId },
    Ready { user: UserId, items: Vec<CartItem> },
}

impl CartState {
    const fn user(&self) -> Option<UserId> {
        match self {
            Self::Guest => None,
            Self::Loading { user } | Self::Ready { user, .. } => Some(*user),
        }
    }
}

/// Store owning the local view of the backend cart.
///
/// Cheaply cloneable; all clones share state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartInner>,
}

struct CartInner {
    api: ApiClient,
    state: RwLock<CartState>,
}

impl CartStore {
    /// Create a cart store in the guest state.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(CartInner {
                api,
                state: RwLock::new(CartState::Guest),
            }),
        }
    }

    /// Re-run the fetch-or-clear logic for an identity transition.
    ///
    /// Called by the session store via the observer subscription. A fetch
    /// failure logs a warning and lands `Ready` with an empty cart so the
    /// session stays usable; `refresh` can recover later.
    pub async fn sync(&self, user: Option<UserId>) {
        let Some(user) = user else {
            *self.write_state() = CartState::Guest;
            return;
        };

        *self.write_state() = CartState::Loading { user };

        let items = match self.inner.api.cart(user).await {
            Ok(items) => items,
            Err(error) => {
                tracing::warn!(user_id = %user, %error, "failed to fetch cart");
                Vec::new()
            }
        };

        let mut state = self.write_state();
        // The identity may have changed while the fetch was in flight
        if state.user() == Some(user) {
            *state = CartState::Ready { user, items };
        }
    }

    /// Add one unit of a product to the cart.
    ///
    /// The backend computes the resulting line (creating it or incrementing
    /// an existing one); on success that authoritative line replaces any
    /// local line for the same product or is appended, and is returned.
    ///
    /// # Errors
    ///
    /// [`StoreError::AuthRequired`] when no identity is present (no request
    /// issued), or the backend failure. Local state is unchanged on error.
    pub async fn add(&self, product: &Product) -> Result<CartItem, StoreError> {
        let user = self.require_user()?;

        let line = self.inner.api.add_cart_line(user, product.id, 1).await?;

        let mut state = self.write_state();
        if let CartState::Ready { user: owner, items } = &mut *state
            && *owner == user
        {
            merge_line(items, line.clone());
        }
        Ok(line)
    }

    /// Remove a product's line from the cart.
    ///
    /// Applied locally as soon as the backend confirms the delete.
    ///
    /// # Errors
    ///
    /// [`StoreError::AuthRequired`] when no identity is present (no request
    /// issued), or the backend failure. Local state is unchanged on error.
    pub async fn remove(&self, product_id: ProductId) -> Result<(), StoreError> {
        let user = self.require_user()?;

        self.inner.api.remove_cart_line(user, product_id).await?;

        let mut state = self.write_state();
        if let CartState::Ready { user: owner, items } = &mut *state
            && *owner == user
        {
            items.retain(|item| item.product.id != product_id);
        }
        Ok(())
    }

    /// Remove every line from the cart.
    ///
    /// # Errors
    ///
    /// [`StoreError::AuthRequired`] when no identity is present (no request
    /// issued), or the backend failure. Local state is unchanged on error.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let user = self.require_user()?;

        self.inner.api.clear_cart(user).await?;

        let mut state = self.write_state();
        if let CartState::Ready { user: owner, items } = &mut *state
            && *owner == user
        {
            items.clear();
        }
        Ok(())
    }

    /// Re-fetch the authoritative cart from the backend.
    ///
    /// # Errors
    ///
    /// [`StoreError::AuthRequired`] when no identity is present, or the
    /// backend failure. Local state is unchanged on error.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let user = self.require_user()?;

        let items = self.inner.api.cart(user).await?;

        let mut state = self.write_state();
        if state.user() == Some(user) {
            *state = CartState::Ready { user, items };
        }
        Ok(())
    }

    /// Snapshot of the cart lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        match &*self.read_state() {
            CartState::Ready { items, .. } => items.clone(),
            CartState::Guest | CartState::Loading { .. } => Vec::new(),
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> CartPhase {
        match &*self.read_state() {
            CartState::Guest => CartPhase::Guest,
            CartState::Loading { .. } => CartPhase::Loading,
            CartState::Ready { .. } => CartPhase::Ready,
        }
    }

    /// Total item count: the sum of quantities across all lines, recomputed
    /// from the lines on every call.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        match &*self.read_state() {
            CartState::Ready { items, .. } => count_items(items),
            CartState::Guest | CartState::Loading { .. } => 0,
        }
    }

    fn require_user(&self) -> Result<UserId, StoreError> {
        self.read_state().user().ok_or(StoreError::AuthRequired)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CartState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CartState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdentityObserver for CartStore {
    fn identity_changed(&self, identity: Option<Identity>) -> BoxFuture<'static, ()> {
        let store = self.clone();
        Box::pin(async move {
            store.sync(identity.map(|i| i.id)).await;
        })
    }
}

/// Replace the line for the same product, or append. Lines are keyed by
/// `product.id`; at most one line per product.
fn merge_line(items: &mut Vec<CartItem>, line: CartItem) {
    if let Some(existing) = items
        .iter_mut()
        .find(|item| item.product.id == line.product.id)
    {
        *existing = line;
    } else {
        items.push(line);
    }
}

fn count_items(items: &[CartItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity)).sum()
}
