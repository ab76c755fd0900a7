//! Session store: the authenticated identity and its observers.
//!
//! The session owns `Option<Identity>`. At most one identity is active per
//! session; absence means guest mode. Dependent stores (cart, favorites)
//! subscribe for identity changes and are notified *inside*
//! [`SessionStore::set_identity`] / [`SessionStore::clear_identity`] - the
//! call does not return until every observer has finished reacting, so
//! there is no window where the identity has changed but a dependent store
//! still reflects the old one.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tangelo_core::UserId;

use crate::api::types::Identity;
use crate::storage::IdentityStorage;

/// Boxed future type for object-safe async callbacks.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Observer of identity changes.
///
/// `identity_changed` is awaited by the session store during
/// `set_identity`/`clear_identity`, in subscription order.
pub trait IdentityObserver: Send + Sync {
    /// React to the identity becoming present (`Some`) or absent (`None`).
    fn identity_changed(&self, identity: Option<Identity>) -> BoxFuture<'static, ()>;
}

/// Store owning the current authenticated identity.
///
/// Cheaply cloneable; all clones share state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    storage: Box<dyn IdentityStorage>,
    identity: RwLock<Option<Identity>>,
    observers: RwLock<Vec<Arc<dyn IdentityObserver>>>,
}

impl SessionStore {
    /// Create a session store, restoring any persisted identity.
    ///
    /// The persisted value is trusted without backend revalidation;
    /// malformed data is treated as "no identity" by the storage layer.
    #[must_use]
    pub fn new(storage: Box<dyn IdentityStorage>) -> Self {
        let identity = storage.load();
        if let Some(identity) = &identity {
            tracing::info!(user_id = %identity.id, "restored persisted identity");
        }

        Self {
            inner: Arc::new(SessionInner {
                storage,
                identity: RwLock::new(identity),
                observers: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Register an observer and immediately deliver the current identity to
    /// it, so stores attached after a restored login still sync.
    pub async fn subscribe(&self, observer: Arc<dyn IdentityObserver>) {
        let current = self.identity();
        write_lock(&self.inner.observers).push(Arc::clone(&observer));
        observer.identity_changed(current).await;
    }

    /// Set the identity after a successful login.
    ///
    /// Persists the identity, replaces the in-memory value, then notifies
    /// every observer before returning. A persistence failure is logged and
    /// does not fail the login; the in-memory identity is authoritative for
    /// the rest of the session.
    pub async fn set_identity(&self, identity: Identity) {
        if let Err(error) = self.inner.storage.save(&identity) {
            tracing::warn!(%error, "failed to persist identity, continuing in memory");
        }

        *write_lock(&self.inner.identity) = Some(identity.clone());
        tracing::info!(user_id = %identity.id, "identity set");

        self.notify(Some(identity)).await;
    }

    /// Clear the identity (logout). Removes the persisted record and the
    /// in-memory value, then notifies every observer with `None`.
    pub async fn clear_identity(&self) {
        if let Err(error) = self.inner.storage.clear() {
            tracing::warn!(%error, "failed to clear persisted identity");
        }

        *write_lock(&self.inner.identity) = None;
        tracing::info!("identity cleared");

        self.notify(None).await;
    }

    async fn notify(&self, identity: Option<Identity>) {
        // Snapshot under the lock, notify outside it
        let observers: Vec<_> = read_lock(&self.inner.observers).clone();
        for observer in observers {
            observer.identity_changed(identity.clone()).await;
        }
    }

    /// Current identity snapshot.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        read_lock(&self.inner.identity).clone()
    }

    /// Whether an identity is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        read_lock(&self.inner.identity).is_some()
    }

    /// Current user ID, if logged in.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        read_lock(&self.inner.identity).as_ref().map(|i| i.id)
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
