//! End-to-end tests for the session lifecycle and the cart store, driving
//! the real client against the in-process mock backend.

use std::io;
use std::sync::Arc;

use secrecy::SecretString;

use tangelo_client::api::types::{CartItem, Identity};
use tangelo_client::cart::CartPhase;
use tangelo_client::config::ClientConfig;
use tangelo_client::error::{ApiError, StoreError};
use tangelo_client::state::Storefront;
use tangelo_client::storage::{IdentityStorage, MemoryIdentityStorage};
use tangelo_core::{CartLineId, Email, ProductId, UserId};
use tangelo_integration_tests::MockBackend;

const ADA_EMAIL: &str = "ada@example.com";
const ADA_PASSWORD: &str = "hunter2";

fn password() -> SecretString {
    SecretString::from(ADA_PASSWORD.to_string())
}

fn ada_identity() -> Identity {
    Identity {
        id: UserId::new(7),
        name: "Ada".to_string(),
        email: Email::parse(ADA_EMAIL).expect("valid email"),
    }
}

fn cart_line(line_id: i64, product_id: i64, quantity: u32) -> CartItem {
    CartItem {
        id: Some(CartLineId::new(line_id)),
        product: MockBackend::product(product_id, &format!("Product {product_id}"), "10.00"),
        quantity,
    }
}

/// Backend seeded with Ada (user 7) and two products (9 and 5).
async fn seeded_backend() -> MockBackend {
    let backend = MockBackend::start().await;
    backend.add_user(7, "Ada", ADA_EMAIL, ADA_PASSWORD);
    backend.add_product(MockBackend::product(9, "Product 9", "10.00"));
    backend.add_product(MockBackend::product(5, "Product 5", "10.00"));
    backend
}

async fn connect(backend: &MockBackend) -> Storefront {
    connect_with(backend, Box::new(MemoryIdentityStorage::new())).await
}

async fn connect_with(backend: &MockBackend, storage: Box<dyn IdentityStorage>) -> Storefront {
    let config = ClientConfig::new(backend.base_url()).expect("valid config");
    Storefront::with_storage(config, storage)
        .await
        .expect("connect")
}

/// Identity storage shared with the test so it can be inspected after the
/// storefront consumes its `Box`.
#[derive(Clone)]
struct SharedStorage(Arc<MemoryIdentityStorage>);

impl IdentityStorage for SharedStorage {
    fn load(&self) -> Option<Identity> {
        self.0.load()
    }

    fn save(&self, identity: &Identity) -> io::Result<()> {
        self.0.save(identity)
    }

    fn clear(&self) -> io::Result<()> {
        self.0.clear()
    }
}

#[tokio::test]
async fn test_login_syncs_seeded_cart() {
    let backend = seeded_backend().await;
    backend.seed_cart(7, vec![cart_line(1, 9, 2)]);
    let storefront = connect(&backend).await;

    assert_eq!(storefront.cart().phase(), CartPhase::Guest);

    let identity = storefront
        .login(ADA_EMAIL, password())
        .await
        .expect("login");
    assert_eq!(identity.id, UserId::new(7));

    // Login returns only after the cart has synced
    assert_eq!(storefront.cart().phase(), CartPhase::Ready);
    let items = storefront.cart().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product.id, ProductId::new(9));
    assert_eq!(items[0].quantity, 2);
    assert_eq!(storefront.cart().total_items(), 2);
}

#[tokio::test]
async fn test_login_bad_credentials_surfaces_detail() {
    let backend = seeded_backend().await;
    let storefront = connect(&backend).await;

    let error = storefront
        .login(ADA_EMAIL, SecretString::from("wrong".to_string()))
        .await
        .expect_err("login must fail");

    match error {
        StoreError::Api(ApiError::Status { status, detail }) => {
            assert_eq!(status, 401);
            assert_eq!(detail, "Invalid email or password");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!storefront.session().is_authenticated());
    assert_eq!(storefront.cart().phase(), CartPhase::Guest);
}

#[tokio::test]
async fn test_invalid_email_rejected_before_any_request() {
    let backend = seeded_backend().await;
    let storefront = connect(&backend).await;

    let error = storefront
        .login("not-an-email", password())
        .await
        .expect_err("login must fail");

    assert!(matches!(error, StoreError::InvalidEmail(_)));
    assert!(error.is_preflight());
    assert_eq!(backend.counters().logins, 0);
}

#[tokio::test]
async fn test_logout_clears_cart_locally_only() {
    let backend = seeded_backend().await;
    backend.seed_cart(7, vec![cart_line(1, 9, 2)]);
    let storefront = connect(&backend).await;

    storefront
        .login(ADA_EMAIL, password())
        .await
        .expect("login");
    assert_eq!(storefront.cart().total_items(), 2);

    storefront.logout().await;

    assert_eq!(storefront.cart().phase(), CartPhase::Guest);
    assert!(storefront.cart().items().is_empty());
    assert_eq!(storefront.cart().total_items(), 0);
    assert!(!storefront.session().is_authenticated());

    // No backend call was made: the server-side cart survives for next login
    assert_eq!(backend.counters().cart_mutations, 0);
    assert_eq!(backend.cart_snapshot(7).len(), 1);
}

#[tokio::test]
async fn test_add_applies_authoritative_backend_line() {
    let backend = seeded_backend().await;
    let storefront = connect(&backend).await;
    storefront
        .login(ADA_EMAIL, password())
        .await
        .expect("login");

    let product_nine = MockBackend::product(9, "Product 9", "10.00");
    let product_five = MockBackend::product(5, "Product 5", "10.00");

    let line = storefront.cart().add(&product_nine).await.expect("add");
    assert_eq!(line.quantity, 1);
    assert_eq!(storefront.cart().total_items(), 1);

    // Same product again: the backend increments, the client just mirrors
    let line = storefront.cart().add(&product_nine).await.expect("add");
    assert_eq!(line.quantity, 2);
    let items = storefront.cart().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);

    storefront.cart().add(&product_five).await.expect("add");
    assert_eq!(storefront.cart().items().len(), 2);
    assert_eq!(storefront.cart().total_items(), 3);
    assert_eq!(backend.cart_snapshot(7).len(), 2);
}

#[tokio::test]
async fn test_remove_and_clear() {
    let backend = seeded_backend().await;
    backend.seed_cart(7, vec![cart_line(1, 9, 2), cart_line(2, 5, 1)]);
    let storefront = connect(&backend).await;
    storefront
        .login(ADA_EMAIL, password())
        .await
        .expect("login");

    storefront
        .cart()
        .remove(ProductId::new(9))
        .await
        .expect("remove");
    let items = storefront.cart().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product.id, ProductId::new(5));
    assert_eq!(backend.cart_snapshot(7).len(), 1);

    storefront.cart().clear().await.expect("clear");
    assert!(storefront.cart().items().is_empty());
    assert!(backend.cart_snapshot(7).is_empty());
    // Still Ready: clearing is not logging out
    assert_eq!(storefront.cart().phase(), CartPhase::Ready);
}

#[tokio::test]
async fn test_guest_mutations_rejected_without_requests() {
    let backend = seeded_backend().await;
    let storefront = connect(&backend).await;
    let product = MockBackend::product(9, "Product 9", "10.00");

    let error = storefront.cart().add(&product).await.expect_err("guest add");
    assert!(matches!(error, StoreError::AuthRequired));

    let error = storefront
        .cart()
        .remove(ProductId::new(9))
        .await
        .expect_err("guest remove");
    assert!(matches!(error, StoreError::AuthRequired));

    let error = storefront.cart().clear().await.expect_err("guest clear");
    assert!(matches!(error, StoreError::AuthRequired));

    let counters = backend.counters();
    assert_eq!(counters.cart_fetches, 0);
    assert_eq!(counters.cart_mutations, 0);
}

#[tokio::test]
async fn test_add_failure_leaves_local_cart_unchanged() {
    let backend = seeded_backend().await;
    backend.seed_cart(7, vec![cart_line(1, 9, 2)]);
    let storefront = connect(&backend).await;
    storefront
        .login(ADA_EMAIL, password())
        .await
        .expect("login");

    backend.set_fail_cart_mutations(true);
    let product = MockBackend::product(5, "Product 5", "10.00");
    let error = storefront
        .cart()
        .add(&product)
        .await
        .expect_err("add must fail");
    assert!(matches!(error, StoreError::Api(ApiError::Status { status: 500, .. })));

    // The request was attempted, but the local mirror is untouched
    assert_eq!(backend.counters().cart_mutations, 1);
    assert_eq!(storefront.cart().items().len(), 1);
    assert_eq!(storefront.cart().total_items(), 2);
}

#[tokio::test]
async fn test_cart_fetch_failure_lands_ready_empty_then_refresh_recovers() {
    let backend = seeded_backend().await;
    backend.seed_cart(7, vec![cart_line(1, 9, 2)]);
    backend.set_fail_cart_fetches(true);
    let storefront = connect(&backend).await;

    // Login still succeeds; the cart degrades to empty instead of wedging
    storefront
        .login(ADA_EMAIL, password())
        .await
        .expect("login");
    assert_eq!(storefront.cart().phase(), CartPhase::Ready);
    assert!(storefront.cart().items().is_empty());

    backend.set_fail_cart_fetches(false);
    storefront.cart().refresh().await.expect("refresh");
    assert_eq!(storefront.cart().total_items(), 2);
}

#[tokio::test]
async fn test_restored_identity_syncs_at_connect() {
    let backend = seeded_backend().await;
    backend.seed_cart(7, vec![cart_line(1, 9, 2)]);

    let storage = Box::new(MemoryIdentityStorage::with_identity(ada_identity()));
    let storefront = connect_with(&backend, storage).await;

    // No login round-trip, but the session and cart are already live
    assert!(storefront.session().is_authenticated());
    assert_eq!(storefront.session().user_id(), Some(UserId::new(7)));
    assert_eq!(storefront.cart().total_items(), 2);

    let counters = backend.counters();
    assert_eq!(counters.logins, 0);
    assert_eq!(counters.cart_fetches, 1);
}

#[tokio::test]
async fn test_identity_persisted_on_login_and_cleared_on_logout() {
    let backend = seeded_backend().await;
    let storage = SharedStorage(Arc::new(MemoryIdentityStorage::new()));
    let storefront = connect_with(&backend, Box::new(storage.clone())).await;

    storefront
        .login(ADA_EMAIL, password())
        .await
        .expect("login");
    assert_eq!(storage.load(), Some(ada_identity()));

    storefront.logout().await;
    assert!(storage.load().is_none());
}
