//! End-to-end tests for favorites, the cached catalog, order history, and
//! the agent chat proxy.

use chrono::Utc;
use secrecy::SecretString;

use tangelo_client::api::types::Order;
use tangelo_client::config::ClientConfig;
use tangelo_client::error::{ApiError, StoreError};
use tangelo_client::state::Storefront;
use tangelo_client::storage::MemoryIdentityStorage;
use tangelo_core::{OrderId, OrderStatus, ProductId};
use tangelo_integration_tests::MockBackend;

const ADA_EMAIL: &str = "ada@example.com";
const ADA_PASSWORD: &str = "hunter2";

fn password() -> SecretString {
    SecretString::from(ADA_PASSWORD.to_string())
}

async fn seeded_backend() -> MockBackend {
    let backend = MockBackend::start().await;
    backend.add_user(7, "Ada", ADA_EMAIL, ADA_PASSWORD);
    backend.add_product(MockBackend::product(9, "Product 9", "24.99"));
    backend.add_product(MockBackend::product(5, "Product 5", "10.00"));
    backend
}

async fn connect(backend: &MockBackend) -> Storefront {
    let config = ClientConfig::new(backend.base_url()).expect("valid config");
    Storefront::with_storage(config, Box::new(MemoryIdentityStorage::new()))
        .await
        .expect("connect")
}

async fn login(storefront: &Storefront) {
    storefront
        .login(ADA_EMAIL, password())
        .await
        .expect("login");
}

// =============================================================================
// Favorites
// =============================================================================

#[tokio::test]
async fn test_favorites_roundtrip() {
    let backend = seeded_backend().await;
    let storefront = connect(&backend).await;
    login(&storefront).await;

    assert!(!storefront.favorites().is_favorite(ProductId::new(9)));

    let favorite = storefront
        .favorites()
        .add(ProductId::new(9))
        .await
        .expect("add favorite");
    assert_eq!(favorite.product_id, ProductId::new(9));
    assert_eq!(favorite.product.title, "Product 9");

    assert!(storefront.favorites().is_favorite(ProductId::new(9)));
    assert_eq!(storefront.favorites().items().len(), 1);
    assert_eq!(backend.favorites_snapshot(7).len(), 1);

    storefront
        .favorites()
        .remove(ProductId::new(9))
        .await
        .expect("remove favorite");
    assert!(!storefront.favorites().is_favorite(ProductId::new(9)));
    assert!(backend.favorites_snapshot(7).is_empty());
}

#[tokio::test]
async fn test_favorites_survive_relogin() {
    let backend = seeded_backend().await;
    let storefront = connect(&backend).await;

    login(&storefront).await;
    storefront
        .favorites()
        .add(ProductId::new(9))
        .await
        .expect("add favorite");

    storefront.logout().await;
    assert!(storefront.favorites().items().is_empty());
    assert!(!storefront.favorites().is_favorite(ProductId::new(9)));
    // Logout is purely local
    assert_eq!(backend.counters().favorite_mutations, 1);

    login(&storefront).await;
    assert!(storefront.favorites().is_favorite(ProductId::new(9)));
    assert_eq!(storefront.favorites().items().len(), 1);
}

#[tokio::test]
async fn test_guest_favorite_mutations_rejected_without_requests() {
    let backend = seeded_backend().await;
    let storefront = connect(&backend).await;

    let error = storefront
        .favorites()
        .add(ProductId::new(9))
        .await
        .expect_err("guest add");
    assert!(matches!(error, StoreError::AuthRequired));

    let error = storefront
        .favorites()
        .remove(ProductId::new(9))
        .await
        .expect_err("guest remove");
    assert!(matches!(error, StoreError::AuthRequired));

    let counters = backend.counters();
    assert_eq!(counters.favorite_fetches, 0);
    assert_eq!(counters.favorite_mutations, 0);
}

#[tokio::test]
async fn test_favorite_add_failure_leaves_state_unchanged() {
    let backend = seeded_backend().await;
    let storefront = connect(&backend).await;
    login(&storefront).await;

    backend.set_fail_favorite_mutations(true);
    let error = storefront
        .favorites()
        .add(ProductId::new(9))
        .await
        .expect_err("add must fail");
    assert!(matches!(error, StoreError::Api(ApiError::Status { status: 500, .. })));

    assert!(!storefront.favorites().is_favorite(ProductId::new(9)));
    assert!(storefront.favorites().items().is_empty());
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_catalog_list_is_cached() {
    let backend = seeded_backend().await;
    let storefront = connect(&backend).await;

    let first = storefront.catalog().products(50).await.expect("products");
    assert_eq!(first.len(), 2);

    let second = storefront.catalog().products(50).await.expect("products");
    assert_eq!(first, second);
    // Second read was served from cache
    assert_eq!(backend.counters().product_reads, 1);
}

#[tokio::test]
async fn test_catalog_invalidate_refetches() {
    let backend = seeded_backend().await;
    let storefront = connect(&backend).await;

    storefront.catalog().products(50).await.expect("products");
    storefront.catalog().invalidate_all().await;
    storefront.catalog().products(50).await.expect("products");

    assert_eq!(backend.counters().product_reads, 2);
}

#[tokio::test]
async fn test_catalog_product_detail_and_not_found() {
    let backend = seeded_backend().await;
    let storefront = connect(&backend).await;

    let product = storefront
        .catalog()
        .product(ProductId::new(9))
        .await
        .expect("product");
    assert_eq!(product.title, "Product 9");
    assert_eq!(product.price, "24.99".parse().expect("decimal"));

    let error = storefront
        .catalog()
        .product(ProductId::new(999))
        .await
        .expect_err("missing product");
    assert!(matches!(error, ApiError::NotFound(_)));
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_orders_require_authentication() {
    let backend = seeded_backend().await;
    let storefront = connect(&backend).await;

    let error = storefront.orders(10).await.expect_err("guest orders");
    assert!(matches!(error, StoreError::AuthRequired));
    assert_eq!(backend.counters().order_reads, 0);
}

#[tokio::test]
async fn test_orders_fetched_for_current_user() {
    let backend = seeded_backend().await;
    backend.seed_order(
        7,
        Order {
            id: OrderId::new(3),
            created_at: Utc::now(),
            total: "49.50".parse().expect("decimal"),
            status: OrderStatus::Shipped,
            product: Some(MockBackend::product(9, "Product 9", "24.99")),
        },
    );

    let storefront = connect(&backend).await;
    login(&storefront).await;

    let orders = storefront.orders(10).await.expect("orders");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, OrderId::new(3));
    assert_eq!(orders[0].status, OrderStatus::Shipped);
    assert_eq!(orders[0].total, "49.50".parse().expect("decimal"));
}

// =============================================================================
// Agent chat
// =============================================================================

#[tokio::test]
async fn test_chat_as_guest_sends_no_identity() {
    let backend = seeded_backend().await;
    let storefront = connect(&backend).await;

    let reply = storefront.chat("where is my order?").await.expect("chat");
    assert!(reply.contains("where is my order?"));
    assert!(reply.contains("guest"));
    assert!(reply.contains("authenticated=false"));
}

#[tokio::test]
async fn test_chat_attaches_current_identity() {
    let backend = seeded_backend().await;
    let storefront = connect(&backend).await;
    login(&storefront).await;

    let reply = storefront.chat("where is my order?").await.expect("chat");
    assert!(reply.contains("user 7"));
    assert!(reply.contains("authenticated=true"));
}
