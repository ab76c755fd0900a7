//! Integration test support for Tangelo.
//!
//! [`MockBackend`] is an in-process stand-in for the retail backend: an
//! axum router over in-memory state, bound to an ephemeral port, speaking
//! the same REST surface the SDK consumes. Tests seed users, products,
//! carts, and orders, then drive the real client against it.
//!
//! Beyond the endpoints themselves it offers two things a live backend
//! cannot: per-endpoint request counters (to prove an operation issued *no*
//! request) and failure injection (to prove local state survives backend
//! errors untouched).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::json;

use tangelo_client::api::types::{CartItem, Favorite, Identity, Order, Product};
use tangelo_core::{CartLineId, FavoriteId, ProductId, UserId};

/// Per-endpoint request counts, including requests that were failed by
/// injection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub logins: u64,
    pub cart_fetches: u64,
    pub cart_mutations: u64,
    pub favorite_fetches: u64,
    pub favorite_mutations: u64,
    pub product_reads: u64,
    pub order_reads: u64,
    pub chat_messages: u64,
}

struct UserRecord {
    identity: Identity,
    password: String,
}

#[derive(Default)]
struct BackendState {
    users: Vec<UserRecord>,
    products: Vec<Product>,
    carts: HashMap<i64, Vec<CartItem>>,
    favorites: HashMap<i64, Vec<Favorite>>,
    orders: HashMap<i64, Vec<Order>>,
    next_line_id: i64,
    next_favorite_id: i64,
    fail_cart_fetches: bool,
    fail_cart_mutations: bool,
    fail_favorite_mutations: bool,
    counters: Counters,
}

type SharedState = Arc<Mutex<BackendState>>;

/// In-process mock of the retail backend.
pub struct MockBackend {
    base_url: String,
    state: SharedState,
}

impl MockBackend {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound (test environment failure).
    pub async fn start() -> Self {
        let state: SharedState = Arc::new(Mutex::new(BackendState {
            next_line_id: 1,
            next_favorite_id: 1,
            ..BackendState::default()
        }));

        let app = Router::new()
            .route("/users/login", post(login))
            .route("/cart/", get(get_cart).post(add_to_cart).delete(clear_cart))
            .route("/cart/{product_id}", axum::routing::delete(remove_from_cart))
            .route("/favorites/", get(get_favorites).post(add_favorite))
            .route(
                "/favorites/{product_id}",
                axum::routing::delete(remove_favorite),
            )
            .route("/products/", get(list_products))
            .route("/products/{product_id}", get(get_product))
            .route("/orders/", get(get_orders))
            .route("/agent/chat", post(agent_chat))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend serve");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Base URL to point the client at.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    pub fn add_user(&self, id: i64, name: &str, email: &str, password: &str) {
        self.lock().users.push(UserRecord {
            identity: Identity {
                id: UserId::new(id),
                name: name.to_string(),
                email: tangelo_core::Email::parse(email).expect("valid seed email"),
            },
            password: password.to_string(),
        });
    }

    pub fn add_product(&self, product: Product) {
        self.lock().products.push(product);
    }

    /// Convenience constructor for seed products.
    #[must_use]
    pub fn product(id: i64, title: &str, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            category: "misc".to_string(),
            price: price.parse().expect("valid seed price"),
            rating: 4.2,
            vendor: "Acme".to_string(),
            ean: None,
            quantity: None,
        }
    }

    /// Seed a user's cart with lines as the backend would store them.
    pub fn seed_cart(&self, user_id: i64, lines: Vec<CartItem>) {
        let mut state = self.lock();
        let max_line = lines
            .iter()
            .filter_map(|l| l.id.map(|id| id.as_i64()))
            .max()
            .unwrap_or(0);
        state.next_line_id = state.next_line_id.max(max_line + 1);
        state.carts.insert(user_id, lines);
    }

    pub fn seed_order(&self, user_id: i64, order: Order) {
        self.lock().orders.entry(user_id).or_default().push(order);
    }

    // =========================================================================
    // Inspection & failure injection
    // =========================================================================

    /// Server-side cart contents, the ground truth for assertions.
    #[must_use]
    pub fn cart_snapshot(&self, user_id: i64) -> Vec<CartItem> {
        self.lock().carts.get(&user_id).cloned().unwrap_or_default()
    }

    /// Server-side favorites contents.
    #[must_use]
    pub fn favorites_snapshot(&self, user_id: i64) -> Vec<Favorite> {
        self.lock()
            .favorites
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn counters(&self) -> Counters {
        self.lock().counters
    }

    pub fn set_fail_cart_fetches(&self, fail: bool) {
        self.lock().fail_cart_fetches = fail;
    }

    pub fn set_fail_cart_mutations(&self, fail: bool) {
        self.lock().fail_cart_mutations = fail;
    }

    pub fn set_fail_favorite_mutations(&self, fail: bool) {
        self.lock().fail_favorite_mutations = fail;
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn lock(state: &SharedState) -> std::sync::MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn json_error(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

#[derive(Deserialize)]
struct UserQuery {
    user_id: i64,
}

#[derive(Deserialize)]
struct ProductsQuery {
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct OrdersQuery {
    user_id: i64,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct AddToCartBody {
    product_id: i64,
    quantity: u32,
}

#[derive(Deserialize)]
struct AddFavoriteBody {
    product_id: i64,
}

#[derive(Deserialize)]
struct ChatBody {
    text: String,
    user_id: Option<i64>,
    is_authenticated: bool,
}

async fn login(State(state): State<SharedState>, Json(body): Json<LoginBody>) -> Response {
    let mut state = lock(&state);
    state.counters.logins += 1;

    let found = state
        .users
        .iter()
        .find(|u| u.identity.email.as_str() == body.email && u.password == body.password)
        .map(|u| u.identity.clone());

    found.map_or_else(
        || json_error(StatusCode::UNAUTHORIZED, "Invalid email or password"),
        |identity| Json(identity).into_response(),
    )
}

async fn get_cart(State(state): State<SharedState>, Query(q): Query<UserQuery>) -> Response {
    let mut state = lock(&state);
    state.counters.cart_fetches += 1;

    if state.fail_cart_fetches {
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "injected failure");
    }

    let lines = state.carts.get(&q.user_id).cloned().unwrap_or_default();
    Json(lines).into_response()
}

async fn add_to_cart(
    State(state): State<SharedState>,
    Query(q): Query<UserQuery>,
    Json(body): Json<AddToCartBody>,
) -> Response {
    let mut state = lock(&state);
    state.counters.cart_mutations += 1;

    if state.fail_cart_mutations {
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "injected failure");
    }

    let Some(product) = state
        .products
        .iter()
        .find(|p| p.id == ProductId::new(body.product_id))
        .cloned()
    else {
        return json_error(StatusCode::NOT_FOUND, "Product not found");
    };

    let line_id = state.next_line_id;
    let lines = state.carts.entry(q.user_id).or_default();

    if let Some(existing) = lines.iter_mut().find(|l| l.product.id == product.id) {
        // The backend, not the client, computes the incremented quantity
        existing.quantity += body.quantity;
        return Json(existing.clone()).into_response();
    }

    let line = CartItem {
        id: Some(CartLineId::new(line_id)),
        product,
        quantity: body.quantity,
    };
    lines.push(line.clone());
    state.next_line_id += 1;
    Json(line).into_response()
}

async fn remove_from_cart(
    State(state): State<SharedState>,
    Path(product_id): Path<i64>,
    Query(q): Query<UserQuery>,
) -> Response {
    let mut state = lock(&state);
    state.counters.cart_mutations += 1;

    if state.fail_cart_mutations {
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "injected failure");
    }

    if let Some(lines) = state.carts.get_mut(&q.user_id) {
        lines.retain(|l| l.product.id != ProductId::new(product_id));
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn clear_cart(State(state): State<SharedState>, Query(q): Query<UserQuery>) -> Response {
    let mut state = lock(&state);
    state.counters.cart_mutations += 1;

    if state.fail_cart_mutations {
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "injected failure");
    }

    state.carts.remove(&q.user_id);
    StatusCode::NO_CONTENT.into_response()
}

async fn get_favorites(State(state): State<SharedState>, Query(q): Query<UserQuery>) -> Response {
    let mut state = lock(&state);
    state.counters.favorite_fetches += 1;

    let rows = state.favorites.get(&q.user_id).cloned().unwrap_or_default();
    Json(rows).into_response()
}

async fn add_favorite(
    State(state): State<SharedState>,
    Query(q): Query<UserQuery>,
    Json(body): Json<AddFavoriteBody>,
) -> Response {
    let mut state = lock(&state);
    state.counters.favorite_mutations += 1;

    if state.fail_favorite_mutations {
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "injected failure");
    }

    let Some(product) = state
        .products
        .iter()
        .find(|p| p.id == ProductId::new(body.product_id))
        .cloned()
    else {
        return json_error(StatusCode::NOT_FOUND, "Product not found");
    };

    let favorite_id = state.next_favorite_id;
    let rows = state.favorites.entry(q.user_id).or_default();

    if let Some(existing) = rows.iter().find(|f| f.product_id == product.id) {
        return Json(existing.clone()).into_response();
    }

    let row = Favorite {
        id: FavoriteId::new(favorite_id),
        product_id: product.id,
        product,
    };
    rows.push(row.clone());
    state.next_favorite_id += 1;
    Json(row).into_response()
}

async fn remove_favorite(
    State(state): State<SharedState>,
    Path(product_id): Path<i64>,
    Query(q): Query<UserQuery>,
) -> Response {
    let mut state = lock(&state);
    state.counters.favorite_mutations += 1;

    if state.fail_favorite_mutations {
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "injected failure");
    }

    if let Some(rows) = state.favorites.get_mut(&q.user_id) {
        rows.retain(|f| f.product_id != ProductId::new(product_id));
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_products(
    State(state): State<SharedState>,
    Query(q): Query<ProductsQuery>,
) -> Response {
    let mut state = lock(&state);
    state.counters.product_reads += 1;

    let limit = q.limit.unwrap_or(usize::MAX);
    let products: Vec<Product> = state.products.iter().take(limit).cloned().collect();
    Json(products).into_response()
}

async fn get_product(State(state): State<SharedState>, Path(product_id): Path<i64>) -> Response {
    let mut state = lock(&state);
    state.counters.product_reads += 1;

    state
        .products
        .iter()
        .find(|p| p.id == ProductId::new(product_id))
        .cloned()
        .map_or_else(
            || json_error(StatusCode::NOT_FOUND, "Product not found"),
            |product| Json(product).into_response(),
        )
}

async fn get_orders(State(state): State<SharedState>, Query(q): Query<OrdersQuery>) -> Response {
    let mut state = lock(&state);
    state.counters.order_reads += 1;

    let limit = q.limit.unwrap_or(usize::MAX);
    let orders: Vec<Order> = state
        .orders
        .get(&q.user_id)
        .map(|orders| orders.iter().take(limit).cloned().collect())
        .unwrap_or_default();
    Json(orders).into_response()
}

async fn agent_chat(State(state): State<SharedState>, Json(body): Json<ChatBody>) -> Response {
    let mut state = lock(&state);
    state.counters.chat_messages += 1;

    let who = body
        .user_id
        .map_or_else(|| "guest".to_string(), |id| format!("user {id}"));
    let output = format!(
        "echo: {} (from {who}, authenticated={})",
        body.text, body.is_authenticated
    );
    Json(json!({ "output": output })).into_response()
}
