//! REST client for the retail backend.
//!
//! One method per backend endpoint, all returning typed responses. Bodies
//! are read as text first so non-success statuses and parse failures can be
//! diagnosed from the raw payload; the backend's `{"detail": ...}` error
//! body is surfaced verbatim when present.

pub mod types;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use tangelo_core::{Email, ProductId, UserId};

use crate::config::ClientConfig;
use crate::error::ApiError;

use types::{
    AddFavoriteRequest, AddToCartRequest, CartItem, ChatRequest, ChatResponse, ErrorBody,
    Favorite, Identity, LoginRequest, Order, Product,
};

/// How much of an unparseable body to carry into error messages.
const BODY_EXCERPT_LEN: usize = 200;

/// Client for the retail backend REST API.
///
/// Cheaply cloneable; all clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("{}{path_and_query}", self.inner.base_url)
    }

    /// Issue a request and parse a JSON response body.
    async fn expect_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let text = self.expect_success(request).await?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %excerpt(&text),
                "failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// Issue a request, check the status, and return the raw body.
    async fn expect_success(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }

        // Prefer the backend's own detail message
        let detail = serde_json::from_str::<ErrorBody>(&text)
            .map_or_else(|_| excerpt(&text), |body| body.detail);

        tracing::debug!(status = %status, detail = %detail, "backend returned error");

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(detail));
        }

        Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, ApiError> {
        self.expect_json(self.inner.client.get(self.url(path_and_query)))
            .await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path_and_query: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.expect_json(self.inner.client.post(self.url(path_and_query)).json(body))
            .await
    }

    async fn delete(&self, path_and_query: &str) -> Result<(), ApiError> {
        self.expect_success(self.inner.client.delete(self.url(path_and_query)))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the backend's detail message on bad
    /// credentials, or a transport/parse error.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &str) -> Result<Identity, ApiError> {
        let request = LoginRequest {
            email: email.as_str(),
            password,
        };
        self.post_json("/users/login", &request).await
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the full cart for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn cart(&self, user_id: UserId) -> Result<Vec<CartItem>, ApiError> {
        self.get_json(&format!("/cart/?user_id={user_id}")).await
    }

    /// Add one unit of a product to a user's cart.
    ///
    /// The backend increments the existing line if the product is already in
    /// the cart, and returns the authoritative resulting line either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_cart_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItem, ApiError> {
        let request = AddToCartRequest {
            product_id,
            quantity,
        };
        self.post_json(&format!("/cart/?user_id={user_id}"), &request)
            .await
    }

    /// Remove a product's line from a user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove_cart_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        self.delete(&format!("/cart/{product_id}?user_id={user_id}"))
            .await
    }

    /// Remove every line from a user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear_cart(&self, user_id: UserId) -> Result<(), ApiError> {
        self.delete(&format!("/cart/?user_id={user_id}")).await
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Fetch a user's favorites.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn favorites(&self, user_id: UserId) -> Result<Vec<Favorite>, ApiError> {
        self.get_json(&format!("/favorites/?user_id={user_id}"))
            .await
    }

    /// Add a product to a user's favorites; returns the created row.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_favorite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Favorite, ApiError> {
        let request = AddFavoriteRequest { product_id };
        self.post_json(&format!("/favorites/?user_id={user_id}"), &request)
            .await
    }

    /// Remove a product from a user's favorites.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove_favorite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        self.delete(&format!("/favorites/{product_id}?user_id={user_id}"))
            .await
    }

    // =========================================================================
    // Catalog & Orders (read-only)
    // =========================================================================

    /// Fetch the product list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, limit: u32) -> Result<Vec<Product>, ApiError> {
        self.get_json(&format!("/products/?limit={limit}")).await
    }

    /// Fetch a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: ProductId) -> Result<Product, ApiError> {
        self.get_json(&format!("/products/{product_id}")).await
    }

    /// Fetch a user's order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn orders(&self, user_id: UserId, limit: u32) -> Result<Vec<Order>, ApiError> {
        self.get_json(&format!("/orders/?user_id={user_id}&limit={limit}"))
            .await
    }

    // =========================================================================
    // Agent chat proxy
    // =========================================================================

    /// Send a message to the chat automation proxy.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, request))]
    pub async fn agent_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        self.post_json("/agent/chat", request).await
    }
}

/// Truncate a body for log/error messages.
fn excerpt(text: &str) -> String {
    text.chars().take(BODY_EXCERPT_LEN).collect()
}
