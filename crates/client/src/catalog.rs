//! Read-only product catalog with an in-memory cache.
//!
//! Products are reference data fetched from the backend and never mutated
//! by this client, so reads are cached with `moka` (5-minute TTL).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use tangelo_core::ProductId;

use crate::api::ApiClient;
use crate::api::types::Product;
use crate::error::ApiError;

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Cached catalog values.
#[derive(Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}

/// Cached, read-only access to the product catalog.
///
/// Cheaply cloneable; all clones share the cache.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    api: ApiClient,
    cache: Cache<String, CacheValue>,
}

impl Catalog {
    /// Create a catalog backed by the given API client.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(CatalogInner { api, cache }),
        }
    }

    /// Get the product list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn products(&self, limit: u32) -> Result<Vec<Product>, ApiError> {
        let cache_key = format!("products:{limit}");

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("cache hit for product list");
            return Ok(products);
        }

        let products = self.inner.api.products(limit).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist, or
    /// another error if the request fails.
    pub async fn product(&self, product_id: ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{product_id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("cache hit for product");
            return Ok(*product);
        }

        let product = self.inner.api.product(product_id).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
