//! Error types for the client SDK.
//!
//! Two layers: [`ApiError`] covers everything that can go wrong talking to
//! the backend, [`StoreError`] adds the purely local pre-flight failures a
//! store can produce without issuing a request. Store operations never leave
//! partial local state behind - on any error the local mirror is exactly
//! what it was before the call.

use thiserror::Error;

use tangelo_core::EmailError;

/// Errors from the backend REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection refused, timeout, etc.).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success status with a detail message.
    #[error("backend returned {status}: {detail}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Human-readable detail from the error body (or a body excerpt).
        detail: String,
    },

    /// Response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Operation requires a logged-in identity. No request was issued and
    /// no local state was touched.
    #[error("authentication required")]
    AuthRequired,

    /// Backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Email failed local validation before any request was issued.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

impl StoreError {
    /// Whether this error was raised before any backend request.
    #[must_use]
    pub const fn is_preflight(&self) -> bool {
        matches!(self, Self::AuthRequired | Self::InvalidEmail(_))
    }
}
