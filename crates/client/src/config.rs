//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TANGELO_API_URL` - Base URL of the retail backend (http or https)
//!
//! ## Optional
//! - `TANGELO_IDENTITY_FILE` - Path of the persisted identity record
//!   (default: `.tangelo/identity.json`)
//! - `TANGELO_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN (used by the CLI binary)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default location of the persisted identity record.
const DEFAULT_IDENTITY_FILE: &str = ".tangelo/identity.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, normalized without a trailing slash.
    pub base_url: String,
    /// Path of the persisted identity record (the local-storage analog).
    pub identity_path: PathBuf,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = validate_base_url("TANGELO_API_URL", &get_required_env("TANGELO_API_URL")?)?;
        let identity_path =
            PathBuf::from(get_env_or_default("TANGELO_IDENTITY_FILE", DEFAULT_IDENTITY_FILE));
        let timeout_secs = get_env_or_default("TANGELO_REQUEST_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TANGELO_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            base_url,
            identity_path,
            request_timeout: Duration::from_secs(timeout_secs),
            sentry_dsn,
        })
    }

    /// Build a configuration for a known backend URL, with defaults for the
    /// rest. Intended for tests and embedding.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not a valid http(s) URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: validate_base_url("base_url", base_url.as_ref())?,
            identity_path: PathBuf::from(DEFAULT_IDENTITY_FILE),
            request_timeout: Duration::from_secs(30),
            sentry_dsn: None,
        })
    }
}

/// Validate and normalize a backend base URL.
fn validate_base_url(name: &str, raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Get a required environment variable.
fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get an optional environment variable.
fn get_optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
