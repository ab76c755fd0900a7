//! Tangelo client SDK.
//!
//! A typed client for the Tangelo retail backend. The backend owns all
//! durable state; this crate mirrors the slice of it a storefront session
//! needs and keeps that mirror synchronized:
//!
//! - [`session::SessionStore`] - the authenticated identity, restored from a
//!   persisted record at startup and updated on login/logout
//! - [`cart::CartStore`] - the shopping cart for the current identity,
//!   populated on login and discarded on logout
//! - [`favorites::FavoritesStore`] - favorite products, same lifecycle
//! - [`catalog::Catalog`] - read-only product catalog with an in-memory cache
//! - [`agent::AgentClient`] - proxy to the backend's chat automation
//!
//! [`state::Storefront`] wires these together; most callers only need it.
//!
//! # Example
//!
//! ```rust,ignore
//! use secrecy::SecretString;
//! use tangelo_client::config::ClientConfig;
//! use tangelo_client::state::Storefront;
//!
//! let config = ClientConfig::from_env()?;
//! let storefront = Storefront::connect(config).await?;
//!
//! storefront.login("user@example.com", SecretString::from("hunter2".to_owned())).await?;
//!
//! let product = storefront.catalog().product(9.into()).await?;
//! storefront.cart().add(&product).await?;
//! assert_eq!(storefront.cart().total_items(), 1);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod agent;
pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod favorites;
pub mod session;
pub mod state;
pub mod storage;
