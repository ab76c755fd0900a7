//! Tangelo Core - Shared types library.
//!
//! This crate provides common types used across all Tangelo components:
//! - `client` - The storefront SDK (session, cart, favorites, catalog)
//! - `cli` - The `tangelo` terminal front-end
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
