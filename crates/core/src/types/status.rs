//! Status enums for various entities.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Order status as reported by the backend.
///
/// The backend stores statuses as free-form lowercase strings, so this enum
/// keeps an `Unknown` fallback rather than failing deserialization on a
/// value introduced server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}
