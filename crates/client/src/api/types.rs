//! Wire types for the retail backend REST API.
//!
//! Field names mirror the backend JSON exactly - they are the contract.
//! Unknown fields in responses are ignored so additive backend changes do
//! not break the client.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tangelo_core::{CartLineId, Email, FavoriteId, OrderId, OrderStatus, ProductId, UserId};

/// A catalog product.
///
/// `ean` and stock `quantity` are only populated by the product-detail
/// endpoint; list responses omit them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub category: String,
    /// Unit price. The backend emits a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub rating: f64,
    pub vendor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ean: Option<String>,
    /// Stock on hand, not cart quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

/// The logged-in user's profile, as returned by login and as persisted
/// locally between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

/// One line in a user's cart: a product and its quantity.
///
/// The backend may omit the row `id` on some responses, and the client never
/// needs it - lines are keyed by `product.id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CartLineId>,
    pub product: Product,
    pub quantity: u32,
}

/// A favorites row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: FavoriteId,
    pub product_id: ProductId,
    pub product: Product,
}

/// An order history row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub status: OrderStatus,
    /// The ordered product. Historical orders can reference deleted
    /// products, so this is optional.
    #[serde(default)]
    pub product: Option<Product>,
}

/// Body for `POST /users/login`.
///
/// `Debug` is implemented manually to redact the password.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl std::fmt::Debug for LoginRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body for `POST /cart/?user_id={id}`.
#[derive(Debug, Clone, Serialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body for `POST /favorites/?user_id={id}`.
#[derive(Debug, Clone, Serialize)]
pub struct AddFavoriteRequest {
    pub product_id: ProductId,
}

/// Body for `POST /agent/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub text: String,
    pub user_id: Option<UserId>,
    pub is_authenticated: bool,
}

/// Response from `POST /agent/chat`. The workflow engine behind the proxy
/// is opaque; `output` can be absent when it produces nothing.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub output: Option<String>,
}

/// Error body returned by the backend on non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserializes_list_shape() {
        let json = r#"{
            "id": 9,
            "title": "Wireless Mouse",
            "category": "electronics",
            "price": 24.99,
            "rating": 4.5,
            "vendor": "Acme"
        }"#;
        let product: Product = serde_json::from_str(json).expect("deserialize");
        assert_eq!(product.id, ProductId::new(9));
        assert_eq!(product.price, "24.99".parse().expect("decimal"));
        assert!(product.ean.is_none());
        assert!(product.quantity.is_none());
    }

    #[test]
    fn test_cart_item_without_row_id() {
        let json = r#"{
            "product": {
                "id": 5, "title": "Mug", "category": "home",
                "price": 10.0, "rating": 3.9, "vendor": "Acme"
            },
            "quantity": 2
        }"#;
        let item: CartItem = serde_json::from_str(json).expect("deserialize");
        assert!(item.id.is_none());
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_identity_ignores_extra_fields() {
        let json = r#"{"id": 7, "name": "Ada", "email": "ada@example.com", "is_admin": false}"#;
        let identity: Identity = serde_json::from_str(json).expect("deserialize");
        assert_eq!(identity.id, UserId::new(7));
        assert_eq!(identity.email.as_str(), "ada@example.com");
    }

    #[test]
    fn test_order_with_missing_product() {
        let json = r#"{
            "id": 3,
            "created_at": "2026-02-01T12:00:00Z",
            "total": 49.5,
            "status": "shipped"
        }"#;
        let order: Order = serde_json::from_str(json).expect("deserialize");
        assert_eq!(order.status, OrderStatus::Shipped);
        assert!(order.product.is_none());
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let request = LoginRequest {
            email: "ada@example.com",
            password: "hunter2",
        };
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
