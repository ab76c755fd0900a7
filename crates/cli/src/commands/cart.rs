//! Cart commands.

#![allow(clippy::print_stdout)]

use tangelo_core::ProductId;

use tangelo_client::state::Storefront;

use super::handle_store_error;

/// Show the cart snapshot.
pub fn show(storefront: &Storefront) {
    let items = storefront.cart().items();

    if items.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for item in &items {
        println!(
            "{:>3} x {:<40} ${} each (#{})",
            item.quantity, item.product.title, item.product.price, item.product.id
        );
    }
    println!("Total items: {}", storefront.cart().total_items());
}

/// Add one unit of a product to the cart.
pub async fn add(
    storefront: &Storefront,
    product_id: ProductId,
) -> Result<(), Box<dyn std::error::Error>> {
    // Resolve the product first so the confirmation can name it; the
    // backend computes the resulting quantity.
    let product = storefront.catalog().product(product_id).await?;

    match storefront.cart().add(&product).await {
        Ok(line) => {
            println!(
                "Added to cart: {} (quantity now {})",
                line.product.title, line.quantity
            );
            show(storefront);
            Ok(())
        }
        Err(error) => handle_store_error(error),
    }
}

/// Remove a product's line from the cart.
pub async fn remove(
    storefront: &Storefront,
    product_id: ProductId,
) -> Result<(), Box<dyn std::error::Error>> {
    match storefront.cart().remove(product_id).await {
        Ok(()) => {
            println!("Removed from cart.");
            show(storefront);
            Ok(())
        }
        Err(error) => handle_store_error(error),
    }
}

/// Remove every line from the cart.
pub async fn clear(storefront: &Storefront) -> Result<(), Box<dyn std::error::Error>> {
    match storefront.cart().clear().await {
        Ok(()) => {
            println!("Cart cleared.");
            Ok(())
        }
        Err(error) => handle_store_error(error),
    }
}
