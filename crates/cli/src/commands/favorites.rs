//! Favorites commands.

#![allow(clippy::print_stdout)]

use tangelo_core::ProductId;

use tangelo_client::state::Storefront;

use super::handle_store_error;

/// List favorites.
pub fn list(storefront: &Storefront) {
    let favorites = storefront.favorites().items();

    if favorites.is_empty() {
        if storefront.session().is_authenticated() {
            println!("Your wishlist is currently empty.");
        } else {
            println!("Please log in to view and manage your favorite items.");
        }
        return;
    }

    for favorite in &favorites {
        println!(
            "{:>6}  {:<40}  ${}",
            favorite.product.id, favorite.product.title, favorite.product.price
        );
    }
    println!("{} favorite(s)", favorites.len());
}

/// Add a product to favorites.
pub async fn add(
    storefront: &Storefront,
    product_id: ProductId,
) -> Result<(), Box<dyn std::error::Error>> {
    match storefront.favorites().add(product_id).await {
        Ok(favorite) => {
            println!("Added to favorites: {}", favorite.product.title);
            Ok(())
        }
        Err(error) => handle_store_error(error),
    }
}

/// Remove a product from favorites.
pub async fn remove(
    storefront: &Storefront,
    product_id: ProductId,
) -> Result<(), Box<dyn std::error::Error>> {
    match storefront.favorites().remove(product_id).await {
        Ok(()) => {
            println!("Removed from favorites.");
            Ok(())
        }
        Err(error) => handle_store_error(error),
    }
}
