//! Product browsing and order history.

#![allow(clippy::print_stdout)]

use tangelo_core::ProductId;

use tangelo_client::state::Storefront;

use super::handle_store_error;

/// List catalog products.
pub async fn products(
    storefront: &Storefront,
    limit: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let products = storefront.catalog().products(limit).await?;

    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    for product in &products {
        println!(
            "{:>6}  {:<40}  ${:<8}  {:>4.1}*  {}",
            product.id, product.title, product.price, product.rating, product.vendor
        );
    }
    println!("{} product(s)", products.len());
    Ok(())
}

/// Show one product in detail.
pub async fn product(
    storefront: &Storefront,
    product_id: ProductId,
) -> Result<(), Box<dyn std::error::Error>> {
    let product = storefront.catalog().product(product_id).await?;

    println!("{} (#{})", product.title, product.id);
    println!("  category: {}", product.category);
    println!("  vendor:   {}", product.vendor);
    println!("  price:    ${}", product.price);
    println!("  rating:   {:.1}", product.rating);
    if let Some(ean) = &product.ean {
        println!("  ean:      {ean}");
    }
    if let Some(stock) = product.quantity {
        println!("  in stock: {stock}");
    }
    if storefront.favorites().is_favorite(product.id) {
        println!("  (in your favorites)");
    }
    Ok(())
}

/// Show order history for the logged-in user.
pub async fn orders(
    storefront: &Storefront,
    limit: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let orders = match storefront.orders(limit).await {
        Ok(orders) => orders,
        Err(error) => return handle_store_error(error),
    };

    if orders.is_empty() {
        println!("No orders found yet.");
        return Ok(());
    }

    for order in &orders {
        let title = order
            .product
            .as_ref()
            .map_or("Unknown Product", |p| p.title.as_str());
        println!(
            "#{:<6} {}  {:<12} ${:<8}  {}",
            order.id,
            order.created_at.format("%Y-%m-%d"),
            order.status,
            order.total,
            title
        );
    }
    Ok(())
}
