//! Login, logout, and identity inspection.

#![allow(clippy::print_stdout)]

use secrecy::SecretString;

use tangelo_client::state::Storefront;

/// Log in and report the synced session.
pub async fn login(
    storefront: &Storefront,
    email: &str,
    password: SecretString,
) -> Result<(), Box<dyn std::error::Error>> {
    let identity = storefront.login(email, password).await?;

    println!("Welcome back, {}!", identity.name);
    println!(
        "Cart: {} item(s), favorites: {}",
        storefront.cart().total_items(),
        storefront.favorites().items().len()
    );
    Ok(())
}

/// Log out; the cart and favorites empty locally with no backend call.
pub async fn logout(storefront: &Storefront) {
    storefront.logout().await;
    println!("Logged out.");
}

/// Show the current identity.
pub fn whoami(storefront: &Storefront) {
    match storefront.session().identity() {
        Some(identity) => {
            println!("{} <{}> (user {})", identity.name, identity.email, identity.id);
        }
        None => println!("Not logged in (guest)."),
    }
}
