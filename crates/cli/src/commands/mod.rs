//! Command implementations, one module per storefront area.

pub mod cart;
pub mod catalog;
pub mod chat;
pub mod favorites;
pub mod session;

use tangelo_client::error::StoreError;

/// Map an auth-required store error to a friendly hint; everything else
/// propagates to the top-level handler.
fn handle_store_error(error: StoreError) -> Result<(), Box<dyn std::error::Error>> {
    if matches!(error, StoreError::AuthRequired) {
        #[allow(clippy::print_stdout)]
        {
            println!("Please log in first: tangelo login --email <email> --password <password>");
        }
        return Ok(());
    }
    Err(error.into())
}
