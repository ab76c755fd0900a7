//! Retail assistant chat.

#![allow(clippy::print_stdout)]

use tangelo_client::state::Storefront;

/// Send one message and print the reply.
pub async fn send(
    storefront: &Storefront,
    message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let message = message.trim();
    if message.is_empty() {
        println!("Nothing to send.");
        return Ok(());
    }

    let reply = storefront.chat(message).await?;
    println!("{reply}");
    Ok(())
}
