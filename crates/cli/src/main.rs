//! Tangelo CLI - terminal front-end for the storefront.
//!
//! Each invocation is one storefront session: the persisted identity is
//! restored at startup (no backend revalidation), the command runs against
//! the shared stores, and state changes (login/logout) persist for the next
//! invocation.
//!
//! # Usage
//!
//! ```bash
//! tangelo login --email ada@example.com --password hunter2
//! tangelo products --limit 20
//! tangelo cart add 9
//! tangelo cart show
//! tangelo favorites add 5
//! tangelo orders
//! tangelo chat "where is my order?"
//! tangelo logout
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
// The CLI is the presentation layer; printing is its job.
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};
use secrecy::SecretString;

use tangelo_client::config::ClientConfig;
use tangelo_client::state::Storefront;

mod commands;

#[derive(Parser)]
#[command(name = "tangelo")]
#[command(author, version, about = "Tangelo storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session identity
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Log out and discard the persisted identity
    Logout,
    /// Show the current identity
    Whoami,
    /// List catalog products
    Products {
        /// Maximum number of products to list
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    /// Show one product
    Product {
        /// Product ID
        id: i64,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Show order history
    Orders {
        /// Maximum number of orders to show
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Ask the retail assistant
    Chat {
        /// Message text
        message: Vec<String>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: i64,
    },
    /// Remove a product's line
    Remove {
        /// Product ID
        product_id: i64,
    },
    /// Remove everything
    Clear,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorites
    List,
    /// Add a product to favorites
    Add {
        /// Product ID
        product_id: i64,
    },
    /// Remove a product from favorites
    Remove {
        /// Product ID
        product_id: i64,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tangelo=warn".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let result = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let storefront = Storefront::connect(config).await?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::session::login(&storefront, &email, SecretString::from(password)).await?;
        }
        Commands::Logout => commands::session::logout(&storefront).await,
        Commands::Whoami => commands::session::whoami(&storefront),
        Commands::Products { limit } => commands::catalog::products(&storefront, limit).await?,
        Commands::Product { id } => commands::catalog::product(&storefront, id.into()).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&storefront),
            CartAction::Add { product_id } => {
                commands::cart::add(&storefront, product_id.into()).await?;
            }
            CartAction::Remove { product_id } => {
                commands::cart::remove(&storefront, product_id.into()).await?;
            }
            CartAction::Clear => commands::cart::clear(&storefront).await?,
        },
        Commands::Favorites { action } => match action {
            FavoritesAction::List => commands::favorites::list(&storefront),
            FavoritesAction::Add { product_id } => {
                commands::favorites::add(&storefront, product_id.into()).await?;
            }
            FavoritesAction::Remove { product_id } => {
                commands::favorites::remove(&storefront, product_id.into()).await?;
            }
        },
        Commands::Orders { limit } => commands::catalog::orders(&storefront, limit).await?,
        Commands::Chat { message } => {
            commands::chat::send(&storefront, &message.join(" ")).await?;
        }
    }
    Ok(())
}
