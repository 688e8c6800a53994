//! Millet Market CLI - browse the catalog, build a cart, place and track orders.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! mm-cli products
//! mm-cli product 12
//!
//! # Sign in / out
//! mm-cli login -e ravi@fpo.in -p '...'
//! mm-cli whoami
//! mm-cli logout
//!
//! # Build a cart and check out
//! mm-cli shell
//!
//! # Orders
//! mm-cli orders
//! mm-cli order 31
//! ```
//!
//! # Configuration
//!
//! See `millet_market_client::config` for the environment variables
//! (`MILLET_API_BASE_URL` is required). Logging follows `RUST_LOG`; set
//! `MILLET_LOG_FORMAT=json` for JSON log lines.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use millet_market_client::api::Registration;
use millet_market_client::{AppContext, ClientConfig};
use millet_market_core::{OrderId, ProductId, UserRole};
use secrecy::SecretString;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "mm-cli")]
#[command(author, version, about = "Millet Market command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Products {
        /// Bypass the in-memory catalog cache
        #[arg(long)]
        refresh: bool,
    },
    /// Show one product
    Product {
        /// Product ID
        id: ProductId,
    },
    /// Sign in
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "MILLET_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "MILLET_PASSWORD", hide_env_values = true)]
        password: String,

        /// Role (`farmer`, `shg_fpo`, `consumer`)
        #[arg(short, long, default_value = "consumer")]
        role: UserRole,

        /// City
        #[arg(long)]
        city: Option<String>,

        /// Street address
        #[arg(long)]
        street: Option<String>,

        /// Mobile number
        #[arg(long)]
        mobile: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List your orders
    Orders,
    /// Track one order
    Order {
        /// Order ID
        id: OrderId,
    },
    /// Interactive cart shell
    Shell,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output on stdout stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "millet_market_cli=info,millet_market_client=warn".into());

    // MILLET_LOG_FORMAT=json for structured logs, text otherwise
    let is_json = std::env::var("MILLET_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let json_layer = is_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!is_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> millet_market_client::Result<()> {
    let config = ClientConfig::from_env()?;
    let mut ctx = AppContext::from_config(config).await?;

    match cli.command {
        Commands::Products { refresh } => commands::catalog::list(&ctx, refresh).await?,
        Commands::Product { id } => commands::catalog::show(&ctx, id).await?,
        Commands::Login { email, password } => {
            commands::account::login(&ctx, &email, SecretString::from(password)).await?;
        }
        Commands::Register {
            name,
            email,
            password,
            role,
            city,
            street,
            mobile,
        } => {
            let registration = Registration {
                name,
                email,
                password: SecretString::from(password),
                role,
                city,
                street,
                mobile,
            };
            commands::account::register(&ctx, registration).await?;
        }
        Commands::Logout => commands::account::logout(&ctx).await?,
        Commands::Whoami => commands::account::whoami(&ctx)?,
        Commands::Orders => commands::orders::list(&ctx).await?,
        Commands::Order { id } => commands::orders::track(&ctx, id).await?,
        Commands::Shell => commands::shell::run(&mut ctx).await?,
    }
    Ok(())
}
