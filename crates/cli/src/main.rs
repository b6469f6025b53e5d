//! ZENBUY CLI - browse the catalog, manage the cart, and check out from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List products under ₹500 in the Home category that are in stock
//! zenbuy products --max 500 --category Home --in-stock
//!
//! # Add two of product 12 to the cart, then check out with cash on delivery
//! zenbuy cart add 12 --quantity 2
//! zenbuy login -e asha@example.com
//! zenbuy checkout cod --coupon SAVE10
//!
//! # Order history
//! zenbuy orders
//! ```
//!
//! # Commands
//!
//! - `products` / `categories` - Browse the catalog
//! - `cart` - Show and edit the cart
//! - `coupon` - Check a coupon against the cart
//! - `checkout` - Place an order
//! - `orders` - Order history
//! - `theme` - Show or change the colour theme
//! - `login` / `logout` - Account session
//! - `admin` - Admin console (administrators only)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zenbuy_storefront::config::StorefrontConfig;
use zenbuy_storefront::error::Result;

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "zenbuy")]
#[command(author, version, about = "ZENBUY storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products, optionally filtered
    Products(commands::catalog::ProductArgs),
    /// List product categories
    Categories,
    /// Show or edit the cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Check a coupon code against the current cart
    Coupon {
        /// Coupon code (case-insensitive)
        code: String,
    },
    /// Place an order for the current cart
    Checkout(commands::checkout::CheckoutArgs),
    /// Show order history
    Orders,
    /// Show or change the colour theme
    Theme {
        #[arg(value_enum)]
        action: Option<commands::account::ThemeAction>,
    },
    /// Sign in
    Login(commands::account::LoginArgs),
    /// Sign out
    Logout,
    /// Admin console
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(config.sentry_environment.clone().into()),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Map tracing levels to Sentry: errors and warnings become events, info and
/// debug become breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "zenbuy_storefront=info,zenbuy_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let code = match run(cli, config).await {
        Ok(()) => 0,
        Err(e) => {
            e.report();
            tracing::error!("{}", e.user_message());
            1
        }
    };

    // Flush pending Sentry events before exiting
    drop(sentry_guard);
    std::process::exit(code);
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<()> {
    let mut ctx = Context::new(config)?;

    match cli.command {
        Commands::Products(args) => commands::catalog::products(&ctx, &args).await?,
        Commands::Categories => commands::catalog::categories(&ctx).await?,
        Commands::Cart { action } => commands::cart::run(&ctx, action).await?,
        Commands::Coupon { code } => commands::checkout::coupon(&ctx, &code).await?,
        Commands::Checkout(args) => commands::checkout::checkout(&ctx, args).await?,
        Commands::Orders => commands::orders::list(&ctx).await?,
        Commands::Theme { action } => commands::account::theme(&mut ctx, action)?,
        Commands::Login(args) => commands::account::login(&mut ctx, args).await?,
        Commands::Logout => commands::account::logout(&mut ctx)?,
        Commands::Admin { action } => commands::admin::run(&ctx, action).await?,
    }
    Ok(())
}
