//! Sukoon CLI - Command-line storefront.
//!
//! # Usage
//!
//! ```bash
//! # List products with prices in USD
//! sukoon --currency USD products
//!
//! # Print the checkout link for a product
//! sukoon buy 7Xq2kLm9
//!
//! # Publish a product (admin)
//! sukoon admin --pin "$PIN" add --name Oud --item-code SKN-002 \
//!     --description "Attar" --price 19.99 \
//!     --destination-url https://pay.example/oud --image oud.jpg
//!
//! # Delete a product without the confirmation prompt
//! sukoon admin --pin "$PIN" delete 7Xq2kLm9 --yes
//!
//! # Customer accounts (password is prompted)
//! sukoon account sign-in --email shopper@example.com
//!
//! # Voice search
//! sukoon transcribe query.ogg
//!
//! # Prompt-driven session
//! sukoon interactive
//! ```
//!
//! # Commands
//!
//! - `products` - List products
//! - `buy` - Print a product's checkout link
//! - `admin add` / `admin delete` - Manage inventory
//! - `account sign-in` / `sign-up` / `reset` - Customer accounts
//! - `transcribe` - Transcribe an audio file
//! - `interactive` - Full storefront session

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sukoon_core::{CurrencyCode, ProductId};
use sukoon_storefront::{AppState, ShopConfig, Storefront};

mod commands;

use commands::admin::AddArgs;

#[derive(Parser)]
#[command(name = "sukoon")]
#[command(author, version, about = "Sukoon Shop storefront")]
struct Cli {
    /// Currency prices are shown in
    #[arg(long, global = true, default_value = "PKR")]
    currency: CurrencyCode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products, newest first
    Products,
    /// Print the checkout link for a product
    Buy {
        /// Product ID
        id: String,
    },
    /// Manage inventory (requires the admin PIN)
    Admin {
        /// Admin access PIN (prompted when omitted)
        #[arg(long)]
        pin: Option<String>,

        #[command(subcommand)]
        action: AdminAction,
    },
    /// Customer accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Transcribe an audio file
    Transcribe {
        /// Audio file (webm, ogg, mp3, wav or m4a)
        file: PathBuf,
    },
    /// Start a prompt-driven storefront session
    Interactive,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Publish a new product
    Add(AddArgs),
    /// Delete a product
    Delete {
        /// Product ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Sign in with email and password
    SignIn {
        #[arg(short, long)]
        email: String,
    },
    /// Create an account
    SignUp {
        #[arg(short, long)]
        email: String,
    },
    /// Send a password reset email
    Reset {
        #[arg(short, long)]
        email: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ShopConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
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

    // Sentry must be initialized before the tracing subscriber
    let config = ShopConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sukoon_storefront=info,sukoon_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ShopConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(config)?;
    let mut shop = Storefront::new(state);
    shop.set_currency(cli.currency);

    match cli.command {
        Commands::Products => commands::shop::list(&mut shop).await,
        Commands::Buy { id } => commands::shop::buy(&mut shop, &ProductId::new(id)).await?,
        Commands::Admin { pin, action } => {
            commands::admin::login(&mut shop, pin).await?;
            match action {
                AdminAction::Add(args) => commands::admin::add(&mut shop, args).await?,
                AdminAction::Delete { id, yes } => {
                    commands::admin::delete(&mut shop, &ProductId::new(id), yes).await?;
                }
            }
        }
        Commands::Account { action } => match action {
            AccountAction::SignIn { email } => {
                commands::account::sign_in(&mut shop, email, false).await?;
            }
            AccountAction::SignUp { email } => {
                commands::account::sign_in(&mut shop, email, true).await?;
            }
            AccountAction::Reset { email } => commands::account::reset(&shop, email).await?,
        },
        Commands::Transcribe { file } => commands::transcribe::run(&shop, &file).await?,
        Commands::Interactive => commands::interactive::run(&mut shop).await?,
    }
    Ok(())
}
