//! Emporium CLI - Database migrations and shop management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! emp-cli migrate
//!
//! # Load categories and products from a YAML file
//! emp-cli seed catalog.yaml --clear
//!
//! # Create an admin account
//! emp-cli user create -e admin@example.com -p 'long passphrase' -r admin
//!
//! # Disable an account
//! emp-cli user disable -e shopper@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (fallback `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "emp-cli")]
#[command(author, version, about = "Emporium CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed categories and products from a YAML file
    Seed {
        /// Path to the catalog YAML file
        file: String,

        /// Delete the existing catalog first
        #[arg(long)]
        clear: bool,
    },
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new account
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Role (`customer`, `admin`)
        #[arg(short, long, default_value = "customer")]
        role: String,
    },
    /// Disable an account; its sessions are signed out on their next request
    Disable {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
    /// Re-enable a disabled account
    Enable {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, clear } => {
            commands::seed::catalog(&file, clear).await?;
        }
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                password,
                role,
            } => {
                commands::user::create(&email, &password, &role).await?;
            }
            UserAction::Disable { email } => commands::user::set_enabled(&email, false).await?,
            UserAction::Enable { email } => commands::user::set_enabled(&email, true).await?,
        },
    }
    Ok(())
}
