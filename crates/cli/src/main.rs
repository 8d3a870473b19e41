//! Khaja CLI - migrations, seeding, and admin management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! khaja-cli migrate
//!
//! # Seed the demo catalog
//! khaja-cli seed
//!
//! # Create an admin user
//! khaja-cli admin create -n "Admin Name" -p 9800000000 --password <password>
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the database with the demo catalog
//! - `admin create` - Create admin users

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "khaja-cli")]
#[command(author, version, about = "Khaja CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with the demo catalog
    Seed,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin phone number (the login handle)
        #[arg(short, long)]
        phone: String,

        /// Admin password
        #[arg(long)]
        password: String,
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
        Commands::Seed => commands::seed::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                name,
                phone,
                password,
            } => {
                commands::admin::create_user(&name, &phone, &password).await?;
            }
        },
    }
    Ok(())
}
