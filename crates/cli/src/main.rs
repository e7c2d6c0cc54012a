//! Menuforge CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! mf-cli migrate
//!
//! # Create an admin user
//! mf-cli admin create -e admin@example.com -n "Admin Name" -r super_admin
//! mf-cli admin create -e store@example.com -n "Store Admin" -r store_admin --store-id 5
//!
//! # Seed a demo catalog for local development
//! mf-cli seed
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create admin users
//! - `seed` - Seed the database with a demo brand, stores and catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mf-cli")]
#[command(author, version, about = "Menuforge CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database with demo data
    Seed,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin role (`super_admin`, `brand_admin`, `store_admin`)
        #[arg(short, long)]
        role: String,

        /// Store context, required for `store_admin`
        #[arg(long)]
        store_id: Option<i32>,

        /// Brand context, required for `brand_admin`
        #[arg(long)]
        brand_id: Option<i32>,
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
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                role,
                store_id,
                brand_id,
            } => {
                commands::admin::create_user(&email, &name, &role, store_id, brand_id).await?;
            }
        },
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}
