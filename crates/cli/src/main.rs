//! Isra's Cafe CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply schema migrations and create the session tables
//! cafe-cli migrate
//!
//! # Create an admin user (password from ADMIN_PASSWORD or stdin)
//! cafe-cli admin create -e admin@example.com -n "Admin Name"
//!
//! # Load categories and items from YAML
//! cafe-cli seed menu menu.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` or `DATABASE_URL` - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cafe-cli")]
#[command(author, version, about = "Isra's Cafe CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations and create the session tables
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
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
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Upsert categories and menu items from a YAML file
    Menu {
        /// Path to the YAML file
        file: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create { email, name } => {
                commands::admin::create_user(&email, &name).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Menu { file } => commands::seed::menu(&file).await?,
        },
    }
    Ok(())
}
