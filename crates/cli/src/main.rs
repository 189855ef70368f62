//! Parti Poodles CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! pp-cli migrate
//!
//! # Create an admin user
//! pp-cli admin create -u owner -p 'correct horse' -e owner@example.com -r owner
//!
//! # Load parent dogs, litters, puppies and photos from a YAML file
//! pp-cli seed data/seed.yaml
//! ```
//!
//! All commands read `DATABASE_URL` (or `SITE_DATABASE_URL`) from the
//! environment or a `.env` file.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pp-cli")]
#[command(author, version, about = "Parti Poodles CLI tools")]
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
    /// Load records from a YAML seed file
    Seed {
        /// Path to the YAML file
        file: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Login username
        #[arg(short, long)]
        username: String,

        /// Login password
        #[arg(short, long, env = "PP_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,

        /// Contact email address
        #[arg(short, long)]
        email: Option<String>,

        /// Free-form role label, e.g. `owner`
        #[arg(short, long)]
        role: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    // Load .env before parsing so env-backed arguments see it
    let _ = dotenvy::dotenv();

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
                username,
                password,
                email,
                role,
            } => {
                commands::admin::create_user(&username, &password, email, role).await?;
            }
        },
        Commands::Seed { file } => commands::seed::from_file(&file).await?,
    }
    Ok(())
}
