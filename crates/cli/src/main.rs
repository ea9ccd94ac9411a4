//! Curbside CLI - Database migrations and administrator management.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! curbside-cli migrate
//!
//! # Create an administrator
//! curbside-cli admin create -e admin@example.com -n "Admin Name" -p 'long-password'
//!
//! # Promote an existing user
//! curbside-cli admin promote -e someone@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create an administrator
//! - `admin promote` - Set the administrator flag on an existing user

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "curbside-cli")]
#[command(author, version, about = "Curbside CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage administrators
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new administrator
    Create {
        /// Administrator email address
        #[arg(short, long)]
        email: String,

        /// Administrator display name
        #[arg(short, long)]
        name: String,

        /// Initial password (min 6 characters)
        #[arg(short, long, env = "CURBSIDE_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Grant the administrator flag to an existing user
    Promote {
        /// Email address of the user
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&email, &name, SecretString::from(password)).await?;
            }
            AdminAction::Promote { email } => {
                commands::admin::promote(&email).await?;
            }
        },
    }
    Ok(())
}
