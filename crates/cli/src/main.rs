//! Catalog CLI - Database migrations and user management.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations (tables for users, products and sessions)
//! catalog-cli migrate
//!
//! # Create a user without going through the registration form
//! CATALOG_NEW_USER_PASSWORD='...' catalog-cli user create -u alice
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(author, version, about = "Catalog CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Password (read from the environment so it stays out of shell history)
        #[arg(long, env = "CATALOG_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create { username, password } => {
                commands::user::create(&username, &password).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_user_create() {
        let cli = Cli::try_parse_from([
            "catalog-cli",
            "user",
            "create",
            "-u",
            "alice",
            "--password",
            "pw123",
        ]);

        let Ok(Cli {
            command: Commands::User {
                action: UserAction::Create { username, password },
            },
        }) = cli
        else {
            panic!("expected user create");
        };
        assert_eq!(username, "alice");
        assert_eq!(password, "pw123");
    }
}
