//! Printer registry CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database and session-store migrations
//! printers-cli migrate
//!
//! # Create a superuser (password from --password or PRINTERS_USER_PASSWORD)
//! printers-cli user create -u admin --superuser --staff
//!
//! # Let every regular user delete printers
//! printers-cli group grant -g RegularUser -p delete_printer
//!
//! # Insert placeholder printers
//! printers-cli seed --count 5
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "printers-cli")]
#[command(author, version, about = "Printer registry CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage groups and their permissions
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },
    /// Insert placeholder printers
    Seed {
        /// Number of printers to insert
        #[arg(short, long, default_value_t = 1)]
        count: u32,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Password for the new account
        #[arg(long, env = "PRINTERS_USER_PASSWORD", hide_env_values = true)]
        password: String,

        /// Grant every permission
        #[arg(long)]
        superuser: bool,

        /// Mark the account as staff
        #[arg(long)]
        staff: bool,
    },
    /// Raise an existing user's flags
    Promote {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Grant every permission
        #[arg(long)]
        superuser: bool,

        /// Mark the account as staff
        #[arg(long)]
        staff: bool,
    },
    /// Block a user from logging in
    Deactivate {
        /// Login name
        #[arg(short, long)]
        username: String,
    },
}

#[derive(Subcommand)]
enum GroupAction {
    /// Grant a permission to a group (created if missing)
    Grant {
        /// Group name
        #[arg(short, long)]
        group: String,

        /// Permission, e.g. `delete_printer` or `printers.delete_printer`
        #[arg(short, long)]
        permission: String,
    },
    /// Add a user to a group (created if missing)
    AddUser {
        /// Group name
        #[arg(short, long)]
        group: String,

        /// Login name
        #[arg(short, long)]
        username: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                password,
                superuser,
                staff,
            } => {
                commands::users::create_user(&username, &password, superuser, staff).await?;
            }
            UserAction::Promote {
                username,
                superuser,
                staff,
            } => commands::users::promote_user(&username, superuser, staff).await?,
            UserAction::Deactivate { username } => {
                commands::users::deactivate_user(&username).await?;
            }
        },
        Commands::Group { action } => match action {
            GroupAction::Grant { group, permission } => {
                commands::users::grant_permission(&group, &permission).await?;
            }
            GroupAction::AddUser { group, username } => {
                commands::users::add_to_group(&group, &username).await?;
            }
        },
        Commands::Seed { count } => commands::seed::printers(count).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_group_grant() {
        let cli = Cli::try_parse_from([
            "printers-cli",
            "group",
            "grant",
            "-g",
            "RegularUser",
            "-p",
            "delete_printer",
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            cli.command,
            Commands::Group {
                action: GroupAction::Grant { ref group, ref permission }
            } if group == "RegularUser" && permission == "delete_printer"
        ));
    }

    #[test]
    fn test_seed_count_defaults_to_one() {
        let cli = Cli::try_parse_from(["printers-cli", "seed"]).unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(cli.command, Commands::Seed { count: 1 }));
    }
}
