//! Lodestone database tool (`lodestone-db`)
//!
//! Operator commands for accounts, profiles and capes, run against the
//! configured database without going through the HTTP API.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use lodestone::{
    account::AccountManager,
    config::ServerConfig,
    db,
    profile::{ProfilePrivileges, ProfileResolver},
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "lodestone-db")]
#[command(author, version, about = "Manage the Lodestone database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    AddAccount {
        email: String,
        password: String,
        /// Preferred language, e.g. en-us
        language: String,
        /// Registration country, e.g. US
        country: String,
    },

    /// Create a profile owned by an account
    AddProfile {
        name: String,
        owner_id: i64,

        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        chat: bool,

        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        multiplayer: bool,

        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        realms: bool,

        #[arg(long, default_value_t = false, action = ArgAction::Set)]
        profanity_filter: bool,
    },

    /// Change the password of the account with the given email
    UpdatePassword { email: String, new_password: String },

    /// Register a cape
    AddCape {
        /// Identifier used in URLs and requests
        name: String,
        /// Display name
        alias: String,
    },

    /// Give a profile a cape
    GrantCape {
        profile_name: String,
        cape_name: String,

        /// Also make it the active cape
        #[arg(long)]
        activate: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ServerConfig::from_env().context("failed to load configuration")?;

    let path = &config.storage.database;
    if !path.exists() {
        bail!(
            "The database {} does not exist. Start the server once to create it.",
            path.display()
        );
    }

    let pool = db::create_pool(path, db::DatabaseOptions::default()).await?;
    db::run_migrations(&pool).await?;

    let config = Arc::new(config);
    let accounts = AccountManager::new(pool.clone(), config.authentication.clone());
    let profiles = ProfileResolver::new(pool, config);

    match cli.command {
        Commands::AddAccount {
            email,
            password,
            language,
            country,
        } => {
            let account = accounts
                .create_account(&email, &password, &language, &country)
                .await?;
            println!("Created account {} with id {}", account.email, account.id);
        }
        Commands::AddProfile {
            name,
            owner_id,
            chat,
            multiplayer,
            realms,
            profanity_filter,
        } => {
            let privileges = ProfilePrivileges {
                chat,
                multiplayer,
                realms,
                profanity_filter,
            };
            let profile = profiles.create_profile(&name, owner_id, privileges).await?;
            println!("Created profile {} ({})", profile.name, profile.uuid);
        }
        Commands::UpdatePassword {
            email,
            new_password,
        } => {
            let account = accounts
                .get_account_by_email(&email)
                .await?
                .with_context(|| format!("no account with email {}", email))?;
            accounts.update_password(account.id, &new_password).await?;
            println!("Updated password for {}", email);
        }
        Commands::AddCape { name, alias } => {
            let cape = profiles.create_cape(&name, &alias).await?;
            println!("Created cape {} with id {}", cape.name, cape.id);
        }
        Commands::GrantCape {
            profile_name,
            cape_name,
            activate,
        } => {
            let profile = profiles
                .profile_by_name(&profile_name)
                .await?
                .with_context(|| format!("no profile named {}", profile_name))?;
            profiles.grant_cape(&profile, &cape_name).await?;

            if activate {
                // Re-read so the ownership check sees the grant
                let profile = profiles
                    .get_profile(profile.id)
                    .await?
                    .context("profile disappeared")?;
                profiles.set_active_cape(&profile, Some(&cape_name)).await?;
            }
            println!("Granted cape {} to {}", cape_name, profile_name);
        }
    }

    Ok(())
}
