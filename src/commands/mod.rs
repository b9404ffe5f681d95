//! CLI command definitions and dispatch.

pub mod guard;
pub mod session;
pub mod watch;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use shiphub_auth::{HttpAuthClient, SessionStore};
use shiphub_core::config::AppConfig;
use shiphub_core::result::AppResult;
use shiphub_storage::StorageManager;

use crate::output::OutputFormat;

/// ShipHub — shipping dashboard client
#[derive(Debug, Parser)]
#[command(name = "shiphub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/shiphub.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in and persist the session
    Login(session::LoginArgs),
    /// Sign out and clear the stored session
    Logout,
    /// Restore and show the stored session
    Status,
    /// Follow realtime notifications for the stored session
    Watch(watch::WatchArgs),
    /// Evaluate a role guard against the stored session
    Guard(guard::GuardArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        let session = build_session(&config).await?;

        match &self.command {
            Commands::Login(args) => session::login(args, &session).await,
            Commands::Logout => session::logout(&session).await,
            Commands::Status => session::status(&session, self.format).await,
            Commands::Watch(args) => watch::execute(args, &config, &session, self.format).await,
            Commands::Guard(args) => guard::execute(args, &session, self.format).await,
        }
    }
}

/// Helper: build the session store from configuration
pub async fn build_session(config: &AppConfig) -> AppResult<Arc<SessionStore>> {
    let storage = StorageManager::new(&config.storage).await?.provider();
    let api = HttpAuthClient::new(&config.api, storage.clone())?;
    Ok(Arc::new(SessionStore::new(Arc::new(api), storage)))
}
