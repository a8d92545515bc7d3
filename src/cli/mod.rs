//! CLI module for Portfolio Accounts
//!
//! Provides subcommands:
//! - `serve`: run the HTTP API
//! - `migrate`: apply PostgreSQL schema migrations

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;

/// Portfolio Accounts - user accounts for a personal portfolio dashboard
#[derive(Parser)]
#[command(name = "portfolio-accounts")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Apply pending database migrations and exit
    Migrate,
}

/// Read `.env`, load configuration and install logging
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    Ok(config)
}
