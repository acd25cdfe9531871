pub mod check;
pub mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lumber-bot")]
#[command(
    author,
    version,
    about = "Serve a random top post of the week from your favourite subreddits to Telegram"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to server configuration
    #[arg(long, global = true, env = "LUMBER_BOT_SERVERCONF")]
    pub serverconf: Option<PathBuf>,

    /// Path to subreddit configuration
    #[arg(long, global = true, env = "LUMBER_BOT_SUBREDDITCONF")]
    pub subredditconf: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand, Clone, Copy, Default)]
pub enum Commands {
    /// Run the bot (default)
    #[default]
    Run,

    /// Validate both configuration files and exit
    Check,
}

/// Both configuration files the bot needs to start.
pub struct ConfigPaths {
    pub server: PathBuf,
    pub subreddits: PathBuf,
}

impl Cli {
    pub fn config_paths(&self) -> Result<ConfigPaths> {
        let server = self
            .serverconf
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Server configuration needs to be supplied"))?;
        let subreddits = self
            .subredditconf
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Subreddit configuration needs to be supplied"))?;

        Ok(ConfigPaths { server, subreddits })
    }
}
