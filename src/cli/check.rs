use anyhow::{Context, Result};

use lumber_bot::config::{IngestMode, RoutingConfig, ServerConfig};

use super::ConfigPaths;

pub fn run(paths: &ConfigPaths) -> Result<()> {
    let config = ServerConfig::load(&paths.server).context("Could not read config")?;
    let table = RoutingConfig::load(&paths.subreddits)
        .and_then(RoutingConfig::into_table)
        .context("Could not read subreddits")?;

    println!("Server configuration: {}", paths.server.display());
    match config.ingest_mode()? {
        IngestMode::Polling => {
            println!("  Mode: polling (timeout {}s)", config.poll_timeout);
        }
        IngestMode::Webhook(target) => {
            println!("  Mode: webhook at {}", target.url);
            println!("  Certificate: {}", target.certificate.display());
            println!("  Listening on: {}:{}", target.bind, target.port);
        }
    }
    println!(
        "  Listing: top {} of the {}",
        config.listing_limit, config.listing_window
    );

    println!("Subreddit configuration: {}", paths.subreddits.display());
    println!("  Default: {}", table.default_channels().join(", "));
    println!("  Chats with custom subreddits: {}", table.override_count());

    Ok(())
}
