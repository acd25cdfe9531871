use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use lumber_bot::config::{RoutingConfig, ServerConfig};
use lumber_bot::ingress::{ChannelRouter, Dispatcher, TelegramClient};
use lumber_bot::reddit::{PasswordGrant, RedditClient, TokenKeeper};
use lumber_bot::server::{IngestDriver, PollingSettings};

use super::ConfigPaths;

pub async fn run(paths: &ConfigPaths) -> Result<()> {
    let config = ServerConfig::load(&paths.server).context("Could not read config")?;
    let routing = RoutingConfig::load(&paths.subreddits)
        .and_then(RoutingConfig::into_table)
        .context("Could not read subreddits")?;
    let mode = config.ingest_mode()?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl-C, shutting down"),
                Err(e) => warn!("Could not listen for Ctrl-C: {}", e),
            }
            cancel.cancel();
        });
    }

    let reddit_http = reqwest::Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(5))
        .connect_timeout(Duration::from_secs(10))
        .timeout(config.request_timeout())
        .build()?;
    // Must outlast the long-poll timeout
    let telegram_http = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .pool_idle_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(config.poll_timeout + 15))
        .build()?;

    let grant = PasswordGrant::new(
        reddit_http.clone(),
        config.username.clone(),
        config.password.clone(),
        config.clientid.clone(),
        config.clientsecret.clone(),
        config.user_agent.clone(),
    );
    let tokens = TokenKeeper::start(
        Arc::new(grant),
        config.token_refresh_interval(),
        cancel.clone(),
    )
    .await
    .context("Could not initialize reddit client")?;
    let reddit = RedditClient::new(reddit_http, tokens, config.user_agent.clone());

    let telegram = Arc::new(TelegramClient::new(telegram_http, config.bottoken.clone()));
    let dispatcher = Arc::new(
        Dispatcher::new(
            ChannelRouter::new(routing),
            Arc::new(reddit),
            telegram.clone(),
            &config.bot_username,
        )
        .with_listing(config.listing_window, config.listing_limit),
    );

    let driver = IngestDriver::prepare(
        mode,
        telegram,
        dispatcher,
        PollingSettings::from_config(&config),
    )
    .await
    .context("Could not register webhook")?;

    info!("Starting in {} mode", driver.name());
    driver.run(cancel).await
}
