mod routing;

pub use routing::*;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::reddit::TimeWindow;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse yaml in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Channel list for {0} is empty")]
    EmptyChannelList(String),
}

/// Server configuration: credentials for both upstream services plus the
/// optional public endpoint that switches the bot into webhook mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Reddit account used for the password grant
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Reddit "script" app credentials
    #[serde(default)]
    pub clientid: String,

    #[serde(default)]
    pub clientsecret: String,

    /// Telegram bot token
    #[serde(default)]
    pub bottoken: String,

    /// Public certificate uploaded with the webhook registration
    #[serde(default)]
    pub servercert: Option<String>,

    /// Public host (and optional port) Telegram pushes updates to
    #[serde(default)]
    pub remote: Option<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_bind")]
    pub bind: String,

    /// Long polling timeout in seconds
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout: u64,

    /// Pause between two polling requests
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum number of polled updates handled at the same time
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    #[serde(default = "default_token_refresh_minutes")]
    pub token_refresh_minutes: u64,

    /// Upper bound for a single Reddit request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound for answering one polled update, in seconds
    #[serde(default = "default_dispatch_timeout_secs")]
    pub dispatch_timeout_secs: u64,

    #[serde(default)]
    pub listing_window: TimeWindow,

    #[serde(default = "default_listing_limit")]
    pub listing_limit: u32,

    /// Username used for the `/get@<bot>` command form
    #[serde(default = "default_bot_username")]
    pub bot_username: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// How updates reach the bot. Resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestMode {
    Polling,
    Webhook(WebhookTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookTarget {
    /// URL registered with Telegram
    pub url: String,
    /// Absolute path of the certificate to upload
    pub certificate: PathBuf,
    /// Local route receiving the pushes
    pub path: String,
    pub bind: String,
    pub port: u16,
}

fn default_port() -> u16 {
    5000
}
fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_poll_timeout() -> u64 {
    20
}
fn default_poll_interval_ms() -> u64 {
    250
}
fn default_max_in_flight() -> usize {
    16
}
fn default_token_refresh_minutes() -> u64 {
    45
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_dispatch_timeout_secs() -> u64 {
    90
}
fn default_listing_limit() -> u32 {
    5
}
fn default_bot_username() -> String {
    "kungfu_kenny_bot".to_string()
}
fn default_user_agent() -> String {
    "KungFuKennyBot/0.9 20170501".to_string()
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        // Credentials may be given as ${VAR} references
        config.expand_env_vars();
        config.validate()?;

        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("username", &self.username),
            ("password", &self.password),
            ("clientid", &self.clientid),
            ("clientsecret", &self.clientsecret),
            ("bottoken", &self.bottoken),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} is missing", key)));
            }
        }

        if self.poll_timeout == 0 {
            return Err(ConfigError::Invalid(
                "poll_timeout must be at least 1 second".to_string(),
            ));
        }
        if self.max_in_flight == 0 {
            return Err(ConfigError::Invalid(
                "max_in_flight must be at least 1".to_string(),
            ));
        }
        if self.token_refresh_minutes == 0 {
            return Err(ConfigError::Invalid(
                "token_refresh_minutes must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 || self.dispatch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs and dispatch_timeout_secs must be at least 1".to_string(),
            ));
        }
        // Reddit caps listings at 100 entries
        if self.listing_limit == 0 || self.listing_limit > 100 {
            return Err(ConfigError::Invalid(format!(
                "listing_limit must be between 1 and 100 (got {})",
                self.listing_limit
            )));
        }

        if is_set(&self.remote) != is_set(&self.servercert) {
            warn!("Webhook mode needs both remote and servercert; falling back to polling");
        }

        Ok(())
    }

    /// Resolve the ingest mode: webhook when both a public endpoint and a
    /// certificate are configured, polling otherwise.
    pub fn ingest_mode(&self) -> Result<IngestMode, ConfigError> {
        match (non_blank(&self.remote), non_blank(&self.servercert)) {
            (Some(remote), Some(cert)) => {
                let certificate = std::path::absolute(cert).map_err(|e| {
                    ConfigError::Invalid(format!("Could not resolve servercert {}: {}", cert, e))
                })?;
                let path = format!("/{}", self.bottoken);

                Ok(IngestMode::Webhook(WebhookTarget {
                    url: format!("https://{}{}", remote.trim_end_matches('/'), path),
                    certificate,
                    path,
                    bind: self.bind.clone(),
                    port: self.port,
                }))
            }
            _ => Ok(IngestMode::Polling),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn token_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.token_refresh_minutes * 60)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }

    fn expand_env_vars(&mut self) {
        self.username = expand_env(&self.username);
        self.password = expand_env(&self.password);
        self.clientid = expand_env(&self.clientid);
        self.clientsecret = expand_env(&self.clientsecret);
        self.bottoken = expand_env(&self.bottoken);
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn is_set(value: &Option<String>) -> bool {
    non_blank(value).is_some()
}

fn expand_env(s: &str) -> String {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).unwrap_or_else(|_| s.to_string())
    } else if let Some(var_name) = s.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_else(|_| s.to_string())
    } else {
        s.to_string()
    }
}
