use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::ConfigError;

/// Subreddit configuration as written on disk.
///
/// ```yaml
/// default:
///   - earthporn
///   - spaceporn
/// custom:
///   - chats: [-1001234, 42]
///     subreddits: [cityporn]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default)]
    pub default: Vec<String>,

    #[serde(default)]
    pub custom: Vec<CustomRouting>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomRouting {
    #[serde(default)]
    pub chats: Vec<i64>,

    #[serde(default)]
    pub subreddits: Vec<String>,
}

impl RoutingConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Flatten the custom blocks into a per-chat lookup. A chat listed in
    /// more than one block keeps the last block's subreddits.
    pub fn into_table(self) -> Result<ChannelRoutingTable, ConfigError> {
        let mut overrides = HashMap::new();
        for custom in self.custom {
            for chat in custom.chats {
                overrides.insert(chat, custom.subreddits.clone());
            }
        }

        ChannelRoutingTable::new(self.default, overrides)
    }
}

/// Immutable chat → channel list lookup, shared read-only for the process
/// lifetime. Every list in the table is non-empty.
#[derive(Debug, Clone)]
pub struct ChannelRoutingTable {
    default: Vec<String>,
    overrides: HashMap<i64, Vec<String>>,
}

impl ChannelRoutingTable {
    pub fn new(
        default: Vec<String>,
        overrides: HashMap<i64, Vec<String>>,
    ) -> Result<Self, ConfigError> {
        let default = clean_channels(default, "default")?;
        let overrides = overrides
            .into_iter()
            .map(|(chat, channels)| {
                clean_channels(channels, &format!("chat {}", chat)).map(|c| (chat, c))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(Self { default, overrides })
    }

    /// Channels eligible for `chat_id`: its override list if any, else the
    /// default list.
    pub fn channels_for(&self, chat_id: i64) -> &[String] {
        self.overrides
            .get(&chat_id)
            .map(Vec::as_slice)
            .unwrap_or(self.default.as_slice())
    }

    pub fn default_channels(&self) -> &[String] {
        &self.default
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

fn clean_channels(channels: Vec<String>, owner: &str) -> Result<Vec<String>, ConfigError> {
    let cleaned: Vec<String> = channels
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    if cleaned.is_empty() {
        return Err(ConfigError::EmptyChannelList(owner.to_string()));
    }
    Ok(cleaned)
}
