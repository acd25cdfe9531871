use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

use super::error::ContentError;
use super::token::TokenKeeper;
use super::types::{Candidate, ListingResponse, TimeWindow};

/// Source of candidate posts for a channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn top_listings(
        &self,
        channel: &str,
        window: TimeWindow,
        limit: u32,
    ) -> Result<Vec<Candidate>, ContentError>;
}

#[derive(Clone)]
pub struct RedditClient {
    client: Client,
    api_base: String,
    user_agent: String,
    tokens: Arc<TokenKeeper>,
}

impl RedditClient {
    pub fn new(client: Client, tokens: Arc<TokenKeeper>, user_agent: String) -> Self {
        Self {
            client,
            api_base: "https://oauth.reddit.com".to_string(),
            user_agent,
            tokens,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl ContentSource for RedditClient {
    async fn top_listings(
        &self,
        channel: &str,
        window: TimeWindow,
        limit: u32,
    ) -> Result<Vec<Candidate>, ContentError> {
        let url = format!("{}/r/{}/top", self.api_base, channel);
        let credential = self.tokens.current();

        let resp = self
            .client
            .get(&url)
            .query(&[("t", window.as_str().to_string()), ("limit", limit.to_string())])
            .header(reqwest::header::AUTHORIZATION, credential.authorization())
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ContentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        let listing: ListingResponse = serde_json::from_slice(&bytes)?;
        let mut candidates = listing.into_candidates();
        candidates.truncate(limit as usize);

        debug!(
            "Received {} results for subreddit {}",
            candidates.len(),
            channel
        );
        Ok(candidates)
    }
}
