use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::ContentError;

/// Bearer credential for the Reddit OAuth API.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub scope: String,
    pub obtained_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, token_type: impl Into<String>, expires_in: u64) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expires_in,
            scope: String::new(),
            obtained_at: Utc::now(),
        }
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.obtained_at
    }

    /// Past its nominal lifetime. Reddit keeps honouring such tokens for a
    /// while, so this is only reported, never enforced.
    pub fn is_past_expiry(&self) -> bool {
        self.age().num_seconds() > self.expires_in as i64
    }
}

/// Something that can mint a fresh credential.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<Credential, ContentError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<u64>,
    scope: Option<String>,
    error: Option<String>,
}

/// Password grant for Reddit "script" apps: the developer's own account
/// plus the app's client id and secret.
#[derive(Clone)]
pub struct PasswordGrant {
    client: Client,
    auth_base: String,
    username: String,
    password: String,
    client_id: String,
    client_secret: String,
    user_agent: String,
}

impl PasswordGrant {
    pub fn new(
        client: Client,
        username: String,
        password: String,
        client_id: String,
        client_secret: String,
        user_agent: String,
    ) -> Self {
        Self {
            client,
            auth_base: "https://www.reddit.com".to_string(),
            username,
            password,
            client_id,
            client_secret,
            user_agent,
        }
    }

    pub fn with_auth_base(mut self, auth_base: impl Into<String>) -> Self {
        self.auth_base = auth_base.into();
        self
    }
}

#[async_trait]
impl TokenSource for PasswordGrant {
    async fn fetch_token(&self) -> Result<Credential, ContentError> {
        let url = format!("{}/api/v1/access_token", self.auth_base);
        let form = [
            ("grant_type", "password"),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ];

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .form(&form)
            .send()
            .await
            .map_err(|e| ContentError::Auth(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ContentError::Auth(e.to_string()))?;
        if !status.is_success() {
            return Err(ContentError::Auth(format!("{}: {}", status, body)));
        }

        // Reddit reports bad credentials as 200 {"error": "invalid_grant"}
        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ContentError::Auth(format!("Could not decode token: {}", e)))?;
        if let Some(error) = token.error {
            return Err(ContentError::Auth(error));
        }

        let access_token = token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ContentError::Auth("Response carried no access token".to_string()))?;

        Ok(Credential {
            access_token,
            token_type: token.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_in: token.expires_in.unwrap_or_default(),
            scope: token.scope.unwrap_or_default(),
            obtained_at: Utc::now(),
        })
    }
}

/// Owns the single live credential and keeps it fresh.
///
/// Readers get a cheap snapshot; a refresh swaps the whole snapshot at once.
/// A failed refresh leaves the previous credential in place.
pub struct TokenKeeper {
    source: Arc<dyn TokenSource>,
    current: RwLock<Arc<Credential>>,
}

impl TokenKeeper {
    /// Acquire the first credential. Fails when it cannot be obtained.
    pub async fn new(source: Arc<dyn TokenSource>) -> Result<Arc<Self>, ContentError> {
        let credential = source.fetch_token().await?;
        info!(
            "Acquired Reddit access token (expires in {}s)",
            credential.expires_in
        );

        Ok(Arc::new(Self {
            source,
            current: RwLock::new(Arc::new(credential)),
        }))
    }

    /// Acquire the first credential and keep refreshing it every `interval`
    /// until `cancel` fires.
    pub async fn start(
        source: Arc<dyn TokenSource>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Result<Arc<Self>, ContentError> {
        let keeper = Self::new(source).await?;
        keeper.spawn_refresh(interval, cancel);
        Ok(keeper)
    }

    pub fn current(&self) -> Arc<Credential> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    pub async fn refresh(&self) -> Result<(), ContentError> {
        let credential = self.source.fetch_token().await?;
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(credential);
        Ok(())
    }

    pub fn spawn_refresh(self: &Arc<Self>, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let keeper = Arc::clone(self);
        tokio::spawn(async move {
            debug!("Token refresh task started (interval: {:?})", interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }

                let result = tokio::select! {
                    _ = cancel.cancelled() => break,
                    result = keeper.refresh() => result,
                };
                match result {
                    Ok(()) => info!("Successfully refreshed Reddit access token"),
                    Err(e) => {
                        let stale = keeper.current();
                        warn!(
                            age_secs = stale.age().num_seconds(),
                            past_expiry = stale.is_past_expiry(),
                            "Could not refresh Reddit token, keeping the previous one: {}",
                            e
                        );
                    }
                }
            }
            debug!("Token refresh task stopped");
        })
    }
}
