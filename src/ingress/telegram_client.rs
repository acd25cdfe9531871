use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::Path;
use tracing::{debug, error};

use super::error::TelegramError;
use super::types::{ApiResponse, TelegramUpdate};

/// Outbound side of the Telegram Bot API used by the bot.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Long-poll for updates starting at `offset`.
    async fn get_updates(&self, offset: i64, timeout: u64) -> Result<Vec<TelegramUpdate>, TelegramError>;

    /// Send `text` to `chat_id` as a reply to message `reply_to`.
    async fn send_message(&self, chat_id: i64, text: &str, reply_to: i64) -> Result<(), TelegramError>;

    /// Register `url` as the push endpoint, uploading the self-signed
    /// certificate at `certificate`.
    async fn set_webhook(&self, url: &str, certificate: &Path) -> Result<(), TelegramError>;
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    bot_token: String,
    api_base: String,
}

impl TelegramClient {
    /// `client` must time out later than the long-poll timeout, otherwise
    /// every empty poll ends as a transport error.
    pub fn new(client: Client, bot_token: String) -> Self {
        Self {
            client,
            bot_token,
            api_base: "https://api.telegram.org".to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }
}

async fn decode<T: DeserializeOwned>(
    method: &'static str,
    resp: reqwest::Response,
) -> Result<Option<T>, TelegramError> {
    // Failures come back as non-2xx with an {"ok": false} body, so the
    // envelope decides, not the status code.
    let bytes = resp.bytes().await?;
    let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)?;
    if !envelope.ok {
        let description = envelope
            .description
            .unwrap_or_else(|| "no description".to_string());
        error!("Telegram {} error: {}", method, description);
        return Err(TelegramError::Rejected {
            method,
            description,
        });
    }
    Ok(envelope.result)
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn get_updates(&self, offset: i64, timeout: u64) -> Result<Vec<TelegramUpdate>, TelegramError> {
        let resp = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout.to_string()),
                ("allowed_updates", r#"["message"]"#.to_string()),
            ])
            .send()
            .await?;

        let updates: Option<Vec<TelegramUpdate>> = decode("getUpdates", resp).await?;
        Ok(updates.unwrap_or_default())
    }

    async fn send_message(&self, chat_id: i64, text: &str, reply_to: i64) -> Result<(), TelegramError> {
        let body = json!({
            "chat_id": chat_id,
            "text": text,
            "reply_to_message_id": reply_to,
        });

        let resp = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?;

        decode::<serde_json::Value>("sendMessage", resp).await?;
        debug!("Sent reply to message {} in chat {}", reply_to, chat_id);
        Ok(())
    }

    async fn set_webhook(&self, url: &str, certificate: &Path) -> Result<(), TelegramError> {
        let data = tokio::fs::read(certificate).await?;
        let file_name = certificate
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "certificate.pem".to_string());

        let form = Form::new()
            .part("certificate", Part::bytes(data).file_name(file_name))
            .text("url", url.to_string())
            .text("allowed_updates", r#"["message"]"#);

        let resp = self
            .client
            .post(self.method_url("setWebhook"))
            .multipart(form)
            .send()
            .await?;

        decode::<serde_json::Value>("setWebhook", resp).await?;
        Ok(())
    }
}
