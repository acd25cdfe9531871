pub mod http;
pub mod telegram;
pub mod telegram_polling;

pub use http::Server;
pub use telegram_polling::{Cursor, PollingSettings, TelegramPollingService};

use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::IngestMode;
use crate::ingress::{Dispatcher, Messenger, TelegramError};

/// The update source picked at startup.
pub enum IngestDriver {
    Polling(TelegramPollingService),
    Webhook(Server),
}

impl IngestDriver {
    /// Build the driver for `mode`. Webhook mode registers the push endpoint
    /// here; a failed registration is returned and must stop the process.
    pub async fn prepare(
        mode: IngestMode,
        messenger: Arc<dyn Messenger>,
        dispatcher: Arc<Dispatcher>,
        settings: PollingSettings,
    ) -> Result<Self, TelegramError> {
        match mode {
            IngestMode::Polling => Ok(IngestDriver::Polling(TelegramPollingService::new(
                messenger, dispatcher, settings,
            ))),
            IngestMode::Webhook(target) => {
                info!(
                    "Registering webhook for {} using {}",
                    target.url,
                    target.certificate.display()
                );
                messenger.set_webhook(&target.url, &target.certificate).await?;
                info!("Registered webhook");

                Ok(IngestDriver::Webhook(Server::new(target, dispatcher)))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IngestDriver::Polling(_) => "polling",
            IngestDriver::Webhook(_) => "webhook",
        }
    }

    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        match self {
            IngestDriver::Polling(mut service) => {
                service.run(cancel).await;
                Ok(())
            }
            IngestDriver::Webhook(server) => server.run(cancel).await,
        }
    }
}
