use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::ingress::{Dispatcher, InboundEvent, Messenger, TelegramError};

/// Offset of the next update to request. Only ever moves forward, so an
/// update that was already retrieved is never asked for again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    next_offset: i64,
}

impl Cursor {
    pub fn next_offset(&self) -> i64 {
        self.next_offset
    }

    pub fn advance_past(&mut self, update_id: i64) {
        self.next_offset = self.next_offset.max(update_id + 1);
    }
}

#[derive(Debug, Clone)]
pub struct PollingSettings {
    /// Long polling timeout in seconds
    pub poll_timeout: u64,
    pub pause: Duration,
    pub max_in_flight: usize,
    /// A reply that takes longer than this is abandoned and frees its slot
    pub dispatch_timeout: Duration,
}

impl PollingSettings {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            poll_timeout: config.poll_timeout,
            pause: config.poll_interval(),
            max_in_flight: config.max_in_flight,
            dispatch_timeout: config.dispatch_timeout(),
        }
    }
}

pub struct TelegramPollingService {
    messenger: Arc<dyn Messenger>,
    dispatcher: Arc<Dispatcher>,
    settings: PollingSettings,
    cursor: Cursor,
    in_flight: Arc<Semaphore>,
    workers: JoinSet<()>,
}

impl TelegramPollingService {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        dispatcher: Arc<Dispatcher>,
        settings: PollingSettings,
    ) -> Self {
        let in_flight = Arc::new(Semaphore::new(settings.max_in_flight.max(1)));
        Self {
            messenger,
            dispatcher,
            settings,
            cursor: Cursor::default(),
            in_flight,
            workers: JoinSet::new(),
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Poll until `cancel` fires. A failed poll is logged and retried with
    /// the same offset; it never ends the loop.
    pub async fn run(&mut self, cancel: CancellationToken) {
        info!("Polling for updates...");

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.poll_once() => result,
            };

            match result {
                Ok(count) => debug!(
                    count,
                    next_offset = self.cursor.next_offset(),
                    "Received updates"
                ),
                Err(e) => warn!("Received error fetching updates: {}", e),
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(self.settings.pause) => {}
            }
        }

        // Let replies that are already underway finish
        while let Some(result) = self.workers.join_next().await {
            if let Err(e) = result {
                error!("Dispatch task crashed: {}", e);
            }
        }
        info!("Telegram polling stopped");
    }

    /// Fetch one batch and hand every message to the dispatcher in the
    /// background. The cursor moves past an update only once it has been
    /// handed off, so a batch cut short by shutdown is not acknowledged.
    pub async fn poll_once(&mut self) -> Result<usize, TelegramError> {
        let updates = self
            .messenger
            .get_updates(self.cursor.next_offset(), self.settings.poll_timeout)
            .await?;
        let count = updates.len();

        for update in updates {
            let update_id = update.update_id;
            match update.into_event() {
                Some(event) => self.spawn_dispatch(event).await,
                None => debug!("Skipping update without message"),
            }
            self.cursor.advance_past(update_id);
        }

        while let Some(result) = self.workers.try_join_next() {
            if let Err(e) = result {
                error!("Dispatch task crashed: {}", e);
            }
        }

        Ok(count)
    }

    async fn spawn_dispatch(&mut self, event: InboundEvent) {
        // Waits for a free slot when max_in_flight replies are underway
        let permit = match Arc::clone(&self.in_flight).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return,
        };

        let dispatcher = Arc::clone(&self.dispatcher);
        let limit = self.settings.dispatch_timeout;
        self.workers.spawn(async move {
            let _permit = permit;
            let label = event.to_string();
            match timeout(limit, dispatcher.handle(event)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Error handling {}: {}", label, e),
                Err(_) => warn!("Gave up on {} after {:?}", label, limit),
            }
        });
    }
}
