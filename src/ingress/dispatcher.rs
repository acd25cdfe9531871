use rand::seq::SliceRandom;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::error::TelegramError;
use super::router::ChannelRouter;
use super::telegram_client::Messenger;
use super::types::InboundEvent;
use crate::reddit::{Candidate, ContentError, ContentSource, TimeWindow};

const GET_COMMAND: &str = "/get";

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Could not fetch listings for /r/{channel}: {source}")]
    Fetch {
        channel: String,
        #[source]
        source: ContentError,
    },

    #[error("No listings returned for /r/{channel}")]
    NoCandidates { channel: String },

    #[error("Could not respond to chat {chat_id} message {reply_to}: {source}")]
    Send {
        chat_id: i64,
        reply_to: i64,
        #[source]
        source: TelegramError,
    },
}

/// Answers `/get` with a random top post from one of the chat's subreddits.
pub struct Dispatcher {
    router: ChannelRouter,
    content: Arc<dyn ContentSource>,
    messenger: Arc<dyn Messenger>,
    commands: [String; 2],
    window: TimeWindow,
    limit: u32,
}

impl Dispatcher {
    pub fn new(
        router: ChannelRouter,
        content: Arc<dyn ContentSource>,
        messenger: Arc<dyn Messenger>,
        bot_username: &str,
    ) -> Self {
        Self {
            router,
            content,
            messenger,
            commands: [
                GET_COMMAND.to_string(),
                format!("{}@{}", GET_COMMAND, bot_username),
            ],
            window: TimeWindow::Week,
            limit: 5,
        }
    }

    pub fn with_listing(mut self, window: TimeWindow, limit: u32) -> Self {
        self.window = window;
        self.limit = limit;
        self
    }

    /// Only the first space-separated token counts, and it must equal one of
    /// the command forms exactly.
    pub fn is_command(&self, text: &str) -> bool {
        let command = text.split(' ').next().unwrap_or_default();
        self.commands.iter().any(|c| c == command)
    }

    pub async fn handle(&self, event: InboundEvent) -> Result<(), DispatchError> {
        if !self.is_command(&event.text) {
            debug!("Ignoring {}: not a command", event);
            return Ok(());
        }

        let channel = self.router.pick(event.chat_id).to_string();
        info!("Picked subreddit {} for {}", channel, event);

        let candidates = self
            .content
            .top_listings(&channel, self.window, self.limit)
            .await
            .map_err(|source| DispatchError::Fetch {
                channel: channel.clone(),
                source,
            })?;

        let reply = pick_reply(&candidates).ok_or_else(|| DispatchError::NoCandidates {
            channel: channel.clone(),
        })?;

        info!(
            "Replying to message {} in chat {} with: {}",
            event.reply_target_id, event.chat_id, reply
        );
        self.messenger
            .send_message(event.chat_id, &reply, event.reply_target_id)
            .await
            .map_err(|source| DispatchError::Send {
                chat_id: event.chat_id,
                reply_to: event.reply_target_id,
                source,
            })
    }
}

fn pick_reply(candidates: &[Candidate]) -> Option<String> {
    candidates
        .choose(&mut rand::thread_rng())
        .map(Candidate::to_reply)
}
