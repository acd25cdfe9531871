//! lumber-bot relays highly upvoted Reddit posts into Telegram chats.
//!
//! A chat member sends `/get`; the bot picks one of the chat's subreddits,
//! fetches its top posts of the week and replies with a random one.

pub mod config;
pub mod ingress;
pub mod reddit;
pub mod server;
