//! Reddit API client: password-grant credentials and "top" listings.
//!
//! Only the subset of https://www.reddit.com/dev/api/ the bot needs is
//! implemented.

pub mod client;
pub mod error;
pub mod token;
pub mod types;

pub use client::{ContentSource, RedditClient};
pub use error::ContentError;
pub use token::{Credential, PasswordGrant, TokenKeeper, TokenSource};
pub use types::{Candidate, TimeWindow};
