pub mod dispatcher;
pub mod error;
pub mod router;
pub mod telegram_client;
pub mod types;

pub use dispatcher::{DispatchError, Dispatcher};
pub use error::TelegramError;
pub use router::ChannelRouter;
pub use telegram_client::{Messenger, TelegramClient};
pub use types::{InboundEvent, TelegramMessage, TelegramUpdate};
