use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("Request to Telegram failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Telegram rejected {method}: {description}")]
    Rejected {
        method: &'static str,
        description: String,
    },

    #[error("Could not decode Telegram response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Could not read certificate: {0}")]
    Certificate(#[from] std::io::Error),
}
