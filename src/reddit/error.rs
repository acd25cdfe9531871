use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Token exchange failed: {0}")]
    Auth(String),

    #[error("Request to Reddit failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Reddit returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not decode Reddit response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ContentError {
    /// Whether this failure happened while acquiring a credential rather
    /// than fetching content.
    pub fn is_auth(&self) -> bool {
        matches!(self, ContentError::Auth(_))
    }
}
