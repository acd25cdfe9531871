use axum::{body::Bytes, extract::State, http::StatusCode};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::ingress::TelegramUpdate;
use crate::server::http::AppState;

/// Receives one pushed update and answers it before responding.
///
/// An undecodable body or a failed dispatch is answered with 400; success
/// gets an empty 200.
pub async fn webhook_handler(State(state): State<Arc<AppState>>, body: Bytes) -> StatusCode {
    let update: TelegramUpdate = match serde_json::from_slice(&body) {
        Ok(u) => u,
        Err(e) => {
            warn!("Could not decode pushed update: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    let Some(event) = update.into_event() else {
        // Nothing to answer, acknowledge so Telegram does not redeliver
        debug!("Pushed update carried no message");
        return StatusCode::OK;
    };

    let label = event.to_string();
    match state.dispatcher.handle(event).await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!("Error handling {}: {}", label, e);
            StatusCode::BAD_REQUEST
        }
    }
}

pub async fn health_check() -> &'static str {
    "healthy"
}
