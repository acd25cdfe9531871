use serde::Deserialize;
use std::fmt;

// Telegram Update structure (partial)
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub chat: TelegramChat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub description: Option<String>,
    pub result: Option<T>,
}

/// One unit of incoming chat activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub event_id: i64,
    pub chat_id: i64,
    /// Message the reply is threaded under
    pub reply_target_id: i64,
    pub text: String,
}

impl InboundEvent {
    pub fn new(event_id: i64, chat_id: i64, reply_target_id: i64, text: impl Into<String>) -> Self {
        Self {
            event_id,
            chat_id,
            reply_target_id,
            text: text.into(),
        }
    }
}

impl TelegramUpdate {
    /// Updates without a message (edits, channel posts, ...) carry nothing
    /// to answer.
    pub fn into_event(self) -> Option<InboundEvent> {
        let update_id = self.update_id;
        self.message.map(|message| InboundEvent {
            event_id: update_id,
            chat_id: message.chat.id,
            reply_target_id: message.message_id,
            text: message.text.unwrap_or_default(),
        })
    }
}

impl fmt::Display for InboundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Metadata only, message text stays out of the logs
        write!(
            f,
            "update {} (chat {}, message {})",
            self.event_id, self.chat_id, self.reply_target_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_into_event() {
        let update: TelegramUpdate = serde_json::from_str(
            r#"{"update_id": 100, "message": {"message_id": 7, "date": 0, "chat": {"id": 42, "type": "group"}, "text": "/get"}}"#,
        )
        .unwrap();

        let event = update.into_event().unwrap();
        assert_eq!(event, InboundEvent::new(100, 42, 7, "/get"));
        assert_eq!(event.to_string(), "update 100 (chat 42, message 7)");
    }

    #[test]
    fn test_update_without_message_or_text() {
        let update: TelegramUpdate =
            serde_json::from_str(r#"{"update_id": 5, "edited_message": {}}"#).unwrap();
        assert!(update.into_event().is_none());

        let update: TelegramUpdate = serde_json::from_str(
            r#"{"update_id": 6, "message": {"message_id": 1, "chat": {"id": 2}, "photo": []}}"#,
        )
        .unwrap();
        assert_eq!(update.into_event().unwrap().text, "");
    }
}
