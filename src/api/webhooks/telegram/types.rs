//! Telegram webhook types

use serde::{Deserialize, Serialize};

/// Telegram Update object (simplified)
///
/// Only new messages are modelled; edits and other update kinds deserialize
/// with `message` unset and are acknowledged without an answer.
#[derive(Debug, Deserialize, Serialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
}

/// Telegram Message object (simplified)
#[derive(Debug, Deserialize, Serialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub chat: TelegramChat,
    pub from: Option<TelegramUser>,
    pub text: Option<String>,
    #[serde(default)]
    pub date: i64,
    /// Structured annotations over `text` (mentions, commands, links)
    #[serde(default)]
    pub entities: Vec<MessageEntity>,
    /// Message this is replying to (for reply-chain activation)
    pub reply_to_message: Option<Box<TelegramReplyMessage>>,
}

impl TelegramMessage {
    /// Whether this message was sent in a one-to-one chat
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.chat.chat_type == "private"
    }
}

/// Minimal reply message (only the author matters for activation)
#[derive(Debug, Deserialize, Serialize)]
pub struct TelegramReplyMessage {
    pub message_id: i64,
    pub from: Option<TelegramUser>,
}

/// Annotation over a span of message text
///
/// `offset` and `length` count UTF-16 code units, as the Bot API does.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: usize,
    pub length: usize,
    /// Mentioned user, for `text_mention` entities
    #[serde(default)]
    pub user: Option<TelegramUser>,
}

impl MessageEntity {
    /// Extract the annotated span from the message text
    #[must_use]
    pub fn span(&self, text: &str) -> Option<String> {
        let units: Vec<u16> = text.encode_utf16().collect();
        let end = self.offset.checked_add(self.length)?;
        let span = units.get(self.offset..end)?;
        String::from_utf16(span).ok()
    }
}

/// Telegram Chat object
#[derive(Debug, Deserialize, Serialize)]
pub struct TelegramChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: String,
    pub title: Option<String>,
}

/// Telegram User object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}
