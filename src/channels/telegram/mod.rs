//! Telegram channel adapter
//!
//! Uses webhooks for receiving messages and the Bot API for sending

mod api;
pub mod dedup;
pub mod types;

use async_trait::async_trait;
use reqwest::Client;

use super::Channel;
use crate::Result;
use crate::config::TelegramConfig;
use crate::context::ChatId;

pub use dedup::UpdateDedup;
pub use types::BotUser;

/// Telegram channel adapter
#[derive(Clone)]
pub struct TelegramChannel {
    token: String,
    api_base: String,
    client: Client,
}

impl TelegramChannel {
    /// Create a new Telegram channel adapter
    #[must_use]
    pub fn new(token: String) -> Self {
        Self::with_api_base(token, types::API_BASE.to_string())
    }

    /// Create an adapter talking to a self-hosted Bot API server
    #[must_use]
    pub fn with_api_base(token: String, api_base: String) -> Self {
        Self {
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Create an adapter for the configured token and Bot API server
    #[must_use]
    pub fn from_config(config: &TelegramConfig) -> Self {
        match &config.api_base {
            Some(api_base) => Self::with_api_base(config.bot_token.clone(), api_base.clone()),
            None => Self::new(config.bot_token.clone()),
        }
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<i64> {
        self.send_message_returning_id(chat_id, text, reply_to).await
    }

    async fn edit_message(&self, chat_id: ChatId, message_id: i64, text: &str) -> Result<()> {
        self.edit_message_text(chat_id, message_id, text).await
    }
}
