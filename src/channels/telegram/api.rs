//! Raw Telegram Bot API calls

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{
    BotUser, EditMessageTextRequest, ReplyParameters, SendMessageRequest, SentMessage,
    SetWebhookRequest, TelegramResponse,
};
use crate::{Error, Result};

/// Update kinds the webhook asks Telegram to deliver
const ALLOWED_UPDATES: &[&str] = &["message"];

impl super::TelegramChannel {
    pub(super) fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token)
    }

    /// Call a Bot API method and decode its envelope
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<TelegramResponse<T>> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Telegram {method} error: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Channel(format!("Telegram response read error: {e}")))?;

        serde_json::from_str(&text).map_err(|e| {
            Error::Channel(format!("Telegram {method} response parse error ({status}): {e}"))
        })
    }

    /// Send a message and return the platform message ID
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the response lacks a message ID
    pub async fn send_message_returning_id(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<i64> {
        let request = SendMessageRequest {
            chat_id,
            text,
            reply_parameters: reply_to.map(|message_id| ReplyParameters {
                message_id,
                allow_sending_without_reply: true,
            }),
        };

        let parsed: TelegramResponse<SentMessage> = self.call("sendMessage", &request).await?;

        let TelegramResponse {
            result, description, ..
        } = parsed;

        match result {
            Some(sent) => {
                tracing::debug!(chat_id, message_id = sent.message_id, "Telegram message sent");
                Ok(sent.message_id)
            }
            None => Err(Error::Channel(format!(
                "Telegram sendMessage error: {}",
                description.unwrap_or_default()
            ))),
        }
    }

    /// Edit an existing message's text
    ///
    /// "message is not modified" counts as success.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()> {
        let request = EditMessageTextRequest {
            chat_id,
            message_id,
            text,
        };

        let parsed: TelegramResponse<serde_json::Value> =
            self.call("editMessageText", &request).await?;

        if parsed.ok || parsed.description().to_lowercase().contains("message is not modified") {
            return Ok(());
        }

        Err(Error::Channel(format!(
            "Telegram editMessageText error: {}",
            parsed.description()
        )))
    }

    /// Fetch the bot's own account
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the token is rejected
    pub async fn get_me(&self) -> Result<BotUser> {
        let parsed: TelegramResponse<BotUser> = self.call("getMe", &serde_json::json!({})).await?;

        let TelegramResponse {
            result, description, ..
        } = parsed;

        result.ok_or_else(|| {
            Error::Channel(format!(
                "Telegram getMe error: {}",
                description.unwrap_or_default()
            ))
        })
    }

    /// Set webhook URL for receiving updates
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> Result<()> {
        let request = SetWebhookRequest {
            url,
            allowed_updates: ALLOWED_UPDATES,
            secret_token,
        };

        let parsed: TelegramResponse<bool> = self.call("setWebhook", &request).await?;
        if !parsed.ok {
            return Err(Error::Channel(format!(
                "Telegram setWebhook error: {}",
                parsed.description()
            )));
        }

        tracing::info!(url, "Telegram webhook set");
        Ok(())
    }

    /// Delete webhook
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn delete_webhook(&self) -> Result<()> {
        let parsed: TelegramResponse<bool> =
            self.call("deleteWebhook", &serde_json::json!({})).await?;
        if !parsed.ok {
            return Err(Error::Channel(format!(
                "Telegram deleteWebhook error: {}",
                parsed.description()
            )));
        }

        tracing::info!("Telegram webhook deleted");
        Ok(())
    }
}
