//! Messaging channel adapters
//!
//! The webhook handler talks to the chat platform only through the
//! [`Channel`] trait, so tests can swap in a recording implementation.

mod telegram;

use async_trait::async_trait;

pub use telegram::{BotUser, TelegramChannel, UpdateDedup};

use crate::Result;
use crate::context::ChatId;

/// Result of a best-effort edit
///
/// Edits are fire-and-forget: callers may inspect or simply drop this value,
/// and a failure is never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The message now shows the new text
    Applied,
    /// The edit was rejected or could not be delivered
    Failed(String),
}

impl EditOutcome {
    /// Whether the edit landed
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Trait for messaging channel adapters
#[async_trait]
pub trait Channel: Send + Sync {
    /// Get the channel name
    fn name(&self) -> &'static str;

    /// Send a text message, optionally as a reply, returning its message id
    ///
    /// # Errors
    ///
    /// Returns error if the platform rejects the message or is unreachable
    async fn send_message(&self, chat_id: ChatId, text: &str, reply_to: Option<i64>) -> Result<i64>;

    /// Replace the text of a previously sent message
    ///
    /// # Errors
    ///
    /// Returns error if the platform rejects the edit or is unreachable
    async fn edit_message(&self, chat_id: ChatId, message_id: i64, text: &str) -> Result<()>;

    /// Edit a message, swallowing any failure
    async fn edit_best_effort(&self, chat_id: ChatId, message_id: i64, text: &str) -> EditOutcome {
        match self.edit_message(chat_id, message_id, text).await {
            Ok(()) => EditOutcome::Applied,
            Err(e) => {
                tracing::debug!(
                    channel = self.name(),
                    chat_id,
                    message_id,
                    error = %e,
                    "best-effort edit failed"
                );
                EditOutcome::Failed(e.to_string())
            }
        }
    }
}
