//! Telegram message processing (background task)

use super::types::{TelegramMessage, TelegramUpdate};
use crate::Result;
use crate::activation::resolve_sender_name;
use crate::api::ApiState;
use crate::context::ChatId;

/// Why an update was dropped without a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Not a new message (edits, other update kinds)
    NotAMessage,
    /// Message without text (photos, stickers, service messages)
    NoText,
    /// Group message not addressed to the bot
    NotAddressed,
}

/// What processing did with an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Dropped silently, context untouched
    Ignored(IgnoreReason),
    /// Bare activation answered with the fixed acknowledgement, context untouched
    Acknowledged,
    /// A generated reply was delivered
    Replied,
}

/// Process one Telegram update end to end
///
/// # Errors
///
/// Returns error if the reply could not be generated or delivered. The webhook
/// adapter logs it; it never reaches Telegram.
pub async fn process_update(state: &ApiState, update: TelegramUpdate) -> Result<Disposition> {
    let Some(message) = update.message else {
        return Ok(Disposition::Ignored(IgnoreReason::NotAMessage));
    };
    process_message(state, &message).await
}

async fn process_message(state: &ApiState, message: &TelegramMessage) -> Result<Disposition> {
    let Some(raw_text) = message.text.as_deref().filter(|t| !t.is_empty()) else {
        return Ok(Disposition::Ignored(IgnoreReason::NoText));
    };

    let chat_id = message.chat.id;
    if !state.policy.should_engage(message) {
        tracing::debug!(chat_id, "skipping group message (bot not addressed)");
        return Ok(Disposition::Ignored(IgnoreReason::NotAddressed));
    }

    let intent = state.policy.extract_intent_text(raw_text);
    if intent.is_empty() {
        tracing::debug!(chat_id, "bare activation, sending acknowledgement");
        state
            .channel
            .send_message(chat_id, &state.replies.bare_activation, Some(message.message_id))
            .await?;
        return Ok(Disposition::Acknowledged);
    }

    let sender_name = resolve_sender_name(message.from.as_ref());
    let is_bot_sender = message.from.as_ref().is_some_and(|u| u.is_bot);

    tracing::info!(
        chat_id,
        from = %sender_name,
        chat_type = %message.chat.chat_type,
        "Telegram message received"
    );

    let placeholder = match state
        .channel
        .send_message(chat_id, &state.replies.thinking, Some(message.message_id))
        .await
    {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!(
                chat_id,
                error = %e,
                "failed to send placeholder, will send reply directly"
            );
            None
        }
    };

    match state
        .responder
        .respond(chat_id, &sender_name, is_bot_sender, &intent)
        .await
    {
        Ok(reply) => {
            deliver(state, chat_id, message.message_id, placeholder, &reply).await?;
            Ok(Disposition::Replied)
        }
        Err(e) => {
            let failure = &state.replies.failure;
            if let Err(send_err) =
                deliver(state, chat_id, message.message_id, placeholder, failure).await
            {
                tracing::warn!(chat_id, error = %send_err, "failed to deliver failure notice");
            }
            Err(e)
        }
    }
}

/// Put `text` in front of the user
///
/// With a placeholder the text replaces it in place; a failed edit is
/// swallowed. Without one a fresh reply is sent.
async fn deliver(
    state: &ApiState,
    chat_id: ChatId,
    reply_to: i64,
    placeholder: Option<i64>,
    text: &str,
) -> Result<()> {
    if let Some(message_id) = placeholder {
        let outcome = state.channel.edit_best_effort(chat_id, message_id, text).await;
        if !outcome.is_applied() {
            tracing::warn!(chat_id, message_id, "reply left in placeholder, edit failed");
        }
        return Ok(());
    }

    state
        .channel
        .send_message(chat_id, text, Some(reply_to))
        .await
        .map(|_| ())
}
