//! Activation policy: when the bot speaks up, and what it was asked
//!
//! Private chats always engage. In group chats the bot only answers when it is
//! addressed: by `@handle`, by its display-name keyword, through a mention
//! entity, or by replying to one of its own messages.

use crate::api::webhooks::telegram::types::{TelegramMessage, TelegramUser};

/// Display name used when a sender has no usable identity
pub const UNKNOWN_SENDER: &str = "unknown";

/// The bot's own Telegram identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    /// Numeric user id, known once `getMe` has answered
    pub id: Option<i64>,
    /// Username without the leading `@`
    pub username: String,
}

impl BotIdentity {
    /// Identity known only by username
    #[must_use]
    pub fn from_username(username: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
        }
    }

    /// Whether `user` is this bot
    ///
    /// Ids are compared when both are known, usernames otherwise.
    #[must_use]
    pub fn is(&self, user: &TelegramUser) -> bool {
        match self.id {
            Some(id) if id == user.id => true,
            Some(_) => false,
            None => user.username.as_deref() == Some(self.username.as_str()),
        }
    }
}

/// Decides engagement and strips activation tokens from message text
#[derive(Debug, Clone)]
pub struct ActivationPolicy {
    bot: BotIdentity,
    handle: String,
    keyword: String,
}

impl ActivationPolicy {
    /// Create a policy for a bot identity and activation keyword
    #[must_use]
    pub fn new(bot: BotIdentity, keyword: impl Into<String>) -> Self {
        let handle = format!("@{}", bot.username);
        Self {
            bot,
            handle,
            keyword: keyword.into(),
        }
    }

    /// Whether the bot should respond to this message
    #[must_use]
    pub fn should_engage(&self, message: &TelegramMessage) -> bool {
        if message.is_private() {
            return true;
        }

        let text = message.text.as_deref().unwrap_or_default();

        self.mentions_by_text(text)
            || self.mentions_by_entity(message, text)
            || self.is_reply_to_bot(message)
    }

    /// Remove every handle and keyword occurrence, then trim
    ///
    /// An empty result means the message was a bare activation.
    #[must_use]
    pub fn extract_intent_text(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        if !self.bot.username.is_empty() {
            text = text.replace(&self.handle, "");
        }
        if !self.keyword.is_empty() {
            text = text.replace(&self.keyword, "");
        }
        text.trim().to_string()
    }

    fn mentions_by_text(&self, text: &str) -> bool {
        (!self.bot.username.is_empty() && text.contains(&self.handle))
            || (!self.keyword.is_empty() && text.contains(&self.keyword))
    }

    fn mentions_by_entity(&self, message: &TelegramMessage, text: &str) -> bool {
        message.entities.iter().any(|entity| match entity.kind.as_str() {
            "mention" => entity.span(text).is_some_and(|span| span == self.handle),
            "text_mention" => entity.user.as_ref().is_some_and(|user| self.bot.is(user)),
            _ => false,
        })
    }

    fn is_reply_to_bot(&self, message: &TelegramMessage) -> bool {
        message
            .reply_to_message
            .as_ref()
            .and_then(|reply| reply.from.as_ref())
            .is_some_and(|author| self.bot.is(author))
    }
}

/// Human-readable sender label for history attribution
///
/// First and last name joined by a space, else the username, else
/// [`UNKNOWN_SENDER`]. Never empty.
#[must_use]
pub fn resolve_sender_name(user: Option<&TelegramUser>) -> String {
    let Some(user) = user else {
        return UNKNOWN_SENDER.to_string();
    };

    let full_name = [Some(user.first_name.as_str()), user.last_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !full_name.is_empty() {
        return full_name;
    }

    user.username
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map_or_else(|| UNKNOWN_SENDER.to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const BOT_ID: i64 = 777;

    fn policy() -> ActivationPolicy {
        ActivationPolicy::new(
            BotIdentity {
                id: Some(BOT_ID),
                username: "jeonghuni_bot".to_string(),
            },
            "정후니",
        )
    }

    fn message(chat_type: &str, text: &str) -> TelegramMessage {
        serde_json::from_value(json!({
            "message_id": 10,
            "chat": {"id": -42, "type": chat_type},
            "from": {"id": 1, "is_bot": false, "first_name": "Alice"},
            "text": text,
        }))
        .unwrap()
    }

    fn user(value: serde_json::Value) -> TelegramUser {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn handle_engages_in_group() {
        assert!(policy().should_engage(&message("group", "@jeonghuni_bot hello")));
    }

    #[test]
    fn plain_group_message_is_ignored() {
        assert!(!policy().should_engage(&message("group", "hello")));
        assert!(!policy().should_engage(&message("supergroup", "hello")));
    }

    #[test]
    fn keyword_engages_and_is_stripped() {
        let p = policy();
        assert!(p.should_engage(&message("group", "정후니 안녕")));
        assert_eq!(p.extract_intent_text("정후니 안녕"), "안녕");
    }

    #[test]
    fn private_chat_always_engages() {
        assert!(policy().should_engage(&message("private", "hello")));
        assert!(policy().should_engage(&message("private", "")));
    }

    #[test]
    fn bare_activation_has_empty_intent() {
        let p = policy();
        assert_eq!(p.extract_intent_text("@jeonghuni_bot"), "");
        assert_eq!(p.extract_intent_text("  정후니  @jeonghuni_bot "), "");
    }

    #[test]
    fn all_occurrences_are_removed() {
        assert_eq!(
            policy().extract_intent_text("@jeonghuni_bot what is 2+2 @jeonghuni_bot?"),
            "what is 2+2 ?"
        );
    }

    #[test]
    fn mention_entity_engages() {
        let mut msg = message("group", "😀 @jeonghuni_bot hi");
        msg.entities = vec![serde_json::from_value(json!({
            "type": "mention", "offset": 3, "length": 14
        }))
        .unwrap()];
        let text = msg.text.clone().unwrap_or_default();

        assert!(policy().mentions_by_entity(&msg, &text));
        assert!(policy().should_engage(&msg));
    }

    #[test]
    fn mention_entity_for_someone_else_is_ignored() {
        let mut msg = message("group", "hey @other_bot");
        msg.entities = vec![serde_json::from_value(json!({
            "type": "mention", "offset": 4, "length": 10
        }))
        .unwrap()];
        assert!(!policy().should_engage(&msg));
    }

    #[test]
    fn text_mention_of_bot_engages() {
        let mut msg = message("group", "hey you");
        msg.entities = vec![serde_json::from_value(json!({
            "type": "text_mention",
            "offset": 4,
            "length": 3,
            "user": {
                "id": BOT_ID,
                "is_bot": true,
                "first_name": "정후니",
                "username": "jeonghuni_bot"
            }
        }))
        .unwrap()];
        assert!(policy().should_engage(&msg));
    }

    #[test]
    fn reply_to_bot_engages() {
        let mut msg = message("group", "and then?");
        msg.reply_to_message = Some(Box::new(
            serde_json::from_value(json!({
                "message_id": 3,
                "from": {"id": BOT_ID, "is_bot": true, "first_name": "정후니"}
            }))
            .unwrap(),
        ));
        assert!(policy().should_engage(&msg));
    }

    #[test]
    fn reply_to_someone_else_is_ignored() {
        let mut msg = message("group", "and then?");
        msg.reply_to_message = Some(Box::new(
            serde_json::from_value(json!({
                "message_id": 3,
                "from": {"id": 5, "is_bot": false, "first_name": "Bob"}
            }))
            .unwrap(),
        ));
        assert!(!policy().should_engage(&msg));
    }

    #[test]
    fn identity_without_id_matches_username() {
        let bot = BotIdentity::from_username("jeonghuni_bot");
        assert!(bot.is(&user(json!({"id": 1, "username": "jeonghuni_bot"}))));
        assert!(!bot.is(&user(json!({"id": 1, "username": "other"}))));
        assert!(!bot.is(&user(json!({"id": 1}))));
    }

    #[test]
    fn empty_keyword_never_matches() {
        let p = ActivationPolicy::new(BotIdentity::from_username("jeonghuni_bot"), "");
        assert!(!p.should_engage(&message("group", "hello")));
        assert_eq!(p.extract_intent_text(" hello "), "hello");
    }

    #[test]
    fn sender_name_resolution() {
        let name = |value| resolve_sender_name(Some(&user(value)));

        assert_eq!(
            name(json!({"id": 1, "first_name": "Alice", "last_name": "Kim"})),
            "Alice Kim"
        );
        assert_eq!(name(json!({"id": 1, "first_name": "Alice"})), "Alice");
        assert_eq!(
            name(json!({"id": 1, "first_name": "", "last_name": "Kim"})),
            "Kim"
        );
        assert_eq!(
            name(json!({"id": 1, "first_name": "", "username": "alice_k"})),
            "alice_k"
        );
        assert_eq!(name(json!({"id": 1})), UNKNOWN_SENDER);
        assert_eq!(resolve_sender_name(None), UNKNOWN_SENDER);
    }
}
