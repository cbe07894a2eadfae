//! Completion orchestration for a single engaged message
//!
//! Records the user's turn, replays the chat's history to the completion
//! service, then records and returns the reply.

use std::sync::Arc;

use crate::Result;
use crate::context::{ChatId, ContextStore, Role, Turn};
use crate::llm::CompletionClient;
use crate::prompt::PromptTable;

/// Produces replies from per-chat conversation history
#[derive(Clone)]
pub struct Responder {
    store: Arc<ContextStore>,
    prompts: Arc<PromptTable>,
    completion: Arc<dyn CompletionClient>,
    empty_fallback: String,
}

impl Responder {
    /// Create a responder
    ///
    /// `empty_fallback` replaces a completion that came back empty; it is
    /// recorded as the assistant's turn like any other reply.
    #[must_use]
    pub fn new(
        store: Arc<ContextStore>,
        prompts: Arc<PromptTable>,
        completion: Arc<dyn CompletionClient>,
        empty_fallback: impl Into<String>,
    ) -> Self {
        Self {
            store,
            prompts,
            completion,
            empty_fallback: empty_fallback.into(),
        }
    }

    /// The context store this responder records into
    #[must_use]
    pub const fn store(&self) -> &Arc<ContextStore> {
        &self.store
    }

    /// Generate the reply to `intent_text` from `sender_name` in `chat_id`
    ///
    /// The user's turn is recorded before the completion call, so the call
    /// always sees it as the newest turn. If the call fails, that turn stays
    /// recorded without an assistant answer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Completion`] if the completion service fails
    pub async fn respond(
        &self,
        chat_id: ChatId,
        sender_name: &str,
        is_bot_sender: bool,
        intent_text: &str,
    ) -> Result<String> {
        let instruction = self.prompts.resolve(sender_name, is_bot_sender);

        let user_turn = Turn::labelled_user(sender_name, intent_text);
        self.store.append(chat_id, user_turn.role, user_turn.content);

        let history = self.store.read(chat_id);
        tracing::debug!(
            chat_id,
            turns = history.len(),
            client = self.completion.name(),
            "requesting completion"
        );

        let generated = self
            .completion
            .complete(&instruction, &history)
            .await
            .inspect_err(|e| tracing::warn!(chat_id, error = %e, "completion failed"))?;

        let reply = if generated.trim().is_empty() {
            tracing::warn!(chat_id, "completion returned no text, using fallback");
            self.empty_fallback.clone()
        } else {
            generated
        };

        self.store.append(chat_id, Role::Assistant, reply.clone());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::Error;

    /// Scripted completion client that records what it was shown
    struct ScriptedCompletion {
        reply: std::result::Result<String, String>,
        seen: Mutex<Vec<(String, Vec<Turn>)>>,
    }

    impl ScriptedCompletion {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedCompletion {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn complete(&self, system_instruction: &str, turns: &[Turn]) -> Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((system_instruction.to_string(), turns.to_vec()));
            self.reply.clone().map_err(Error::Completion)
        }
    }

    fn responder(completion: Arc<ScriptedCompletion>) -> Responder {
        Responder::new(
            Arc::new(ContextStore::default()),
            Arc::new(PromptTable::new(
                "human {name}".to_string(),
                "bot {name}".to_string(),
                std::collections::HashMap::new(),
            )),
            completion,
            "sorry, could not generate a response",
        )
    }

    #[tokio::test]
    async fn records_user_then_assistant_turn() {
        let completion = ScriptedCompletion::replying("hello Alice");
        let responder = responder(completion.clone());

        let reply = responder.respond(1, "Alice", false, "hi").await.unwrap();

        assert_eq!(reply, "hello Alice");
        assert_eq!(
            responder.store().read(1),
            vec![
                Turn::new(Role::User, "[Alice]: hi"),
                Turn::new(Role::Assistant, "hello Alice"),
            ]
        );
    }

    #[tokio::test]
    async fn completion_sees_triggering_turn_last() {
        let completion = ScriptedCompletion::replying("ok");
        let responder = responder(completion.clone());

        responder.respond(1, "Alice", false, "first").await.unwrap();
        responder.respond(1, "Bob", true, "second").await.unwrap();

        let seen = completion.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        let (instruction, turns) = &seen[1];
        assert_eq!(instruction, "bot Bob");
        assert_eq!(turns.len(), 3);
        assert_eq!(turns.last(), Some(&Turn::new(Role::User, "[Bob]: second")));
        drop(seen);
    }

    #[tokio::test]
    async fn empty_completion_uses_recorded_fallback() {
        let completion = ScriptedCompletion::replying("   ");
        let responder = responder(completion);

        let reply = responder.respond(1, "Alice", false, "hi").await.unwrap();

        assert_eq!(reply, "sorry, could not generate a response");
        let turns = responder.store().read(1);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1], Turn::new(Role::Assistant, "sorry, could not generate a response"));
    }

    #[tokio::test]
    async fn failure_leaves_orphan_user_turn() {
        let completion = ScriptedCompletion::failing("quota exceeded");
        let responder = responder(completion);

        let result = responder.respond(1, "Alice", false, "hi").await;

        assert!(matches!(result, Err(Error::Completion(_))));
        assert_eq!(responder.store().read(1), vec![Turn::new(Role::User, "[Alice]: hi")]);
    }

    #[tokio::test]
    async fn history_stays_capped() {
        let completion = ScriptedCompletion::replying("ok");
        let responder = responder(completion);

        for i in 0..15 {
            responder.respond(3, "Alice", false, &format!("m{i}")).await.unwrap();
        }

        let turns = responder.store().read(3);
        assert_eq!(turns.len(), crate::context::MAX_CONTEXT);
        assert_eq!(turns.last(), Some(&Turn::new(Role::Assistant, "ok")));
        assert_eq!(turns[0], Turn::new(Role::User, "[Alice]: m5"));
    }
}
