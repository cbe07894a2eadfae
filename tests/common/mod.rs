//! Shared test utilities

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use jeonghuni_bot::api::ApiState;
use jeonghuni_bot::api::webhooks::telegram::types::TelegramUpdate;
use jeonghuni_bot::{
    ActivationPolicy, BotIdentity, Channel, ChatId, CompletionClient, ContextStore, Error,
    PromptTable, Responder, Turn,
};
use serde_json::{Value, json};
use tokio::sync::Mutex;

pub const BOT_ID: i64 = 999;
pub const BOT_USERNAME: &str = "jeonghuni_bot";
pub const KEYWORD: &str = "정후니";
pub const GROUP_ID: ChatId = -100_123;

/// Something the bot did on the chat platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Sent {
        chat_id: ChatId,
        text: String,
        reply_to: Option<i64>,
    },
    Edited {
        chat_id: ChatId,
        message_id: i64,
        text: String,
    },
}

/// Channel that records everything instead of calling Telegram
#[derive(Default)]
pub struct MockChannel {
    pub outbound: Mutex<Vec<Outbound>>,
    pub fail_sends: bool,
    pub fail_edits: bool,
    next_id: Mutex<i64>,
}

impl MockChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_edits() -> Arc<Self> {
        Arc::new(Self {
            fail_edits: true,
            ..Self::default()
        })
    }

    pub fn failing_sends() -> Arc<Self> {
        Arc::new(Self {
            fail_sends: true,
            ..Self::default()
        })
    }

    pub async fn outbound(&self) -> Vec<Outbound> {
        self.outbound.lock().await.clone()
    }
}

#[async_trait]
impl Channel for MockChannel {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_to: Option<i64>,
    ) -> jeonghuni_bot::Result<i64> {
        if self.fail_sends {
            return Err(Error::Channel("send refused".to_string()));
        }
        self.outbound.lock().await.push(Outbound::Sent {
            chat_id,
            text: text.to_string(),
            reply_to,
        });
        let mut next = self.next_id.lock().await;
        *next += 1;
        Ok(1000 + *next)
    }

    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: i64,
        text: &str,
    ) -> jeonghuni_bot::Result<()> {
        if self.fail_edits {
            return Err(Error::Channel("message to edit not found".to_string()));
        }
        self.outbound.lock().await.push(Outbound::Edited {
            chat_id,
            message_id,
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Completion service with a fixed answer
pub struct ScriptedCompletion {
    reply: Result<String, String>,
    pub calls: std::sync::Mutex<Vec<(String, Vec<Turn>)>>,
}

impl ScriptedCompletion {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: std::sync::Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: std::sync::Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<(String, Vec<Turn>)> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(
        &self,
        system_instruction: &str,
        turns: &[Turn],
    ) -> jeonghuni_bot::Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_instruction.to_string(), turns.to_vec()));
        self.reply.clone().map_err(Error::Completion)
    }
}

/// Activation policy for the test bot
pub fn policy() -> ActivationPolicy {
    let bot = BotIdentity {
        id: Some(BOT_ID),
        username: BOT_USERNAME.to_string(),
    };
    ActivationPolicy::new(bot, KEYWORD)
}

/// Responder with a fresh store and a recognisable prompt table
pub fn responder(completion: Arc<ScriptedCompletion>) -> Responder {
    let prompts = PromptTable::new(
        "talking to {name}".to_string(),
        "talking to bot {name}".to_string(),
        HashMap::from([("Boss".to_string(), "serving {name}".to_string())]),
    );
    Responder::new(
        Arc::new(ContextStore::default()),
        Arc::new(prompts),
        completion,
        "sorry, could not generate a response",
    )
}

/// Build handler state around the given collaborators
pub fn build_state(channel: Arc<MockChannel>, completion: Arc<ScriptedCompletion>) -> ApiState {
    ApiState::new(channel, policy(), responder(completion))
}

/// A human sender
pub fn alice() -> Value {
    json!({ "id": 1, "is_bot": false, "first_name": "Alice", "username": "alice" })
}

/// A text message update in a group chat
pub fn group_text(update_id: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": 10,
            "date": 1_700_000_000,
            "chat": { "id": GROUP_ID, "type": "supergroup", "title": "friends" },
            "from": alice(),
            "text": text
        }
    })
}

/// A text message update in a private chat with Alice
pub fn private_text(update_id: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": 20,
            "date": 1_700_000_000,
            "chat": { "id": 1, "type": "private" },
            "from": alice(),
            "text": text
        }
    })
}

pub fn update(value: Value) -> TelegramUpdate {
    serde_json::from_value(value).expect("valid update")
}
