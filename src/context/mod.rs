//! Conversation context for chat completions
//!
//! Each chat keeps a short, ordered history of turns that is replayed to the
//! completion service on every request:
//! - user turns carry a `[sender]: ` label so group chats stay attributable
//! - assistant turns carry the raw generated text
//! - the oldest turns are evicted first once a chat exceeds its cap

mod store;

pub use store::ContextStore;

/// Telegram chat identifier, the partition key for all context state
pub type ChatId = i64;

/// Default maximum number of turns kept per chat
pub const MAX_CONTEXT: usize = 20;

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire name used by chat-completion APIs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message-equivalent unit of conversation history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    /// Create a turn
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a user turn labelled with the sender's display name
    #[must_use]
    pub fn labelled_user(sender_name: &str, text: &str) -> Self {
        Self::new(Role::User, format!("[{sender_name}]: {text}"))
    }
}
