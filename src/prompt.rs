//! System instruction lookup
//!
//! Picks the instruction sent ahead of the conversation history, keyed by who
//! is talking. `{name}` in any instruction is replaced with the sender's
//! display name.

use std::collections::HashMap;

/// Instruction used for people without a dedicated entry
pub const DEFAULT_PROMPT: &str = "You are 정후니 (@jeonghuni_bot), a friendly assistant in a Telegram chat. \
You are currently talking with {name}. Every user message is prefixed with [sender name] \
so you can tell group members apart; never add such a prefix to your own replies. \
Answer concisely, in the language the user wrote in.";

/// Instruction used when the sender is another bot
pub const AUTOMATED_PROMPT: &str = "You are 정후니 (@jeonghuni_bot), a friendly assistant in a Telegram chat. \
The latest message comes from {name}, which is an automated account, not a person. \
Every user message is prefixed with [sender name]. Keep the reply short and do not ask follow-up questions.";

/// Sender-keyed system instruction table
#[derive(Debug, Clone)]
pub struct PromptTable {
    default: String,
    automated: String,
    senders: HashMap<String, String>,
}

impl PromptTable {
    /// Create a table from its default, automated-sender and per-sender entries
    #[must_use]
    pub const fn new(default: String, automated: String, senders: HashMap<String, String>) -> Self {
        Self {
            default,
            automated,
            senders,
        }
    }

    /// Resolve the instruction for a sender
    ///
    /// A per-sender entry wins; otherwise bots get the automated instruction
    /// and everyone else the default one.
    #[must_use]
    pub fn resolve(&self, sender_name: &str, is_bot_sender: bool) -> String {
        let template = match self.senders.get(sender_name) {
            Some(prompt) => prompt,
            None if is_bot_sender => &self.automated,
            None => &self.default,
        };
        template.replace("{name}", sender_name)
    }
}

impl Default for PromptTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_PROMPT.to_string(),
            AUTOMATED_PROMPT.to_string(),
            HashMap::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PromptTable {
        let mut senders = HashMap::new();
        senders.insert("Alice".to_string(), "Alice is the owner. Greet {name} warmly.".to_string());
        PromptTable::new("Talking to {name}.".to_string(), "Bot {name}.".to_string(), senders)
    }

    #[test]
    fn per_sender_entry_wins() {
        assert_eq!(table().resolve("Alice", false), "Alice is the owner. Greet Alice warmly.");
        assert_eq!(table().resolve("Alice", true), "Alice is the owner. Greet Alice warmly.");
    }

    #[test]
    fn bots_get_automated_prompt() {
        assert_eq!(table().resolve("helper_bot", true), "Bot helper_bot.");
    }

    #[test]
    fn people_get_default_prompt() {
        assert_eq!(table().resolve("Bob Lee", false), "Talking to Bob Lee.");
    }

    #[test]
    fn default_table_mentions_sender() {
        let prompt = PromptTable::default().resolve("Bob", false);
        assert!(prompt.contains("talking with Bob"));
        assert!(!prompt.contains("{name}"));
    }
}
