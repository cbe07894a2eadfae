//! Process-wide per-chat conversation store

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;

use super::{ChatId, MAX_CONTEXT, Role, Turn};

type History = Arc<Mutex<VecDeque<Turn>>>;

/// Bounded, ordered conversation history keyed by chat
///
/// The table lock is only held to look up or create a chat's history; appends
/// then serialize on that chat's own lock, so traffic in different chats does
/// not contend. With `max_chats` set, the chat least recently appended to is
/// dropped once the table is full.
pub struct ContextStore {
    max_turns: usize,
    chats: Mutex<LruCache<ChatId, History>>,
}

impl ContextStore {
    /// Create a store keeping at most `max_turns` turns per chat
    ///
    /// `max_chats` bounds the number of chats held; `None` keeps every chat for
    /// the lifetime of the process.
    #[must_use]
    pub fn new(max_turns: usize, max_chats: Option<NonZeroUsize>) -> Self {
        let chats = max_chats.map_or_else(LruCache::unbounded, LruCache::new);
        Self {
            max_turns: max_turns.max(1),
            chats: Mutex::new(chats),
        }
    }

    /// Append a turn to a chat, evicting the oldest turns beyond the cap
    pub fn append(&self, chat_id: ChatId, role: Role, content: impl Into<String>) {
        let history = self.history_for_append(chat_id);
        let mut turns = lock(&history);

        turns.push_back(Turn::new(role, content));
        while turns.len() > self.max_turns {
            turns.pop_front();
        }

        tracing::trace!(chat_id, %role, turns = turns.len(), "appended turn");
    }

    /// Snapshot of a chat's turns in append order (empty for unknown chats)
    #[must_use]
    pub fn read(&self, chat_id: ChatId) -> Vec<Turn> {
        let Some(history) = self.peek(chat_id) else {
            return Vec::new();
        };
        let turns = lock(&history);
        turns.iter().cloned().collect()
    }

    /// Number of turns currently held for a chat
    #[must_use]
    pub fn len(&self, chat_id: ChatId) -> usize {
        self.peek(chat_id).map_or(0, |history| {
            let turns = lock(&history);
            turns.len()
        })
    }

    /// Whether a chat has no recorded turns
    #[must_use]
    pub fn is_empty(&self, chat_id: ChatId) -> bool {
        self.len(chat_id) == 0
    }

    /// Number of chats with recorded history
    #[must_use]
    pub fn chat_count(&self) -> usize {
        lock(&self.chats).len()
    }

    fn peek(&self, chat_id: ChatId) -> Option<History> {
        lock(&self.chats).peek(&chat_id).map(Arc::clone)
    }

    fn history_for_append(&self, chat_id: ChatId) -> History {
        let mut chats = lock(&self.chats);
        if let Some(history) = chats.get(&chat_id) {
            return Arc::clone(history);
        }

        let history: History = Arc::new(Mutex::new(VecDeque::with_capacity(self.max_turns + 1)));
        if let Some((evicted, _)) = chats.push(chat_id, Arc::clone(&history)) {
            tracing::debug!(chat_id = evicted, "evicted least recently used chat context");
        }
        history
    }
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new(MAX_CONTEXT, None)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
