//! Telegram update deduplication cache

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default dedup TTL (5 minutes)
const DEDUP_TTL_SECS: u64 = 300;

/// Maximum dedup cache entries
const DEDUP_MAX_ENTRIES: usize = 2000;

/// Remembers recently seen `update_id`s
///
/// Telegram redelivers an update when the webhook answer is slow or lost;
/// without this the same message would be answered, and recorded, twice.
#[derive(Debug)]
pub struct UpdateDedup {
    seen: HashMap<i64, Instant>,
    ttl: Duration,
    max_entries: usize,
}

impl Default for UpdateDedup {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEDUP_TTL_SECS), DEDUP_MAX_ENTRIES)
    }
}

impl UpdateDedup {
    /// Create a cache with an explicit TTL and capacity
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            seen: HashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Record `update_id`, returning `true` if it was already seen within the TTL
    pub fn is_duplicate(&mut self, update_id: i64) -> bool {
        self.is_duplicate_at(update_id, Instant::now())
    }

    fn is_duplicate_at(&mut self, update_id: i64, now: Instant) -> bool {
        if let Some(first_seen) = self.seen.get(&update_id)
            && now.duration_since(*first_seen) < self.ttl
        {
            return true;
        }

        if self.seen.len() >= self.max_entries {
            self.seen
                .retain(|_, first_seen| now.duration_since(*first_seen) < self.ttl);
        }
        if self.seen.len() >= self.max_entries
            && let Some(oldest) = self
                .seen
                .iter()
                .min_by_key(|(_, first_seen)| **first_seen)
                .map(|(id, _)| *id)
        {
            self.seen.remove(&oldest);
        }

        self.seen.insert(update_id, now);
        false
    }
}
