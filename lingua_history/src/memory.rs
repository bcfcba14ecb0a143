use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lingua_core::{ConversationHistory, HistoryEntry, HistoryStore, StoreError};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use crate::is_expired;

#[derive(Debug, Clone)]
struct Slot {
    history: ConversationHistory,
    updated_at: DateTime<Utc>,
}

/// Process-local history store.
///
/// Every operation runs under one map lock, so appends to the same
/// conversation can never interleave.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    conversations: Mutex<HashMap<String, Slot>>,
    ttl: Option<Duration>,
}

impl MemoryHistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire conversations idle longer than `ttl`.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    /// Number of live conversations.
    pub async fn len(&self) -> usize {
        self.conversations
            .lock()
            .await
            .values()
            .filter(|slot| !is_expired(slot.updated_at, self.ttl))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn get(&self, conversation_id: &str) -> Result<ConversationHistory, StoreError> {
        let conversations = self.conversations.lock().await;
        Ok(conversations
            .get(conversation_id)
            .filter(|slot| !is_expired(slot.updated_at, self.ttl))
            .map(|slot| slot.history.clone())
            .unwrap_or_default())
    }

    async fn append(
        &self,
        conversation_id: &str,
        entry: HistoryEntry,
        max_size: NonZeroUsize,
    ) -> Result<ConversationHistory, StoreError> {
        let mut conversations = self.conversations.lock().await;
        let now = Utc::now();

        let slot = conversations
            .entry(conversation_id.to_string())
            .or_insert_with(|| Slot {
                history: ConversationHistory::default(),
                updated_at: now,
            });

        if is_expired(slot.updated_at, self.ttl) {
            debug!("Conversation {conversation_id} expired, starting fresh");
            slot.history = ConversationHistory::default();
        }

        slot.history.push(entry, max_size);
        slot.updated_at = now;

        debug!(
            "Appended to conversation {conversation_id}: {} entries",
            slot.history.len()
        );
        Ok(slot.history.clone())
    }

    async fn clear(&self, conversation_id: &str) -> Result<(), StoreError> {
        self.conversations.lock().await.remove(conversation_id);
        debug!("Cleared conversation {conversation_id}");
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let mut conversations = self.conversations.lock().await;
        let before = conversations.len();
        conversations.retain(|_, slot| !is_expired(slot.updated_at, self.ttl));
        Ok(u64::try_from(before - conversations.len()).unwrap_or(u64::MAX))
    }
}
