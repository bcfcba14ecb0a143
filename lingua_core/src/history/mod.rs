//! Bounded per-conversation translation history.
//!
//! A conversation keeps at most `max_size` entries, oldest first. Appending
//! past the bound evicts the single oldest entry, so retention is governed by
//! recency of arrival only. Entries are never edited once stored; clearing a
//! conversation drops the whole sequence.
//!
//! Storage backends implement [`HistoryStore`] and share the eviction rule in
//! [`push_bounded`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use thiserror::Error;
use uuid::Uuid;

use crate::Language;

/// Summary of one past translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Source text, truncated to the display limit
    pub text: String,
    pub to_language: Language,
    /// Produced translation, truncated to the display limit
    pub translation: String,
    /// Per-request interaction id
    pub session_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub model: String,
    pub tokens: u32,
    pub latency_ms: u64,
}

/// Ordered history of one conversation, oldest entry first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationHistory {
    pub entries: Vec<HistoryEntry>,
    /// Translations appended since the conversation started or was last cleared.
    pub translation_count: u64,
}

impl ConversationHistory {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recently appended entry.
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Append `entry` as the newest item, evicting the oldest past `max_size`.
    pub fn push(&mut self, entry: HistoryEntry, max_size: NonZeroUsize) {
        push_bounded(&mut self.entries, entry, max_size);
        self.translation_count += 1;
    }
}

/// Push `entry` onto `entries` and evict from the front until the length is
/// at most `max_size`.
pub fn push_bounded(entries: &mut Vec<HistoryEntry>, entry: HistoryEntry, max_size: NonZeroUsize) {
    entries.push(entry);
    let excess = entries.len().saturating_sub(max_size.get());
    if excess > 0 {
        entries.drain(..excess);
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("history backend unavailable: {0}")]
    Unavailable(String),

    #[error("stored history is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Durable per-conversation history.
///
/// Implementations must serialize concurrent appends to the same
/// conversation so the bound holds on the final stored value. The store does
/// not deduplicate: appending the same entry twice keeps both.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Current history; empty for a conversation that never appended.
    async fn get(&self, conversation_id: &str) -> Result<ConversationHistory, StoreError>;

    /// Append `entry` as the newest item and return the updated history.
    async fn append(
        &self,
        conversation_id: &str,
        entry: HistoryEntry,
        max_size: NonZeroUsize,
    ) -> Result<ConversationHistory, StoreError>;

    /// Drop all entries. Clearing an unknown conversation is not an error.
    async fn clear(&self, conversation_id: &str) -> Result<(), StoreError>;

    /// Remove conversations idle past the store's expiry window and return
    /// how many were removed. Stores without expiry remove nothing.
    async fn purge_expired(&self) -> Result<u64, StoreError> {
        Ok(0)
    }
}

#[async_trait]
impl<T: HistoryStore + ?Sized> HistoryStore for std::sync::Arc<T> {
    async fn get(&self, conversation_id: &str) -> Result<ConversationHistory, StoreError> {
        (**self).get(conversation_id).await
    }

    async fn append(
        &self,
        conversation_id: &str,
        entry: HistoryEntry,
        max_size: NonZeroUsize,
    ) -> Result<ConversationHistory, StoreError> {
        (**self).append(conversation_id, entry, max_size).await
    }

    async fn clear(&self, conversation_id: &str) -> Result<(), StoreError> {
        (**self).clear(conversation_id).await
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        (**self).purge_expired().await
    }
}
