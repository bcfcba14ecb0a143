//! Behavioural contract shared by every history backend.
//!
//! Each scenario is written once against `Arc<dyn HistoryStore>` and run for
//! both the in-memory store and the SQLite-backed store:
//! - FIFO eviction past the bound
//! - Clear is idempotent and conversations are isolated
//! - Concurrent appends to one conversation are never lost
//! - Idle conversations expire

use chrono::{TimeDelta, Utc};
use lingua_core::{HistoryEntry, HistoryStore, Language};
use lingua_history::{MemoryHistoryStore, SqlHistoryStore};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

const FIVE: NonZeroUsize = NonZeroUsize::new(5).unwrap();

fn entry(text: &str) -> HistoryEntry {
    HistoryEntry {
        text: text.to_string(),
        to_language: Language::Spanish,
        translation: format!("{text} (es)"),
        session_id: Uuid::now_v7(),
        timestamp: Utc::now(),
        model: "gpt-5-nano".to_string(),
        tokens: 10,
        latency_ms: 120,
    }
}

fn texts(entries: &[HistoryEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.text.as_str()).collect()
}

fn memory_store(ttl: Option<Duration>) -> Arc<dyn HistoryStore> {
    Arc::new(MemoryHistoryStore::new().with_ttl(ttl))
}

async fn sql_store(dir: &TempDir, ttl: Option<Duration>) -> Arc<dyn HistoryStore> {
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("history.db").display());
    Arc::new(SqlHistoryStore::connect(&url).await.unwrap().with_ttl(ttl))
}

// ---- scenarios ----

async fn evicts_oldest_past_bound(store: Arc<dyn HistoryStore>) {
    for i in 1..=6 {
        store.append("t", entry(&format!("e{i}")), FIVE).await.unwrap();
    }

    let history = store.get("t").await.unwrap();
    assert_eq!(texts(&history.entries), ["e2", "e3", "e4", "e5", "e6"]);
    assert_eq!(history.translation_count, 6);
}

async fn append_returns_stored_sequence(store: Arc<dyn HistoryStore>) {
    store.append("t", entry("first"), FIVE).await.unwrap();
    let returned = store.append("t", entry("second"), FIVE).await.unwrap();

    assert_eq!(texts(&returned.entries), ["first", "second"]);
    assert_eq!(returned, store.get("t").await.unwrap());
}

async fn newest_entry_has_latest_timestamp(store: Arc<dyn HistoryStore>) {
    let start = Utc::now();
    for i in 0..8 {
        let mut e = entry(&format!("e{i}"));
        e.timestamp = start + TimeDelta::seconds(i);
        store.append("t", e, FIVE).await.unwrap();
    }

    let history = store.get("t").await.unwrap();
    let latest = history.latest().unwrap();
    let newest = history.entries.iter().map(|e| e.timestamp).max().unwrap();
    assert_eq!(latest.timestamp, newest);
    assert_eq!(latest.timestamp, start + TimeDelta::seconds(7));
    assert!(
        history
            .entries
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    );
}

async fn duplicates_are_kept(store: Arc<dyn HistoryStore>) {
    store.append("t", entry("same"), FIVE).await.unwrap();
    store.append("t", entry("same"), FIVE).await.unwrap();

    assert_eq!(store.get("t").await.unwrap().len(), 2);
}

async fn unseen_conversation_is_empty(store: Arc<dyn HistoryStore>) {
    let history = store.get("never-seen").await.unwrap();
    assert!(history.is_empty());
    assert_eq!(history.translation_count, 0);
}

async fn clear_is_idempotent(store: Arc<dyn HistoryStore>) {
    store.append("t", entry("a"), FIVE).await.unwrap();

    store.clear("t").await.unwrap();
    store.clear("t").await.unwrap();
    store.clear("never-seen").await.unwrap();

    let history = store.get("t").await.unwrap();
    assert!(history.is_empty());
    assert_eq!(history.translation_count, 0);

    let after = store.append("t", entry("b"), FIVE).await.unwrap();
    assert_eq!(texts(&after.entries), ["b"]);
    assert_eq!(after.translation_count, 1);
}

async fn conversations_are_isolated(store: Arc<dyn HistoryStore>) {
    store.append("alpha", entry("a1"), FIVE).await.unwrap();
    store.append("beta", entry("b1"), FIVE).await.unwrap();
    store.append("alpha", entry("a2"), FIVE).await.unwrap();

    store.clear("beta").await.unwrap();

    assert_eq!(texts(&store.get("alpha").await.unwrap().entries), ["a1", "a2"]);
    assert!(store.get("beta").await.unwrap().is_empty());
}

async fn smaller_bound_trims_on_next_append(store: Arc<dyn HistoryStore>) {
    for i in 1..=5 {
        store.append("t", entry(&format!("e{i}")), FIVE).await.unwrap();
    }

    let two = NonZeroUsize::new(2).unwrap();
    let history = store.append("t", entry("e6"), two).await.unwrap();

    assert_eq!(texts(&history.entries), ["e5", "e6"]);
}

async fn concurrent_appends_are_not_lost(store: Arc<dyn HistoryStore>) {
    for i in 1..=4 {
        store.append("t", entry(&format!("e{i}")), FIVE).await.unwrap();
    }

    let (a, b) = tokio::join!(
        {
            let store = store.clone();
            tokio::spawn(async move { store.append("t", entry("a"), FIVE).await })
        },
        {
            let store = store.clone();
            tokio::spawn(async move { store.append("t", entry("b"), FIVE).await })
        }
    );
    a.unwrap().unwrap();
    b.unwrap().unwrap();

    let history = store.get("t").await.unwrap();
    let stored = texts(&history.entries);
    assert_eq!(stored.len(), 5);
    assert!(stored.contains(&"a"));
    assert!(stored.contains(&"b"));
    assert!(!stored.contains(&"e1"));
    assert_eq!(history.translation_count, 6);
}

async fn many_concurrent_appends_respect_bound(store: Arc<dyn HistoryStore>) {
    let handles: Vec<_> = (0..20)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.append("t", entry(&format!("c{i}")), FIVE).await })
        })
        .collect();

    for handle in handles {
        let history = handle.await.unwrap().unwrap();
        assert!(history.len() <= 5);
    }

    let history = store.get("t").await.unwrap();
    assert_eq!(history.len(), 5);
    assert_eq!(history.translation_count, 20);
}

async fn idle_conversation_expires(store: Arc<dyn HistoryStore>) {
    store.append("t", entry("old"), FIVE).await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(store.get("t").await.unwrap().is_empty());

    let fresh = store.append("t", entry("new"), FIVE).await.unwrap();
    assert_eq!(texts(&fresh.entries), ["new"]);
    assert_eq!(fresh.translation_count, 1);
}

async fn purge_removes_only_expired(store: Arc<dyn HistoryStore>) {
    store.append("stale", entry("s"), FIVE).await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    store.append("live", entry("l"), FIVE).await.unwrap();

    assert_eq!(store.purge_expired().await.unwrap(), 1);
    assert_eq!(store.get("live").await.unwrap().len(), 1);
}

const SHORT_TTL: Option<Duration> = Some(Duration::from_millis(200));

// ---- memory backend ----

#[tokio::test]
async fn test_memory_evicts_oldest_past_bound() {
    evicts_oldest_past_bound(memory_store(None)).await;
}

#[tokio::test]
async fn test_memory_append_returns_stored_sequence() {
    append_returns_stored_sequence(memory_store(None)).await;
}

#[tokio::test]
async fn test_memory_newest_entry_has_latest_timestamp() {
    newest_entry_has_latest_timestamp(memory_store(None)).await;
}

#[tokio::test]
async fn test_memory_duplicates_are_kept() {
    duplicates_are_kept(memory_store(None)).await;
}

#[tokio::test]
async fn test_memory_unseen_conversation_is_empty() {
    unseen_conversation_is_empty(memory_store(None)).await;
}

#[tokio::test]
async fn test_memory_clear_is_idempotent() {
    clear_is_idempotent(memory_store(None)).await;
}

#[tokio::test]
async fn test_memory_conversations_are_isolated() {
    conversations_are_isolated(memory_store(None)).await;
}

#[tokio::test]
async fn test_memory_smaller_bound_trims_on_next_append() {
    smaller_bound_trims_on_next_append(memory_store(None)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_memory_concurrent_appends_are_not_lost() {
    concurrent_appends_are_not_lost(memory_store(None)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_memory_many_concurrent_appends_respect_bound() {
    many_concurrent_appends_respect_bound(memory_store(None)).await;
}

#[tokio::test]
async fn test_memory_idle_conversation_expires() {
    idle_conversation_expires(memory_store(SHORT_TTL)).await;
}

#[tokio::test]
async fn test_memory_purge_removes_only_expired() {
    purge_removes_only_expired(memory_store(SHORT_TTL)).await;
}

// ---- sql backend ----

#[tokio::test]
async fn test_sql_evicts_oldest_past_bound() {
    let dir = TempDir::new().unwrap();
    evicts_oldest_past_bound(sql_store(&dir, None).await).await;
}

#[tokio::test]
async fn test_sql_append_returns_stored_sequence() {
    let dir = TempDir::new().unwrap();
    append_returns_stored_sequence(sql_store(&dir, None).await).await;
}

#[tokio::test]
async fn test_sql_newest_entry_has_latest_timestamp() {
    let dir = TempDir::new().unwrap();
    newest_entry_has_latest_timestamp(sql_store(&dir, None).await).await;
}

#[tokio::test]
async fn test_sql_duplicates_are_kept() {
    let dir = TempDir::new().unwrap();
    duplicates_are_kept(sql_store(&dir, None).await).await;
}

#[tokio::test]
async fn test_sql_unseen_conversation_is_empty() {
    let dir = TempDir::new().unwrap();
    unseen_conversation_is_empty(sql_store(&dir, None).await).await;
}

#[tokio::test]
async fn test_sql_clear_is_idempotent() {
    let dir = TempDir::new().unwrap();
    clear_is_idempotent(sql_store(&dir, None).await).await;
}

#[tokio::test]
async fn test_sql_conversations_are_isolated() {
    let dir = TempDir::new().unwrap();
    conversations_are_isolated(sql_store(&dir, None).await).await;
}

#[tokio::test]
async fn test_sql_smaller_bound_trims_on_next_append() {
    let dir = TempDir::new().unwrap();
    smaller_bound_trims_on_next_append(sql_store(&dir, None).await).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sql_concurrent_appends_are_not_lost() {
    let dir = TempDir::new().unwrap();
    concurrent_appends_are_not_lost(sql_store(&dir, None).await).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sql_many_concurrent_appends_respect_bound() {
    let dir = TempDir::new().unwrap();
    many_concurrent_appends_respect_bound(sql_store(&dir, None).await).await;
}

#[tokio::test]
async fn test_sql_idle_conversation_expires() {
    let dir = TempDir::new().unwrap();
    idle_conversation_expires(sql_store(&dir, SHORT_TTL).await).await;
}

#[tokio::test]
async fn test_sql_purge_removes_only_expired() {
    let dir = TempDir::new().unwrap();
    purge_removes_only_expired(sql_store(&dir, SHORT_TTL).await).await;
}

#[tokio::test]
async fn test_sql_history_survives_reconnect() {
    let dir = TempDir::new().unwrap();

    {
        let store = sql_store(&dir, None).await;
        store.append("t", entry("kept"), FIVE).await.unwrap();
    }

    let reopened = sql_store(&dir, None).await;
    let history = reopened.get("t").await.unwrap();
    assert_eq!(texts(&history.entries), ["kept"]);
    assert_eq!(history.translation_count, 1);
}
