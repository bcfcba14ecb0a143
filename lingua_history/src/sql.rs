use async_trait::async_trait;
use chrono::Utc;
use lingua_core::{ConversationHistory, HistoryEntry, HistoryStore, StoreError};
use lingua_entities::conversation_history;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbBackend,
    DbErr, EntityTrait, QueryFilter, QuerySelect, Schema, Set, TransactionTrait,
};
use std::num::NonZeroUsize;
use std::time::Duration;
use tracing::{debug, info};

use crate::locks::KeyedLocks;
use crate::{expiry_cutoff, is_expired};

#[allow(clippy::needless_pass_by_value)]
fn unavailable(err: DbErr) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

/// History store backed by a sea-orm database.
///
/// Appends to one conversation are serialized by a per-conversation lock in
/// this process and run inside a transaction; on backends that support it the
/// row is also locked with `SELECT ... FOR UPDATE`.
pub struct SqlHistoryStore {
    db: DatabaseConnection,
    locks: KeyedLocks,
    ttl: Option<Duration>,
}

impl SqlHistoryStore {
    /// Connect to `database_url` and create the history table if needed.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to history database");
        let db = Database::connect(database_url).await?;
        Self::new(db).await
    }

    pub async fn new(db: DatabaseConnection) -> anyhow::Result<Self> {
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        let mut stmt = schema.create_table_from_entity(conversation_history::Entity);
        stmt.if_not_exists();
        db.execute_unprepared(&backend.build(&stmt).to_string())
            .await?;

        info!("SqlHistoryStore initialized");
        Ok(Self {
            db,
            locks: KeyedLocks::new(),
            ttl: None,
        })
    }

    /// Expire conversations idle longer than `ttl`.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    fn decode(&self, model: &conversation_history::Model) -> Result<ConversationHistory, StoreError> {
        if is_expired(model.updated_at.and_utc(), self.ttl) {
            return Ok(ConversationHistory::default());
        }
        Ok(ConversationHistory {
            entries: serde_json::from_str(&model.entries)?,
            translation_count: u64::try_from(model.translation_count).unwrap_or(0),
        })
    }

    fn supports_row_locks(&self) -> bool {
        !matches!(self.db.get_database_backend(), DbBackend::Sqlite)
    }
}

#[async_trait]
impl HistoryStore for SqlHistoryStore {
    async fn get(&self, conversation_id: &str) -> Result<ConversationHistory, StoreError> {
        let row = conversation_history::Entity::find_by_id(conversation_id.to_owned())
            .one(&self.db)
            .await
            .map_err(unavailable)?;

        row.map_or_else(|| Ok(ConversationHistory::default()), |model| self.decode(&model))
    }

    async fn append(
        &self,
        conversation_id: &str,
        entry: HistoryEntry,
        max_size: NonZeroUsize,
    ) -> Result<ConversationHistory, StoreError> {
        let _guard = self.locks.lock(conversation_id).await;
        let txn = self.db.begin().await.map_err(unavailable)?;

        let mut query = conversation_history::Entity::find_by_id(conversation_id.to_owned());
        if self.supports_row_locks() {
            query = query.lock_exclusive();
        }
        let existing = query.one(&txn).await.map_err(unavailable)?;

        let now = Utc::now().naive_utc();
        let mut history = match &existing {
            Some(model) => self.decode(model)?,
            None => ConversationHistory::default(),
        };
        let created_at = existing
            .as_ref()
            .filter(|_| !history.is_empty())
            .map_or(now, |model| model.created_at);

        history.push(entry, max_size);

        let row = conversation_history::ActiveModel {
            conversation_id: Set(conversation_id.to_owned()),
            entries: Set(serde_json::to_string(&history.entries)?),
            translation_count: Set(i64::try_from(history.translation_count).unwrap_or(i64::MAX)),
            created_at: Set(created_at),
            updated_at: Set(now),
        };

        if existing.is_some() {
            conversation_history::Entity::update(row)
                .exec(&txn)
                .await
                .map_err(unavailable)?;
        } else {
            row.insert(&txn).await.map_err(unavailable)?;
        }

        txn.commit().await.map_err(unavailable)?;

        debug!(
            "Appended to conversation {conversation_id}: {} entries",
            history.len()
        );
        Ok(history)
    }

    async fn clear(&self, conversation_id: &str) -> Result<(), StoreError> {
        let _guard = self.locks.lock(conversation_id).await;
        conversation_history::Entity::delete_by_id(conversation_id.to_owned())
            .exec(&self.db)
            .await
            .map_err(unavailable)?;

        debug!("Cleared conversation {conversation_id}");
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let Some(cutoff) = expiry_cutoff(self.ttl, Utc::now()) else {
            return Ok(0);
        };

        let result = conversation_history::Entity::delete_many()
            .filter(conversation_history::Column::UpdatedAt.lt(cutoff.naive_utc()))
            .exec(&self.db)
            .await
            .map_err(unavailable)?;

        if result.rows_affected > 0 {
            info!("Purged {} expired conversations", result.rows_affected);
        }
        Ok(result.rows_affected)
    }
}
