//! SQLite document store for conversations.
//!
//! Implements `ConversationStore` from `parley-core`. Each conversation is
//! one row: the full serialized JSON document plus indexed columns for the
//! id, owner, and timestamps. Uniqueness of `conversation_id` is enforced by
//! a UNIQUE index, so racing creators resolve to exactly one winner inside
//! the database. `rowid` provides the insertion-order tiebreak for listings.

use futures_util::{stream, StreamExt, TryStreamExt};
use sqlx::Row;

use parley_core::store::conversation::{ConversationStore, ConversationStream};
use parley_types::chat::{is_valid_id, timestamp, utc_now, Conversation, DEFAULT_TITLE};
use parley_types::error::StoreError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ConversationStore`.
pub struct SqliteConversationStore {
    pool: DatabasePool,
}

impl SqliteConversationStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Idempotent schema setup. Invoke once before first use; not part of
    /// the per-request path.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS conversations (
                conversation_id TEXT NOT NULL,
                owner TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                document TEXT NOT NULL
            )"#,
        )
        .execute(&self.pool.writer)
        .await
        .map_err(to_backend)?;

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_conversations_id
             ON conversations (conversation_id)",
        )
        .execute(&self.pool.writer)
        .await
        .map_err(to_backend)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_conversations_owner_updated
             ON conversations (owner, updated_at DESC)",
        )
        .execute(&self.pool.writer)
        .await
        .map_err(to_backend)?;

        Ok(())
    }
}

fn to_backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

fn format_timestamp(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.format(timestamp::FORMAT).to_string()
}

fn decode_document(raw: &str) -> Result<Conversation, StoreError> {
    serde_json::from_str(raw)
        .map_err(|e| StoreError::Backend(format!("corrupt conversation document: {e}")))
}

impl ConversationStore for SqliteConversationStore {
    async fn exists(&self, conversation_id: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM conversations WHERE conversation_id = ?")
            .bind(conversation_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(to_backend)?;
        Ok(row.is_some())
    }

    async fn load(&self, conversation_id: &str) -> Result<Conversation, StoreError> {
        let row = sqlx::query("SELECT document FROM conversations WHERE conversation_id = ?")
            .bind(conversation_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(to_backend)?;

        match row {
            Some(row) => {
                let document: String = row.try_get("document").map_err(to_backend)?;
                decode_document(&document)
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let mut stamped = conversation.clone();
        stamped.updated_at = utc_now();
        let document = serde_json::to_string(&stamped)
            .map_err(|e| StoreError::Backend(format!("serialize conversation: {e}")))?;

        sqlx::query(
            r#"INSERT INTO conversations (conversation_id, owner, created_at, updated_at, document)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (conversation_id) DO UPDATE SET
                   owner = excluded.owner,
                   created_at = excluded.created_at,
                   updated_at = excluded.updated_at,
                   document = excluded.document"#,
        )
        .bind(&stamped.conversation_id)
        .bind(&stamped.owner)
        .bind(format_timestamp(&stamped.created_at))
        .bind(format_timestamp(&stamped.updated_at))
        .bind(document)
        .execute(&self.pool.writer)
        .await
        .map_err(to_backend)?;

        Ok(())
    }

    async fn create(
        &self,
        conversation_id: &str,
        title: Option<&str>,
        model: &str,
        system_prompt: &str,
        owner: Option<&str>,
    ) -> Result<Conversation, StoreError> {
        if !is_valid_id(conversation_id) {
            return Err(StoreError::InvalidId(conversation_id.to_string()));
        }
        let conversation = Conversation::new(
            conversation_id,
            title.unwrap_or(DEFAULT_TITLE),
            model,
            system_prompt,
            owner.map(str::to_string),
        );
        let document = serde_json::to_string(&conversation)
            .map_err(|e| StoreError::Backend(format!("serialize conversation: {e}")))?;

        let result = sqlx::query(
            r#"INSERT INTO conversations (conversation_id, owner, created_at, updated_at, document)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(&conversation.conversation_id)
        .bind(&conversation.owner)
        .bind(format_timestamp(&conversation.created_at))
        .bind(format_timestamp(&conversation.updated_at))
        .bind(document)
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(conversation),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::AlreadyExists(conversation_id.to_string()))
            }
            Err(err) => Err(to_backend(err)),
        }
    }

    async fn delete(&self, conversation_id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM conversations WHERE conversation_id = ?")
            .bind(conversation_id)
            .execute(&self.pool.writer)
            .await
            .map_err(to_backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_conversations(&self, owner: Option<&str>) -> Result<Vec<String>, StoreError> {
        let rows = match owner {
            Some(owner) => {
                sqlx::query(
                    "SELECT conversation_id FROM conversations WHERE owner = ?
                     ORDER BY updated_at DESC, rowid ASC",
                )
                .bind(owner)
                .fetch_all(&self.pool.reader)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT conversation_id FROM conversations
                     ORDER BY updated_at DESC, rowid ASC",
                )
                .fetch_all(&self.pool.reader)
                .await
            }
        }
        .map_err(to_backend)?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in &rows {
            ids.push(row.try_get("conversation_id").map_err(to_backend)?);
        }
        Ok(ids)
    }

    fn iter_owner<'a>(&'a self, owner: &'a str) -> ConversationStream<'a> {
        Box::pin(
            stream::once(async move { self.list_conversations(Some(owner)).await })
                .map(|ids| match ids {
                    Ok(ids) => stream::iter(ids.into_iter().map(Ok)).boxed(),
                    Err(err) => stream::once(async move { Err(err) }).boxed(),
                })
                .flatten()
                .and_then(move |id| async move { self.load(&id).await }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use parley_types::chat::MessageRole;

    async fn test_store() -> SqliteConversationStore {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        let pool = DatabasePool::new(&url).await.unwrap();
        let store = SqliteConversationStore::new(pool);
        store.ensure_indexes().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_ensure_indexes_idempotent() {
        let store = test_store().await;
        store.ensure_indexes().await.unwrap();
        store.ensure_indexes().await.unwrap();
    }

    #[tokio::test]
    async fn test_create_and_load_roundtrip() {
        let store = test_store().await;
        let created = store
            .create(
                "alice_travel",
                Some("Trip"),
                "gpt-4o-mini",
                "Be helpful.",
                Some("alice"),
            )
            .await
            .unwrap();
        assert_eq!(created.title, "Trip");

        let loaded = store.load("alice_travel").await.unwrap();
        assert_eq!(loaded.conversation_id, "alice_travel");
        assert_eq!(loaded.system_prompt, "Be helpful.");
        assert_eq!(loaded.owner.as_deref(), Some("alice"));
        assert!(loaded.messages.is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate_fails_regardless_of_owner() {
        let store = test_store().await;
        store
            .create("dup", None, "gpt-4o-mini", "", Some("alice"))
            .await
            .unwrap();
        let err = store
            .create("dup", None, "gpt-4o-mini", "", Some("bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_save_persists_messages_and_refreshes_updated_at() {
        let store = test_store().await;
        let mut conversation = store
            .create("c1", None, "gpt-4o-mini", "", Some("alice"))
            .await
            .unwrap();
        let before = conversation.updated_at;

        conversation.append(MessageRole::User, "hello", None, None);
        store.save(&conversation).await.unwrap();

        let loaded = store.load("c1").await.unwrap();
        assert_eq!(loaded.messages.len(), 1);
        assert_eq!(loaded.messages[0].content, "hello");
        assert!(loaded.updated_at >= before);
    }

    #[tokio::test]
    async fn test_delete_missing_fails() {
        let store = test_store().await;
        let err = store.delete("ghost").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        store
            .create("real", None, "gpt-4o-mini", "", None)
            .await
            .unwrap();
        store.delete("real").await.unwrap();
        assert!(!store.exists("real").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_scopes_by_owner() {
        let store = test_store().await;
        store
            .create("a1", None, "gpt-4o-mini", "", Some("alice"))
            .await
            .unwrap();
        store
            .create("b1", None, "gpt-4o-mini", "", Some("bob"))
            .await
            .unwrap();
        store
            .create("orphan", None, "gpt-4o-mini", "", None)
            .await
            .unwrap();

        let alice = store.list_conversations(Some("alice")).await.unwrap();
        assert_eq!(alice, vec!["a1".to_string()]);

        let all = store.list_conversations(None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_iter_owner_yields_documents() {
        let store = test_store().await;
        store
            .create("a1", Some("First"), "gpt-4o-mini", "", Some("alice"))
            .await
            .unwrap();
        store
            .create("a2", Some("Second"), "gpt-4o-mini", "", Some("alice"))
            .await
            .unwrap();

        let conversations: Vec<_> = store
            .iter_owner("alice")
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(conversations.len(), 2);
        assert!(conversations.iter().any(|c| c.title == "First"));
    }
}
