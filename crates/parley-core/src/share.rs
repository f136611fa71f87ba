//! Sharing and claiming conversations.
//!
//! Any caller that can resolve a conversation id may preview it read-only,
//! provided the conversation has an owner -- ownerless conversations are
//! never previewable. Claiming deep-copies the conversation into the
//! claimer's namespace under a fresh id; the source is never touched.

use tracing::info;
use uuid::Uuid;

use parley_types::chat::{utc_now, Conversation};
use parley_types::error::{ShareError, StoreError};

use crate::store::conversation::ConversationStore;

/// Generate an opaque conversation id (32-char UUIDv7 hex).
pub fn generate_conversation_id() -> String {
    Uuid::now_v7().simple().to_string()
}

/// Share/claim workflow over a [`ConversationStore`].
pub struct ShareService<S: ConversationStore> {
    store: S,
}

impl<S: ConversationStore> ShareService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read-only view of a shared conversation.
    ///
    /// Fails with [`ShareError::NotFound`] when the conversation is absent
    /// or has no owner.
    pub async fn preview(&self, conversation_id: &str) -> Result<Conversation, ShareError> {
        let conversation = self
            .store
            .load(conversation_id)
            .await
            .map_err(map_not_found)?;
        if conversation.owner.is_none() {
            return Err(ShareError::NotFound);
        }
        Ok(conversation)
    }

    /// Copy a conversation into `new_owner`'s namespace.
    ///
    /// Claiming your own conversation is an idempotent no-op returning the
    /// source unchanged. Otherwise the clone gets a fresh id and timestamps,
    /// and owns independent copies of every message -- mutating the clone
    /// never affects the source.
    #[tracing::instrument(
        name = "claim_conversation",
        skip(self),
        fields(conversation_id = %conversation_id, new_owner = %new_owner)
    )]
    pub async fn claim(
        &self,
        conversation_id: &str,
        new_owner: &str,
    ) -> Result<Conversation, ShareError> {
        let source = self
            .store
            .load(conversation_id)
            .await
            .map_err(map_not_found)?;
        let Some(owner) = source.owner.as_deref() else {
            return Err(ShareError::NotFound);
        };
        if owner == new_owner {
            return Ok(source);
        }

        let now = utc_now();
        let clone = Conversation {
            conversation_id: generate_conversation_id(),
            title: source.title.clone(),
            model: source.model.clone(),
            system_prompt: source.system_prompt.clone(),
            created_at: now,
            updated_at: now,
            owner: Some(new_owner.to_string()),
            messages: source.messages.clone(),
            participants: source.participants.clone(),
        };
        self.store.save(&clone).await?;
        // Return the durably committed record; a miss here is a backend
        // consistency failure, surfaced rather than papered over.
        let committed = match self.store.load(&clone.conversation_id).await {
            Ok(committed) => committed,
            Err(StoreError::NotFound) => {
                return Err(ShareError::Store(StoreError::Inconsistent(
                    clone.conversation_id.clone(),
                )));
            }
            Err(err) => return Err(ShareError::Store(err)),
        };
        info!(clone_id = %committed.conversation_id, "conversation claimed");
        Ok(committed)
    }
}

fn map_not_found(err: StoreError) -> ShareError {
    match err {
        StoreError::NotFound => ShareError::NotFound,
        other => ShareError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::chat::MessageRole;
    use serde_json::json;

    use crate::store::memory::MemoryConversationStore;

    async fn seeded_store() -> MemoryConversationStore {
        let store = MemoryConversationStore::new();
        let mut conversation = store
            .create("shared", Some("Trip Notes"), "gpt-4o-mini", "", Some("alice"))
            .await
            .unwrap();
        conversation.append(MessageRole::User, "pack list?", None, None);
        conversation.append(MessageRole::Assistant, "bring socks", None, None);
        store.save(&conversation).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_preview_requires_owner() {
        let store = MemoryConversationStore::new();
        store
            .create("orphan", None, "gpt-4o-mini", "", None)
            .await
            .unwrap();
        let service = ShareService::new(store);

        let err = service.preview("orphan").await.unwrap_err();
        assert!(matches!(err, ShareError::NotFound));
    }

    #[tokio::test]
    async fn test_preview_returns_owned_conversation() {
        let service = ShareService::new(seeded_store().await);
        let conversation = service.preview("shared").await.unwrap();
        assert_eq!(conversation.title, "Trip Notes");
        assert_eq!(conversation.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_claim_by_owner_is_idempotent() {
        let service = ShareService::new(seeded_store().await);

        let first = service.claim("shared", "alice").await.unwrap();
        let second = service.claim("shared", "alice").await.unwrap();
        assert_eq!(first.conversation_id, "shared");
        assert_eq!(second.conversation_id, "shared");
        assert_eq!(service.store().len(), 1);
    }

    #[tokio::test]
    async fn test_claim_by_other_user_clones_deeply() {
        let service = ShareService::new(seeded_store().await);

        let mut clone = service.claim("shared", "bob").await.unwrap();
        assert_ne!(clone.conversation_id, "shared");
        assert_eq!(clone.owner.as_deref(), Some("bob"));
        assert_eq!(clone.messages.len(), 2);

        // Mutating the clone's message metadata must not leak into the source.
        clone.messages[0]
            .metadata
            .insert("flag".to_string(), json!(true));
        service.store().save(&clone).await.unwrap();

        let source = service.store().load("shared").await.unwrap();
        assert_eq!(source.owner.as_deref(), Some("alice"));
        assert!(source.messages[0].metadata.is_empty());
    }

    #[tokio::test]
    async fn test_claim_missing_or_ownerless_fails() {
        let store = MemoryConversationStore::new();
        store
            .create("orphan", None, "gpt-4o-mini", "", None)
            .await
            .unwrap();
        let service = ShareService::new(store);

        assert!(matches!(
            service.claim("ghost", "bob").await.unwrap_err(),
            ShareError::NotFound
        ));
        assert!(matches!(
            service.claim("orphan", "bob").await.unwrap_err(),
            ShareError::NotFound
        ));
    }
}
