//! Backend selection for the CLI.
//!
//! `AnyStore` dispatches the `ConversationStore` contract to whichever
//! backend the user picked, so every command handler stays backend-agnostic.

use parley_core::store::conversation::{ConversationStore, ConversationStream};
use parley_infra::filesystem::FsConversationStore;
use parley_infra::sqlite::SqliteConversationStore;
use parley_types::chat::Conversation;
use parley_types::error::StoreError;

pub enum AnyStore {
    Sqlite(SqliteConversationStore),
    Fs(FsConversationStore),
}

impl ConversationStore for AnyStore {
    async fn exists(&self, conversation_id: &str) -> Result<bool, StoreError> {
        match self {
            AnyStore::Sqlite(store) => store.exists(conversation_id).await,
            AnyStore::Fs(store) => store.exists(conversation_id).await,
        }
    }

    async fn load(&self, conversation_id: &str) -> Result<Conversation, StoreError> {
        match self {
            AnyStore::Sqlite(store) => store.load(conversation_id).await,
            AnyStore::Fs(store) => store.load(conversation_id).await,
        }
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), StoreError> {
        match self {
            AnyStore::Sqlite(store) => store.save(conversation).await,
            AnyStore::Fs(store) => store.save(conversation).await,
        }
    }

    async fn create(
        &self,
        conversation_id: &str,
        title: Option<&str>,
        model: &str,
        system_prompt: &str,
        owner: Option<&str>,
    ) -> Result<Conversation, StoreError> {
        match self {
            AnyStore::Sqlite(store) => {
                store
                    .create(conversation_id, title, model, system_prompt, owner)
                    .await
            }
            AnyStore::Fs(store) => {
                store
                    .create(conversation_id, title, model, system_prompt, owner)
                    .await
            }
        }
    }

    async fn delete(&self, conversation_id: &str) -> Result<(), StoreError> {
        match self {
            AnyStore::Sqlite(store) => store.delete(conversation_id).await,
            AnyStore::Fs(store) => store.delete(conversation_id).await,
        }
    }

    async fn list_conversations(&self, owner: Option<&str>) -> Result<Vec<String>, StoreError> {
        match self {
            AnyStore::Sqlite(store) => store.list_conversations(owner).await,
            AnyStore::Fs(store) => store.list_conversations(owner).await,
        }
    }

    fn iter_owner<'a>(&'a self, owner: &'a str) -> ConversationStream<'a> {
        match self {
            AnyStore::Sqlite(store) => store.iter_owner(owner),
            AnyStore::Fs(store) => store.iter_owner(owner),
        }
    }
}
