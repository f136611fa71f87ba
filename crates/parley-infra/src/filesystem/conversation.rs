//! Filesystem JSON store for conversations.
//!
//! Implements `ConversationStore` from `parley-core` with one
//! pretty-printed JSON document per conversation at
//! `{root}/{sanitized_id}.json`. Ids are sanitized when mapped to paths
//! (characters outside alphanumerics/`-_.` are dropped). `create` relies on
//! `create_new` open semantics so concurrent creators racing on one id get
//! exactly one winner; `save` is whole-file replacement, last writer wins.

use std::path::{Path, PathBuf};

use futures_util::{stream, StreamExt, TryStreamExt};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use parley_core::store::conversation::{ConversationStore, ConversationStream};
use parley_types::chat::{is_valid_id, sanitize_id, utc_now, Conversation, DEFAULT_TITLE};
use parley_types::error::StoreError;

/// Filesystem-backed implementation of `ConversationStore`.
pub struct FsConversationStore {
    root: PathBuf,
}

impl FsConversationStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::Backend(format!("create store root: {e}")))?;
        Ok(Self { root })
    }

    /// Map a conversation id to its document path.
    pub fn path_for(&self, conversation_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_id(conversation_id)))
    }

    fn encode(conversation: &Conversation) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec_pretty(conversation)
            .map_err(|e| StoreError::Backend(format!("serialize conversation: {e}")))
    }

    async fn read_document(path: &Path) -> Result<Conversation, StoreError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound
            } else {
                StoreError::Backend(format!("read conversation: {e}"))
            }
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| StoreError::Backend(format!("corrupt conversation document: {e}")))
    }

    /// Load every document, skipping entries that fail to parse (logged),
    /// sorted by `updated_at` descending with `(created_at, id)` tiebreak.
    async fn sorted_documents(&self) -> Result<Vec<Conversation>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::Backend(format!("list store root: {e}")))?;

        let mut documents = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Backend(format!("list store root: {e}")))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_document(&path).await {
                Ok(conversation) => documents.push(conversation),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable conversation file");
                }
            }
        }

        documents.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.conversation_id.cmp(&b.conversation_id))
        });
        Ok(documents)
    }
}

impl ConversationStore for FsConversationStore {
    async fn exists(&self, conversation_id: &str) -> Result<bool, StoreError> {
        tokio::fs::try_exists(self.path_for(conversation_id))
            .await
            .map_err(|e| StoreError::Backend(format!("stat conversation: {e}")))
    }

    async fn load(&self, conversation_id: &str) -> Result<Conversation, StoreError> {
        Self::read_document(&self.path_for(conversation_id)).await
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let mut stamped = conversation.clone();
        stamped.updated_at = utc_now();
        let bytes = Self::encode(&stamped)?;
        tokio::fs::write(self.path_for(&stamped.conversation_id), bytes)
            .await
            .map_err(|e| StoreError::Backend(format!("write conversation: {e}")))
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
        let bytes = Self::encode(&conversation)?;

        // create_new makes the filesystem arbitrate racing creators.
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.path_for(conversation_id))
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    StoreError::AlreadyExists(conversation_id.to_string())
                } else {
                    StoreError::Backend(format!("create conversation: {e}"))
                }
            })?;
        file.write_all(&bytes)
            .await
            .map_err(|e| StoreError::Backend(format!("write conversation: {e}")))?;

        Ok(conversation)
    }

    async fn delete(&self, conversation_id: &str) -> Result<(), StoreError> {
        tokio::fs::remove_file(self.path_for(conversation_id))
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StoreError::NotFound
                } else {
                    StoreError::Backend(format!("delete conversation: {e}"))
                }
            })
    }

    async fn list_conversations(&self, owner: Option<&str>) -> Result<Vec<String>, StoreError> {
        let documents = self.sorted_documents().await?;
        Ok(documents
            .into_iter()
            .filter(|c| match owner {
                Some(owner) => c.owner.as_deref() == Some(owner),
                None => true,
            })
            .map(|c| c.conversation_id)
            .collect())
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
