//! In-memory conversation store.
//!
//! Backs unit tests and embedded usage. Implements the same contract as the
//! persistent backends, including insertion-order tiebreaks on listing.

use std::collections::btree_map::Entry as MapEntry;
use std::collections::BTreeMap;
use std::sync::Mutex;

use futures_util::stream;

use parley_types::chat::{is_valid_id, utc_now, Conversation, DEFAULT_TITLE};
use parley_types::error::StoreError;

use super::conversation::{ConversationStore, ConversationStream};

struct Entry {
    seq: u64,
    conversation: Conversation,
}

#[derive(Default)]
struct Inner {
    next_seq: u64,
    docs: BTreeMap<String, Entry>,
}

/// Process-local [`ConversationStore`] backed by a mutex-guarded map.
#[derive(Default)]
pub struct MemoryConversationStore {
    inner: Mutex<Inner>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored conversations. Test helper.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("store mutex poisoned").docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sorted_ids(&self, owner: Option<&str>) -> Vec<String> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut entries: Vec<_> = inner
            .docs
            .values()
            .filter(|entry| match owner {
                Some(owner) => entry.conversation.owner.as_deref() == Some(owner),
                None => true,
            })
            .map(|entry| {
                (
                    entry.conversation.updated_at,
                    entry.seq,
                    entry.conversation.conversation_id.clone(),
                )
            })
            .collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        entries.into_iter().map(|(_, _, id)| id).collect()
    }
}

impl ConversationStore for MemoryConversationStore {
    async fn exists(&self, conversation_id: &str) -> Result<bool, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.docs.contains_key(conversation_id))
    }

    async fn load(&self, conversation_id: &str) -> Result<Conversation, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner
            .docs
            .get(conversation_id)
            .map(|entry| entry.conversation.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let mut stamped = conversation.clone();
        stamped.updated_at = utc_now();

        let mut guard = self.inner.lock().expect("store mutex poisoned");
        let inner = &mut *guard;
        let next_seq = inner.next_seq;
        match inner.docs.entry(stamped.conversation_id.clone()) {
            MapEntry::Occupied(mut entry) => entry.get_mut().conversation = stamped,
            MapEntry::Vacant(entry) => {
                entry.insert(Entry {
                    seq: next_seq,
                    conversation: stamped,
                });
                inner.next_seq += 1;
            }
        }
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

        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if inner.docs.contains_key(conversation_id) {
            return Err(StoreError::AlreadyExists(conversation_id.to_string()));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.docs.insert(
            conversation_id.to_string(),
            Entry {
                seq,
                conversation: conversation.clone(),
            },
        );
        Ok(conversation)
    }

    async fn delete(&self, conversation_id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner
            .docs
            .remove(conversation_id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn list_conversations(&self, owner: Option<&str>) -> Result<Vec<String>, StoreError> {
        Ok(self.sorted_ids(owner))
    }

    fn iter_owner<'a>(&'a self, owner: &'a str) -> ConversationStream<'a> {
        let conversations: Vec<_> = {
            let ids = self.sorted_ids(Some(owner));
            let inner = self.inner.lock().expect("store mutex poisoned");
            ids.iter()
                .filter_map(|id| inner.docs.get(id).map(|e| e.conversation.clone()))
                .collect()
        };
        Box::pin(stream::iter(conversations.into_iter().map(Ok)))
    }
}
