//! ConversationStore trait definition.
//!
//! CRUD plus owner-scoped listing over conversations. Implementations live
//! in parley-infra (`SqliteConversationStore`, `FsConversationStore`) and
//! must behave identically; the shared contract suite in parley-infra's
//! integration tests runs against every backend.
//!
//! Uses native async fn in traits (RPITIT, Rust 2024 edition). `iter_owner`
//! returns a boxed stream because lazy iteration needs a nameable type.

use std::pin::Pin;

use futures_util::Stream;

use parley_types::chat::Conversation;
use parley_types::error::StoreError;

/// Lazy sequence of conversations, most-recently-updated first.
pub type ConversationStream<'a> =
    Pin<Box<dyn Stream<Item = Result<Conversation, StoreError>> + Send + 'a>>;

/// Storage contract for conversation persistence.
///
/// Semantics every implementation must uphold:
/// - `conversation_id` uniqueness is enforced by the backend itself, so
///   concurrent creators racing on one id resolve to exactly one winner.
/// - `save` is a full-document upsert (never a partial patch) and refreshes
///   `updated_at` as part of the write.
/// - Listing orders by `updated_at` descending with a tiebreak that is
///   stable within the backend (insertion order where the backend has one).
pub trait ConversationStore: Send + Sync {
    /// Whether a conversation with this id exists.
    fn exists(
        &self,
        conversation_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;

    /// Load a conversation. Fails with [`StoreError::NotFound`] if absent.
    fn load(
        &self,
        conversation_id: &str,
    ) -> impl std::future::Future<Output = Result<Conversation, StoreError>> + Send;

    /// Upsert the full conversation document by `conversation_id`,
    /// refreshing `updated_at`.
    fn save(
        &self,
        conversation: &Conversation,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Create a new empty conversation.
    ///
    /// Fails with [`StoreError::InvalidId`] when the id is empty or carries
    /// characters outside alphanumerics/`-_.`, and with
    /// [`StoreError::AlreadyExists`] when the id is in use -- regardless of
    /// who owns the existing conversation. Never silently merges.
    fn create(
        &self,
        conversation_id: &str,
        title: Option<&str>,
        model: &str,
        system_prompt: &str,
        owner: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Conversation, StoreError>> + Send;

    /// Delete a conversation. Fails with [`StoreError::NotFound`] if absent.
    fn delete(
        &self,
        conversation_id: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// List conversation ids, optionally scoped to one owner, ordered by
    /// `updated_at` descending.
    fn list_conversations(
        &self,
        owner: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Lazily yield an owner's conversations, ordered by `updated_at`
    /// descending. Each document is loaded only when the stream is polled.
    fn iter_owner<'a>(&'a self, owner: &'a str) -> ConversationStream<'a>;
}
