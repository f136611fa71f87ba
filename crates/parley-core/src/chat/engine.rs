//! The per-turn chat orchestrator.
//!
//! `Chatbot::send` executes one full turn: append the user message, persist,
//! call the completion provider, append the assistant reply with usage,
//! persist again. The user's turn is written before the provider call, so a
//! provider failure never loses it.

use tracing::debug;

use parley_types::chat::MessageRole;
use parley_types::error::ChatError;
use parley_types::llm::CompletionRequest;

use crate::chat::title;
use crate::llm::client::CompletionClient;
use crate::store::conversation::ConversationStore;

/// Orchestrates chat turns over a [`ConversationStore`] and a
/// [`CompletionClient`].
///
/// Generic over both traits so core never depends on a concrete backend.
pub struct Chatbot<S: ConversationStore, P: CompletionClient> {
    store: S,
    client: P,
    temperature: f64,
    top_p: f64,
}

impl<S: ConversationStore, P: CompletionClient> Chatbot<S, P> {
    /// Create a chatbot with default sampling (temperature 0.7, top_p 1.0).
    pub fn new(store: S, client: P) -> Self {
        Self {
            store,
            client,
            temperature: 0.7,
            top_p: 1.0,
        }
    }

    /// Override the sampling parameters sent with every completion call.
    pub fn with_sampling(mut self, temperature: f64, top_p: f64) -> Self {
        self.temperature = temperature;
        self.top_p = top_p;
        self
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Execute one chat turn and return the assistant's reply text.
    ///
    /// Fails with `NotFound` (no storage write) when the conversation does
    /// not exist -- callers create conversations explicitly. A provider
    /// failure propagates after the user message is persisted; retrying the
    /// same `send` appends a second user message, which is documented
    /// behavior, not deduplicated.
    #[tracing::instrument(
        name = "chat_send",
        skip(self, user_text),
        fields(conversation_id = %conversation_id)
    )]
    pub async fn send(&self, conversation_id: &str, user_text: &str) -> Result<String, ChatError> {
        if user_text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let mut conversation = self.store.load(conversation_id).await?;

        conversation.append(MessageRole::User, user_text, None, None);
        if conversation.messages.len() == 1 && title::looks_unnamed(&conversation) {
            conversation.title = title::title_from_text(user_text);
            debug!(title = %conversation.title, "auto-named conversation");
        }
        // The user's turn must be durable before the provider is called.
        self.store.save(&conversation).await?;

        let request = CompletionRequest {
            model: conversation.model.clone(),
            messages: conversation.prompt_messages(),
            temperature: self.temperature,
            top_p: self.top_p,
        };
        let response = self.client.complete(&request).await?;

        conversation.append(
            MessageRole::Assistant,
            response.content.clone(),
            response.usage,
            None,
        );
        self.store.save(&conversation).await?;

        Ok(response.content)
    }
}
