//! CompletionClient trait definition.
//!
//! The single seam between the chat orchestrator and the external
//! text-completion service. Implementations live in parley-infra
//! (e.g., `OpenAiClient`).

use parley_types::error::ProviderError;
use parley_types::llm::{CompletionRequest, CompletionResponse};

/// Trait for text-completion provider backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait CompletionClient: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    ///
    /// Any transport or provider-side failure surfaces as
    /// [`ProviderError`]; the client never retries on its own.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, ProviderError>> + Send;
}
