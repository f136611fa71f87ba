//! OpenAiClient -- concrete [`CompletionClient`] implementation.
//!
//! Sends requests to the Chat Completions endpoint with bearer
//! authentication. The API key is wrapped in [`secrecy::SecretString`] and
//! is never logged or included in `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use parley_core::llm::client::CompletionClient;
use parley_types::error::ProviderError;
use parley_types::llm::{CompletionRequest, CompletionResponse, TokenUsage};

use super::types::{ChatCompletionsRequest, ChatCompletionsResponse, WireMessage};

/// OpenAI-compatible completion client.
///
/// # API Key Security
///
/// The API key is stored as a [`SecretString`] and only exposed when
/// constructing the Authorization header. It never appears in Debug output,
/// Display output, or tracing logs.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiClient {
    const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    /// Create a new client against the official OpenAI endpoint.
    pub fn new(api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the base URL (compatible servers, proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn to_wire_request(request: &CompletionRequest) -> ChatCompletionsRequest {
        ChatCompletionsRequest {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|turn| WireMessage {
                    role: turn.role.to_string(),
                    content: turn.content.clone(),
                })
                .collect(),
            temperature: request.temperature,
            top_p: request.top_p,
        }
    }
}

// OpenAiClient intentionally does NOT derive Debug to prevent accidental
// exposure of internal state including the API key.

impl CompletionClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let body = Self::to_wire_request(request);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => ProviderError::AuthenticationFailed,
                code => ProviderError::Api {
                    status: code,
                    message: error_body,
                },
            });
        }

        let parsed: ChatCompletionsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Deserialization(format!("failed to parse response: {e}")))?;

        let content = parsed
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();
        let usage = parsed.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(CompletionResponse { content, usage })
    }
}
