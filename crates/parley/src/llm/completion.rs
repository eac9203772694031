//! Single-shot chat completion with fixed sampling.
//!
//! Every request carries exactly two messages: the session's system prompt and
//! the latest user message. No prior turns are sent.

use reqwest::Client;
use tracing::warn;

use super::error::LLMError;
use super::openai::OpenAICompatibleProvider;
use super::provider::LLMProvider;
use super::types::{ChatRequest, Message};
use crate::provider::ProviderRecord;

/// Nucleus sampling probability sent with every request.
pub const TOP_P: f32 = 0.7;

/// Sampling temperature sent with every request.
pub const TEMPERATURE: f32 = 0.9;

/// Prefix of the reply returned in place of an answer when a request fails.
pub const FAILURE_PREFIX: &str = "Network error, please check your API address and key.";

/// Build the request for one exchange.
pub fn build_request(model: &str, system_prompt: &str, user_message: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![Message::system(system_prompt), Message::user(user_message)],
        top_p: Some(TOP_P),
        temperature: Some(TEMPERATURE),
    }
}

/// Run one exchange and return the first choice's text.
pub async fn try_complete(
    provider: &dyn LLMProvider,
    model: &str,
    system_prompt: &str,
    user_message: &str,
) -> Result<String, LLMError> {
    let response = provider
        .chat(build_request(model, system_prompt, user_message))
        .await?;
    response
        .first_content()
        .map(String::from)
        .ok_or(LLMError::EmptyResponse)
}

/// Run one exchange; failures come back as a displayable reply string.
///
/// Success and failure share the return type, so callers can only tell them
/// apart by content (a failure starts with [`FAILURE_PREFIX`]).
pub async fn complete(
    provider: &dyn LLMProvider,
    model: &str,
    system_prompt: &str,
    user_message: &str,
) -> String {
    match try_complete(provider, model, system_prompt, user_message).await {
        Ok(content) => content,
        Err(e) => {
            warn!(model, error = %e, "Chat completion failed");
            failure_message(&e)
        }
    }
}

/// Format a request failure as a reply.
pub fn failure_message(error: &LLMError) -> String {
    format!("{FAILURE_PREFIX} Error: {error}")
}

/// Completion client that talks to the endpoint named by a provider record.
#[derive(Clone, Default)]
pub struct CompletionClient {
    http: Client,
}

impl CompletionClient {
    #[must_use]
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Endpoint binding for `provider`.
    pub fn backend(&self, provider: &ProviderRecord) -> OpenAICompatibleProvider {
        OpenAICompatibleProvider::from_record(self.http.clone(), provider)
    }

    /// Send `user_message` under `system_prompt` to `model` at `provider`.
    pub async fn complete(
        &self,
        provider: &ProviderRecord,
        model: &str,
        system_prompt: &str,
        user_message: &str,
    ) -> String {
        complete(&self.backend(provider), model, system_prompt, user_message).await
    }
}
