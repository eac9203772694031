//! OpenAI-compatible LLM provider.
//!
//! Works with OpenAI, DeepSeek, OpenRouter, Ollama, and any endpoint that
//! implements `POST {base_url}/chat/completions`.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::error::LLMError;
use super::provider::LLMProvider;
use super::types::{ChatRequest, ChatResponse};
use crate::provider::ProviderRecord;

/// OpenAI-compatible provider bound to one endpoint and key.
pub struct OpenAICompatibleProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAICompatibleProvider {
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Build a provider from a loaded provider record.
    #[must_use]
    pub fn from_record(client: Client, record: &ProviderRecord) -> Self {
        Self::new(client, &record.base_url, &record.api_key)
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LLMError> {
        let url = self.completions_url();
        debug!(url = %url, model = %request.model, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(LLMError::Api { status, message });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::{CapturedRequest, closed_port_url, spawn_mock};
    use crate::llm::types::Message;
    use axum::http::StatusCode;

    fn request() -> ChatRequest {
        ChatRequest {
            model: "test-model".to_string(),
            messages: vec![Message::system("Be brief."), Message::user("Hi")],
            top_p: Some(0.7),
            temperature: Some(0.9),
        }
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let provider = OpenAICompatibleProvider::new(Client::new(), "http://host/v1/", "k");
        assert_eq!(provider.completions_url(), "http://host/v1/chat/completions");
    }

    #[tokio::test]
    async fn chat_sends_bearer_and_body() {
        let captured = CapturedRequest::default();
        let base_url = spawn_mock(captured.clone(), StatusCode::OK, "Hello").await;

        let provider = OpenAICompatibleProvider::new(Client::new(), base_url, "sk-secret");
        let response = provider.chat(request()).await.unwrap();
        assert_eq!(response.first_content(), Some("Hello"));

        let (auth, body) = captured.take().expect("request should reach the mock");
        assert_eq!(auth.as_deref(), Some("Bearer sk-secret"));
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Hi");
    }

    #[tokio::test]
    async fn chat_maps_error_status() {
        let base_url = spawn_mock(
            CapturedRequest::default(),
            StatusCode::UNAUTHORIZED,
            "invalid api key",
        )
        .await;

        let provider = OpenAICompatibleProvider::new(Client::new(), base_url, "bad");
        let err = provider.chat(request()).await.unwrap_err();
        match err {
            LLMError::Api { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("invalid api key"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn chat_connection_failure_is_request_error() {
        let base_url = closed_port_url().await;
        let provider = OpenAICompatibleProvider::new(Client::new(), base_url, "k");
        let err = provider.chat(request()).await.unwrap_err();
        assert!(matches!(err, LLMError::Request(_)));
    }
}
