//! Chat sessions: provider/model/prompt selection and the exchange loop.
//!
//! A session moves `Unselected -> Selected -> Exchanging`. The unselected
//! state is a [`Selection`]; [`Selection::start`] validates it against the
//! registry and yields a [`ChatSession`] whose provider, model and prompt are
//! fixed for its lifetime.

mod transcript;

use std::fmt;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::llm::{CompletionClient, LLMProvider, complete};
use crate::provider::{ProviderRecord, ProviderRegistry};

pub use transcript::{Speaker, Transcript, TranscriptEntry, TranscriptError};

/// Reasons a selection cannot start a session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("please select an API provider")]
    MissingProvider,

    #[error("please select a model")]
    MissingModel,

    #[error("the system prompt must not be empty")]
    EmptyPrompt,

    #[error("unknown API provider '{0}'")]
    UnknownProvider(String),

    #[error("model '{model}' does not belong to provider '{provider}'")]
    ModelNotOffered { provider: String, model: String },
}

/// User choices before a session starts.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub prompt: Option<String>,
}

impl Selection {
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider: Some(provider.into()),
            model: Some(model.into()),
            prompt: Some(prompt.into()),
        }
    }

    /// Validate against `registry` and start a session.
    ///
    /// The prompt is trimmed. The model must be one of the chosen provider's
    /// models; this is the only place that membership is checked.
    pub fn start(self, registry: &ProviderRegistry) -> Result<ChatSession, SelectionError> {
        let provider_name = non_blank(self.provider).ok_or(SelectionError::MissingProvider)?;
        let model = non_blank(self.model).ok_or(SelectionError::MissingModel)?;
        let prompt = non_blank(self.prompt).ok_or(SelectionError::EmptyPrompt)?;

        let provider = registry
            .get(&provider_name)
            .ok_or_else(|| SelectionError::UnknownProvider(provider_name.clone()))?;

        if !provider.supports(&model) {
            return Err(SelectionError::ModelNotOffered {
                provider: provider_name,
                model,
            });
        }

        info!(provider = %provider.name, model = %model, "Chat session started");
        Ok(ChatSession {
            provider: provider.clone(),
            model,
            prompt,
            status: SessionStatus::Selected,
            transcript: Transcript::new(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Where a started session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Provider, model and prompt chosen; nothing sent yet.
    Selected,
    /// At least one message has been exchanged.
    Exchanging,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Selected => write!(f, "selected"),
            SessionStatus::Exchanging => write!(f, "exchanging"),
        }
    }
}

/// A started session with its fixed context and transcript.
#[derive(Debug)]
pub struct ChatSession {
    provider: ProviderRecord,
    model: String,
    prompt: String,
    status: SessionStatus,
    transcript: Transcript,
}

impl ChatSession {
    pub fn provider(&self) -> &ProviderRecord {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Send one message to the session's provider and record both sides in
    /// the transcript.
    ///
    /// Blank messages are ignored and return `None`. Otherwise the reply, or a
    /// failure string from [`complete`], is returned.
    pub async fn send(&mut self, client: &CompletionClient, message: &str) -> Option<String> {
        let backend = client.backend(&self.provider);
        self.send_via(&backend, message).await
    }

    /// Exchange through `backend`, which must stand for this session's provider.
    pub(crate) async fn send_via(
        &mut self,
        backend: &dyn LLMProvider,
        message: &str,
    ) -> Option<String> {
        let message = message.trim();
        if message.is_empty() {
            return None;
        }

        self.transcript.push(Speaker::User, message);
        let reply = complete(backend, &self.model, &self.prompt, message).await;
        self.transcript.push(Speaker::Assistant, reply.clone());
        self.status = SessionStatus::Exchanging;

        debug!(entries = self.transcript.entries().len(), "Exchange recorded");
        Some(reply)
    }

    /// Write the transcript to `path`.
    pub async fn export(&self, path: &Path) -> Result<(), TranscriptError> {
        self.transcript.export(path).await?;
        info!(path = %path.display(), "Transcript saved");
        Ok(())
    }
}
