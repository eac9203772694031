//! LLM provider client for chat completions.

mod completion;
mod error;
mod openai;
mod provider;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use completion::{
    CompletionClient, FAILURE_PREFIX, TEMPERATURE, TOP_P, build_request, complete,
    failure_message, try_complete,
};
pub use error::LLMError;
pub use openai::OpenAICompatibleProvider;
pub use provider::LLMProvider;
pub use types::{ChatRequest, ChatResponse, Choice, Message, Role};
