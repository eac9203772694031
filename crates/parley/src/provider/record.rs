use std::fmt;

use serde::Deserialize;

/// One configured chat-completion endpoint, loaded from a single JSON file.
///
/// All four keys are required; unknown keys are ignored.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderRecord {
    /// Display identifier used for selection.
    pub name: String,
    /// Bearer key sent with every request.
    pub api_key: String,
    /// Endpoint root; `/chat/completions` is appended.
    pub base_url: String,
    /// Model identifiers this provider accepts, in file order.
    pub models: Vec<String>,
}

impl ProviderRecord {
    /// Whether `model` is one of this provider's models.
    pub fn supports(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }
}

impl fmt::Debug for ProviderRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRecord")
            .field("name", &self.name)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .finish()
    }
}
