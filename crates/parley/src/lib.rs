//! Parley - a minimal chat client for OpenAI-compatible providers.
//!
//! Providers are described by JSON files in a directory and loaded into a
//! [`provider::ProviderRegistry`]. A [`session::Selection`] picks a provider,
//! model and system prompt and starts a [`session::ChatSession`], which sends
//! each message through [`llm::complete`] and keeps a plain-text transcript.

pub mod config;
pub mod llm;
pub mod provider;
pub mod session;
