//! Completion provider: the external chat-style text-generation service
//!
//! The pipeline consumes it through the `CompletionProvider` trait so
//! tests can substitute deterministic stand-ins; `LlmApiClient` is the
//! production implementation for OpenAI-compatible endpoints.

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::errors::Result;
pub use client::LlmApiClient;
pub use types::Completion;

/// Chat-completion collaborator contract.
///
/// Accepts a two-message (system/user) request and returns one text
/// completion plus usage accounting. Errors surface as `RagError` and
/// are caught at the orchestrator boundary.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<Completion>;
}
