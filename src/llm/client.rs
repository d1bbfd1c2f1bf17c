//! HTTP client for OpenAI-compatible chat completion APIs

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info};

use crate::config::LlmConfig;
use crate::errors::{RagError, Result};
use crate::llm::types::{ChatMessage, ChatRequest, ChatResponse, Completion};
use crate::llm::CompletionProvider;

/// Completion provider backed by a hosted chat API
#[derive(Debug)]
pub struct LlmApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl LlmApiClient {
    /// Build a client from configuration. The API key must be present.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .resolved_api_key()
            .ok_or_else(|| RagError::ConfigError("LLM API key not configured".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionProvider for LlmApiClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<Completion> {
        info!(model = %self.model, "calling completion API");

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(user_prompt),
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, "completion API error");
            return Err(RagError::CompletionError(format!(
                "completion API returned {status}: {body}"
            )));
        }

        let payload: ChatResponse = response.json().await?;

        let text = payload
            .choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .map(|message| message.content.clone())
            .unwrap_or_default();
        let total_tokens = payload.usage.map(|usage| usage.total_tokens).unwrap_or(0);

        info!(total_tokens, "completion API call successful");
        Ok(Completion { text, total_tokens })
    }
}
