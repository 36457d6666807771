//! Language-model provider abstraction for the sales assistant.
//!
//! The chat pipeline talks to `dyn ChatProvider`; Gemini, Anthropic and a
//! scripted mock sit behind it and are picked from configuration at startup.

pub mod anthropic;
pub mod gemini;
pub mod mock;

use crate::config::{LlmConfig, LlmProviderKind};
use crate::models::ChatMessage;
use async_trait::async_trait;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use anthropic::{AnthropicConfig, AnthropicProvider};
pub use gemini::{GeminiConfig, GeminiProvider};
pub use mock::MockChatProvider;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Result of a provider call.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,
    pub input_tokens: i32,
    pub output_tokens: i32,
    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
    Error,
}

/// Generation parameters for a single request.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    /// Temperature (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Top-p sampling.
    pub top_p: Option<f32>,

    /// Maximum output tokens.
    pub max_tokens: Option<i32>,

    /// Stop sequences.
    pub stop_sequences: Vec<String>,
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Generate the assistant reply to `user_message`, given the system
    /// prompt and the prior turns of the conversation (oldest first).
    async fn generate(
        &self,
        session_id: &str,
        system_prompt: &str,
        history: &[ChatMessage],
        user_message: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;

    fn name(&self) -> &'static str;
}

/// Construct the provider selected by `LLM_PROVIDER`.
pub fn build_provider(config: &LlmConfig) -> Result<Arc<dyn ChatProvider>, AppError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let provider: Arc<dyn ChatProvider> = match config.provider {
        LlmProviderKind::Gemini => Arc::new(
            GeminiProvider::new(GeminiConfig {
                api_key: config.api_key.clone(),
                model: config.model.clone(),
                timeout,
            })
            .map_err(|e| AppError::ConfigError(e.into()))?,
        ),
        LlmProviderKind::Anthropic => Arc::new(
            AnthropicProvider::new(AnthropicConfig {
                api_key: config.api_key.clone(),
                model: config.model.clone(),
                timeout,
            })
            .map_err(|e| AppError::ConfigError(e.into()))?,
        ),
        LlmProviderKind::Mock => Arc::new(MockChatProvider::new(true)),
    };

    tracing::info!(provider = provider.name(), model = %config.model, "Chat provider ready");
    Ok(provider)
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e)))
}

/// Map a non-success HTTP status to a provider error.
async fn error_from_response(provider: &str, response: reqwest::Response) -> ProviderError {
    let status = response.status();
    if status.as_u16() == 429 {
        return ProviderError::RateLimited;
    }
    let error_text = response.text().await.unwrap_or_default();
    if status.as_u16() == 400 {
        return ProviderError::InvalidRequest(format!("{} API error {}: {}", provider, status, error_text));
    }
    ProviderError::ApiError(format!("{} API error {}: {}", provider, status, error_text))
}
