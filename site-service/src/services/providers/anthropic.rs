//! Anthropic Messages API provider.

use super::{
    error_from_response, http_client, ChatProvider, FinishReason, GenerationParams,
    ProviderError, ProviderResponse,
};
use crate::models::ChatMessage;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: i32 = 1024;

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub timeout: Duration,
}

pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicConfig) -> Result<Self, ProviderError> {
        let client = http_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

fn build_request<'a>(
    model: &'a str,
    system_prompt: &'a str,
    history: &'a [ChatMessage],
    user_message: &'a str,
    params: &GenerationParams,
) -> MessagesRequest<'a> {
    let mut messages: Vec<Message<'a>> = history
        .iter()
        .map(|msg| Message {
            role: msg.role.as_str(),
            content: &msg.content,
        })
        .collect();
    messages.push(Message {
        role: "user",
        content: user_message,
    });

    MessagesRequest {
        model,
        max_tokens: params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        system: system_prompt,
        messages,
        temperature: params.temperature,
        top_p: params.top_p,
        stop_sequences: if params.stop_sequences.is_empty() {
            None
        } else {
            Some(params.stop_sequences.clone())
        },
    }
}

#[async_trait]
impl ChatProvider for AnthropicProvider {
    async fn generate(
        &self,
        session_id: &str,
        system_prompt: &str,
        history: &[ChatMessage],
        user_message: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        let api_key = self.config.api_key.expose_secret();
        if api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Anthropic API key not configured".to_string(),
            ));
        }

        let request = build_request(&self.config.model, system_prompt, history, user_message, params);

        tracing::debug!(
            session_id = %session_id,
            model = %self.config.model,
            history_len = history.len(),
            "Sending request to Anthropic API"
        );

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response("Anthropic", response).await);
        }

        let api_response: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let finish_reason = match api_response.stop_reason.as_deref() {
            Some("max_tokens") => FinishReason::Length,
            Some("refusal") => FinishReason::ContentFilter,
            _ => FinishReason::Complete,
        };
        if finish_reason == FinishReason::ContentFilter {
            return Err(ProviderError::ContentFiltered);
        }

        let text = api_response
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<String>();

        Ok(ProviderResponse {
            text,
            input_tokens: api_response.usage.input_tokens,
            output_tokens: api_response.usage.output_tokens,
            finish_reason,
        })
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: i32,
    system: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: i32,
    #[serde(default)]
    output_tokens: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatRole;

    #[test]
    fn request_carries_system_prompt_and_alternating_roles() {
        let history = vec![
            ChatMessage::new(ChatRole::User, "hi"),
            ChatMessage::new(ChatRole::Assistant, "hello"),
        ];
        let params = GenerationParams {
            max_tokens: Some(256),
            ..Default::default()
        };
        let request = build_request("claude-test", "sell politely", &history, "price?", &params);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["system"], "sell politely");
        assert_eq!(json["max_tokens"], 256);
        let roles: Vec<&str> = json["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["user", "assistant", "user"]);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn response_keeps_only_text_blocks() {
        let raw = r#"{
            "content": [{"type": "text", "text": "Hi!"}, {"type": "tool_use", "id": "x"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 20, "output_tokens": 2}
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed
            .content
            .iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text.as_deref())
            .collect();
        assert_eq!(text, "Hi!");
        assert_eq!(parsed.usage.output_tokens, 2);
    }
}
