//! Scripted provider for tests and `LLM_PROVIDER=mock` local runs.

use super::{ChatProvider, FinishReason, GenerationParams, ProviderError, ProviderResponse};
use crate::models::ChatMessage;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Replies with queued scripts first, then echoes the user message.
pub struct MockChatProvider {
    enabled: bool,
    replies: Mutex<VecDeque<String>>,
    last_system_prompt: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl MockChatProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            replies: Mutex::new(VecDeque::new()),
            last_system_prompt: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            ..Self::new(true)
        }
    }

    pub async fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().await.push_back(reply.into());
    }

    pub async fn last_system_prompt(&self) -> Option<String> {
        self.last_system_prompt.lock().await.clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn generate(
        &self,
        _session_id: &str,
        system_prompt: &str,
        history: &[ChatMessage],
        user_message: &str,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock chat provider not enabled".to_string(),
            ));
        }

        *self.last_system_prompt.lock().await = Some(system_prompt.to_string());

        let text = self
            .replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| format!("Mock response for: {}", user_message));

        let input_chars: usize = history.iter().map(|m| m.content.len()).sum::<usize>()
            + system_prompt.len()
            + user_message.len();

        Ok(ProviderResponse {
            input_tokens: (input_chars / 4) as i32,
            output_tokens: (text.len() / 4) as i32,
            text,
            finish_reason: FinishReason::Complete,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_replies_then_echo() {
        let provider = MockChatProvider::with_replies(["first"]);
        let params = GenerationParams::default();

        let a = provider.generate("s", "sys", &[], "hello", &params).await.unwrap();
        assert_eq!(a.text, "first");

        let b = provider.generate("s", "sys", &[], "again", &params).await.unwrap();
        assert_eq!(b.text, "Mock response for: again");
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.last_system_prompt().await.as_deref(), Some("sys"));
    }

    #[tokio::test]
    async fn disabled_mock_fails() {
        let provider = MockChatProvider::new(false);
        let err = provider
            .generate("s", "sys", &[], "hello", &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }
}
