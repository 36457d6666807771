//! One chat turn: load session, prompt the model, extract lead data, record
//! side effects, persist.

use super::email::Notifier;
use super::leads;
use super::metrics;
use super::prompt::PromptBuilder;
use super::providers::{ChatProvider, GenerationParams};
use super::sessions::SessionManager;
use super::store::ChatStore;
use crate::models::MeetingRequest;
use service_core::error::AppError;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub session_id: String,
    pub message: String,
    pub lead_captured: bool,
}

#[derive(Clone)]
pub struct ChatService {
    sessions: SessionManager,
    prompts: PromptBuilder,
    provider: Arc<dyn ChatProvider>,
    notifier: Arc<dyn Notifier>,
    chat_store: Arc<dyn ChatStore>,
    params: GenerationParams,
}

impl ChatService {
    pub fn new(
        sessions: SessionManager,
        prompts: PromptBuilder,
        provider: Arc<dyn ChatProvider>,
        notifier: Arc<dyn Notifier>,
        chat_store: Arc<dyn ChatStore>,
        params: GenerationParams,
    ) -> Self {
        Self {
            sessions,
            prompts,
            provider,
            notifier,
            chat_store,
            params,
        }
    }

    /// Every failure surfaces as the generic "Chat service error"; the cause
    /// is only logged.
    pub async fn submit_message(
        &self,
        session_id: Option<&str>,
        message: &str,
    ) -> Result<ChatReply, AppError> {
        self.run_turn(session_id, message).await.map_err(|e| {
            tracing::error!(
                requested_session_id = ?session_id,
                error = ?e,
                "Chat turn failed"
            );
            AppError::service("Chat", e)
        })
    }

    async fn run_turn(&self, session_id: Option<&str>, message: &str) -> Result<ChatReply, anyhow::Error> {
        let mut session = self.sessions.get_or_create(session_id).await?.into_session();
        let system_prompt = self.prompts.build().await?;

        let response = self
            .provider
            .generate(
                &session.id,
                &system_prompt,
                &session.messages,
                message,
                &self.params,
            )
            .await?;

        tracing::debug!(
            session_id = %session.id,
            provider = self.provider.name(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            finish_reason = ?response.finish_reason,
            "Model reply received"
        );

        let was_captured = session.lead.captured;
        let extraction = leads::extract(message, &response.text, &session.lead);

        if let Some(draft) = extraction.meeting.clone() {
            let request = draft.into_request(&session.id);
            self.chat_store.insert_meeting_request(&request).await?;
            metrics::record_meeting_request();
            tracing::info!(
                session_id = %session.id,
                meeting_request_id = %request.id,
                "Meeting request captured"
            );
            self.notify_meeting(&request).await;
        }

        self.sessions
            .append_turn(
                &mut session,
                message,
                &extraction.cleaned_text,
                &extraction.signals,
            )
            .await?;

        let lead_captured = session.lead.captured;
        metrics::record_chat_turn(lead_captured && !was_captured);

        tracing::info!(
            session_id = %session.id,
            lead_captured = lead_captured,
            message_count = session.messages.len(),
            "Chat message processed"
        );

        Ok(ChatReply {
            session_id: session.id,
            message: extraction.cleaned_text,
            lead_captured,
        })
    }

    async fn notify_meeting(&self, request: &MeetingRequest) {
        if let Err(e) = self.notifier.send_meeting_request(request).await {
            metrics::record_notification_failure("meeting_request");
            tracing::error!(
                meeting_request_id = %request.id,
                error = %e,
                "Failed to send meeting request email"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompanyConfig;
    use crate::services::email::MockNotifier;
    use crate::services::memory::MemoryStore;
    use crate::services::providers::MockChatProvider;

    fn company() -> CompanyConfig {
        CompanyConfig {
            name: "MITA ICT".to_string(),
            contact_email: "info@mitaict.com".to_string(),
            website: "www.mitaict.com".to_string(),
        }
    }

    fn service(
        store: Arc<MemoryStore>,
        provider: Arc<MockChatProvider>,
        notifier: Arc<MockNotifier>,
    ) -> ChatService {
        ChatService::new(
            SessionManager::new(store.clone()),
            PromptBuilder::new(store.clone(), company()),
            provider,
            notifier,
            store,
            GenerationParams::default(),
        )
    }

    #[tokio::test]
    async fn failed_notification_keeps_meeting_and_turn() {
        let store = Arc::new(MemoryStore::new());
        let provider = Arc::new(MockChatProvider::with_replies([
            "MEETING_REQUEST: Jane Doe | jane@example.com | Monday 10am | CRM demo\nBooked!",
        ]));
        let notifier = Arc::new(MockNotifier::new(false, "owner@mitaict.com", company()));
        let chat = service(store.clone(), provider, notifier);

        let reply = chat.submit_message(None, "Monday 10am please").await.unwrap();
        assert_eq!(reply.message, "Booked!");
        assert!(reply.lead_captured);

        let meetings = store.list_meeting_requests().await.unwrap();
        assert_eq!(meetings.len(), 1);
        assert_eq!(meetings[0].session_id, reply.session_id);

        let stored = store.get_session(&reply.session_id).await.unwrap().unwrap();
        assert_eq!(stored.messages[1].content, "Booked!");
    }

    #[tokio::test]
    async fn provider_failure_is_a_generic_service_error() {
        let store = Arc::new(MemoryStore::new());
        let provider = Arc::new(MockChatProvider::new(false));
        let notifier = Arc::new(MockNotifier::new(true, "owner@mitaict.com", company()));
        let chat = service(store.clone(), provider, notifier);

        let err = chat.submit_message(None, "hello").await.unwrap_err();
        assert!(matches!(err, AppError::ServiceError { context: "Chat", .. }));
        assert!(store.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn follow_up_turn_sends_history_and_reuses_session() {
        let store = Arc::new(MemoryStore::new());
        let provider = Arc::new(MockChatProvider::with_replies(["Hi!", "Sure."]));
        let notifier = Arc::new(MockNotifier::new(true, "owner@mitaict.com", company()));
        let chat = service(store.clone(), provider.clone(), notifier.clone());

        let first = chat.submit_message(None, "hello").await.unwrap();
        let second = chat
            .submit_message(Some(&first.session_id), "my email is a@b.co")
            .await
            .unwrap();

        assert_eq!(first.session_id, second.session_id);
        assert!(!first.lead_captured);
        assert!(second.lead_captured);
        assert_eq!(notifier.send_count(), 0);
        assert_eq!(provider.call_count(), 2);

        let stored = store.get_session(&first.session_id).await.unwrap().unwrap();
        assert_eq!(stored.messages.len(), 4);
        assert_eq!(stored.lead.email.as_deref(), Some("a@b.co"));
    }
}
