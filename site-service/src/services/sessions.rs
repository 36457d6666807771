//! Chat session lifecycle with optimistic, version-checked persistence.

use super::leads::LeadSignals;
use super::store::ChatStore;
use crate::models::{ChatMessage, ChatSession};
use service_core::error::AppError;
use std::sync::Arc;

const MAX_SAVE_ATTEMPTS: usize = 3;

/// Outcome of resolving an inbound session id.
#[derive(Debug)]
pub enum SessionLookup {
    Existing(ChatSession),
    Created(ChatSession),
}

impl SessionLookup {
    pub fn into_session(self) -> ChatSession {
        match self {
            SessionLookup::Existing(session) | SessionLookup::Created(session) => session,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, SessionLookup::Created(_))
    }
}

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn ChatStore>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }

    /// Load the session for `session_id`, or start a new one. An id that
    /// matches nothing yields a fresh session with a new id.
    pub async fn get_or_create(&self, session_id: Option<&str>) -> Result<SessionLookup, AppError> {
        let Some(id) = session_id.filter(|id| !id.trim().is_empty()) else {
            return Ok(SessionLookup::Created(ChatSession::new()));
        };

        match self.store.get_session(id).await? {
            Some(mut session) => {
                session.mark_persisted();
                Ok(SessionLookup::Existing(session))
            }
            None => {
                let session = ChatSession::new();
                tracing::warn!(
                    requested_session_id = %id,
                    session_id = %session.id,
                    "Unknown chat session id, starting a new session"
                );
                Ok(SessionLookup::Created(session))
            }
        }
    }

    /// Append one exchange, fold in this turn's lead signals and persist.
    pub async fn append_turn(
        &self,
        session: &mut ChatSession,
        user_text: &str,
        assistant_text: &str,
        signals: &LeadSignals,
    ) -> Result<(), AppError> {
        session.append_turn(user_text, assistant_text);
        signals.apply_to(&mut session.lead);
        self.persist(session, signals).await
    }

    /// Rewrite the current turn's assistant reply and persist. Has no effect
    /// on messages that are already stored.
    pub async fn replace_last_assistant_message(
        &self,
        session: &mut ChatSession,
        text: &str,
    ) -> Result<bool, AppError> {
        if !session.replace_last_assistant_message(text) {
            return Ok(false);
        }
        self.persist(session, &LeadSignals::default()).await?;
        Ok(true)
    }

    async fn persist(&self, session: &mut ChatSession, signals: &LeadSignals) -> Result<(), AppError> {
        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            match self.store.save_session(session).await {
                Ok(version) => {
                    session.version = version;
                    session.mark_persisted();
                    return Ok(());
                }
                Err(e) if e.is_conflict() && attempt < MAX_SAVE_ATTEMPTS => {
                    tracing::warn!(
                        session_id = %session.id,
                        attempt = attempt,
                        "Chat session version conflict, rebasing"
                    );
                    self.rebase(session, signals).await?;
                }
                Err(e) => return Err(e),
            }
        }
        Err(AppError::Conflict(anyhow::anyhow!(
            "Chat session {} could not be saved after {} attempts",
            session.id,
            MAX_SAVE_ATTEMPTS
        )))
    }

    /// Replay unsaved messages and this turn's lead signals on top of the
    /// stored copy.
    async fn rebase(&self, session: &mut ChatSession, signals: &LeadSignals) -> Result<(), AppError> {
        let unsaved: Vec<ChatMessage> = session.unsaved_messages().to_vec();

        match self.store.get_session(&session.id).await? {
            Some(mut stored) => {
                stored.mark_persisted();
                stored.messages.extend(unsaved);
                stored.updated_at = session.updated_at;
                signals.apply_to(&mut stored.lead);
                *session = stored;
            }
            None => {
                // Deleted underneath us: the next save inserts what we hold.
                session.version = 0;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::MemoryStore;

    fn manager() -> (SessionManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (SessionManager::new(store.clone()), store)
    }

    #[tokio::test]
    async fn get_or_create_without_id_creates_unsaved_session() {
        let (manager, store) = manager();
        let lookup = manager.get_or_create(None).await.unwrap();
        assert!(lookup.is_created());
        let session = lookup.into_session();
        assert!(store.get_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_id_creates_session_with_fresh_id() {
        let (manager, _) = manager();
        let session = manager
            .get_or_create(Some("does-not-exist"))
            .await
            .unwrap();
        assert!(session.is_created());
        assert_ne!(session.into_session().id, "does-not-exist");
    }

    #[tokio::test]
    async fn existing_session_is_returned_unchanged() {
        let (manager, _) = manager();
        let mut session = ChatSession::new();
        manager
            .append_turn(&mut session, "hi", "hello", &LeadSignals::default())
            .await
            .unwrap();

        let loaded = manager.get_or_create(Some(&session.id)).await.unwrap();
        let SessionLookup::Existing(loaded) = loaded else {
            panic!("expected existing session");
        };
        assert_eq!(loaded.messages, session.messages);
        assert_eq!(loaded.version, 1);
        assert!(loaded.unsaved_messages().is_empty());
    }

    #[tokio::test]
    async fn stale_writer_is_rebased_without_losing_messages() {
        let (manager, store) = manager();
        let mut first = ChatSession::new();
        manager
            .append_turn(&mut first, "q1", "a1", &LeadSignals::default())
            .await
            .unwrap();

        // Two requests load the same version.
        let mut a = manager.get_or_create(Some(&first.id)).await.unwrap().into_session();
        let mut b = manager.get_or_create(Some(&first.id)).await.unwrap().into_session();

        manager
            .append_turn(&mut a, "q2", "a2", &LeadSignals::default())
            .await
            .unwrap();
        let signals = LeadSignals {
            email: Some("lead@example.com".into()),
            ..Default::default()
        };
        manager.append_turn(&mut b, "q3", "a3", &signals).await.unwrap();

        let stored = store.get_session(&first.id).await.unwrap().unwrap();
        let contents: Vec<&str> = stored.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q1", "a1", "q2", "a2", "q3", "a3"]);
        assert_eq!(stored.version, 3);
        assert!(stored.lead.captured);
        assert_eq!(stored.lead.email.as_deref(), Some("lead@example.com"));
    }

    #[tokio::test]
    async fn replace_after_save_rewrites_nothing() {
        let (manager, store) = manager();
        let mut session = ChatSession::new();
        manager
            .append_turn(&mut session, "hi", "raw", &LeadSignals::default())
            .await
            .unwrap();

        assert!(!manager
            .replace_last_assistant_message(&mut session, "clean")
            .await
            .unwrap());
        let stored = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.messages[1].content, "raw");
    }

    #[tokio::test]
    async fn replace_of_unsaved_reply_is_persisted() {
        let (manager, store) = manager();
        let mut session = ChatSession::new();
        session.append_turn("hi", "raw");

        assert!(manager
            .replace_last_assistant_message(&mut session, "clean")
            .await
            .unwrap());
        let stored = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.messages[1].content, "clean");
        assert_eq!(stored.version, 1);
        assert!(session.unsaved_messages().is_empty());

        // A later turn on the stored session can still be rewritten before saving.
        session.append_turn("and then?", "raw again");
        assert!(manager
            .replace_last_assistant_message(&mut session, "clean again")
            .await
            .unwrap());
        let stored = store.get_session(&session.id).await.unwrap().unwrap();
        let contents: Vec<&str> = stored.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hi", "clean", "and then?", "clean again"]);
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn deleted_session_is_reinserted_on_save() {
        let (manager, store) = manager();
        let mut session = ChatSession::new();
        manager
            .append_turn(&mut session, "hi", "hello", &LeadSignals::default())
            .await
            .unwrap();
        store.delete_session(&session.id).await.unwrap();

        manager
            .append_turn(&mut session, "still there?", "yes", &LeadSignals::default())
            .await
            .unwrap();
        let stored = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.messages.len(), 4);
        assert_eq!(stored.version, 1);
    }
}
