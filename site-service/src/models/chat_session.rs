//! Chat session model: the conversation transcript plus the lead captured from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// A single turn fragment. Never edited after it has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Contact details gathered during a conversation.
///
/// `captured` is set once an email, a phone number or a meeting request has
/// been derived from the session; a name alone does not count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(default)]
    pub captured: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub interest: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub lead: Lead,
    /// Optimistic concurrency counter. Zero means "never stored".
    #[serde(default)]
    pub version: i64,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
    /// Index of the first message not yet written to the store.
    #[serde(skip)]
    pending_from: usize,
}

impl ChatSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            messages: Vec::new(),
            lead: Lead::default(),
            version: 0,
            created_at: now,
            updated_at: now,
            pending_from: 0,
        }
    }

    /// Append a user message followed by the assistant reply.
    pub fn append_turn(&mut self, user_text: &str, assistant_text: &str) {
        self.messages.push(ChatMessage::new(ChatRole::User, user_text));
        self.messages
            .push(ChatMessage::new(ChatRole::Assistant, assistant_text));
        self.updated_at = Utc::now();
    }

    /// Swap the content of the trailing assistant message, provided it has not
    /// been persisted yet. Returns whether a replacement happened.
    pub fn replace_last_assistant_message(&mut self, text: &str) -> bool {
        let pending_from = self.pending_from;
        match self.messages.iter_mut().enumerate().last() {
            Some((idx, msg)) if idx >= pending_from && msg.role == ChatRole::Assistant => {
                msg.content = text.to_string();
                true
            }
            _ => false,
        }
    }

    /// Messages appended since the last successful save.
    pub fn unsaved_messages(&self) -> &[ChatMessage] {
        &self.messages[self.pending_from.min(self.messages.len())..]
    }

    /// Record that every current message is in the store.
    pub fn mark_persisted(&mut self) {
        self.pending_from = self.messages.len();
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sessions_get_distinct_ids() {
        let a = ChatSession::new();
        let b = ChatSession::new();
        assert_ne!(a.id, b.id);
        assert_eq!(a.version, 0);
        assert!(a.messages.is_empty());
    }

    #[test]
    fn append_turn_keeps_user_then_assistant_order() {
        let mut session = ChatSession::new();
        session.append_turn("hello", "hi there");
        session.append_turn("prices?", "from 99 SEK");

        let roles: Vec<ChatRole> = session.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                ChatRole::User,
                ChatRole::Assistant,
                ChatRole::User,
                ChatRole::Assistant
            ]
        );
        assert_eq!(session.messages[3].content, "from 99 SEK");
    }

    #[test]
    fn replace_only_touches_unsaved_assistant_message() {
        let mut session = ChatSession::new();
        session.append_turn("hello", "raw reply");
        assert!(session.replace_last_assistant_message("clean reply"));
        assert_eq!(session.messages[1].content, "clean reply");

        session.mark_persisted();
        assert!(!session.replace_last_assistant_message("late edit"));
        assert_eq!(session.messages[1].content, "clean reply");
    }

    #[test]
    fn unsaved_messages_tracks_persist_marker() {
        let mut session = ChatSession::new();
        session.append_turn("a", "b");
        assert_eq!(session.unsaved_messages().len(), 2);
        session.mark_persisted();
        assert!(session.unsaved_messages().is_empty());
        session.append_turn("c", "d");
        assert_eq!(session.unsaved_messages()[0].content, "c");
    }

    #[test]
    fn stored_form_keeps_id_apart_from_mongo_key() {
        let mut session = ChatSession::new();
        session.append_turn("hi", "hello");

        let stored = mongodb::bson::to_document(&session).unwrap();
        assert_eq!(stored.get_str("id").unwrap(), session.id);
        assert!(!stored.contains_key("_id"));

        let mut fetched = stored.clone();
        fetched.insert("_id", mongodb::bson::oid::ObjectId::new());
        let loaded: ChatSession = mongodb::bson::from_document(fetched).unwrap();
        assert_eq!(loaded.id, session.id);
        assert_eq!(loaded.messages.len(), 2);
    }
}
