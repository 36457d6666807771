use super::rfc3339;
use crate::models::{ChatMessage, ChatSession, MeetingRequest};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub message: String,
    pub lead_captured: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessageResponse {
    pub role: String,
    pub content: String,
    pub timestamp: String,
}

impl From<&ChatMessage> for ChatMessageResponse {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
            timestamp: rfc3339(&message.timestamp),
        }
    }
}

/// Row in the admin session list.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub lead_captured: bool,
    pub lead_name: Option<String>,
    pub lead_email: Option<String>,
    pub lead_phone: Option<String>,
    pub lead_interest: Option<String>,
    pub message_count: usize,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&ChatSession> for SessionSummary {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id.clone(),
            lead_captured: session.lead.captured,
            lead_name: session.lead.name.clone(),
            lead_email: session.lead.email.clone(),
            lead_phone: session.lead.phone.clone(),
            lead_interest: session.lead.interest.clone(),
            message_count: session.messages.len(),
            created_at: rfc3339(&session.created_at),
            updated_at: rfc3339(&session.updated_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionDetailResponse {
    pub id: String,
    pub messages: Vec<ChatMessageResponse>,
    pub lead_captured: bool,
    pub lead_name: Option<String>,
    pub lead_email: Option<String>,
    pub lead_phone: Option<String>,
    pub lead_interest: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ChatSession> for SessionDetailResponse {
    fn from(session: ChatSession) -> Self {
        Self {
            messages: session.messages.iter().map(Into::into).collect(),
            id: session.id,
            lead_captured: session.lead.captured,
            lead_name: session.lead.name,
            lead_email: session.lead.email,
            lead_phone: session.lead.phone,
            lead_interest: session.lead.interest,
            created_at: rfc3339(&session.created_at),
            updated_at: rfc3339(&session.updated_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeetingRequestResponse {
    pub id: String,
    pub session_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub preferred_datetime: String,
    pub topic: String,
    pub status: String,
    pub admin_notes: Option<String>,
    pub created_at: String,
}

impl From<MeetingRequest> for MeetingRequestResponse {
    fn from(request: MeetingRequest) -> Self {
        Self {
            status: request.status.as_str().to_string(),
            created_at: rfc3339(&request.created_at),
            id: request.id,
            session_id: request.session_id,
            name: request.name,
            email: request.email,
            phone: request.phone,
            preferred_datetime: request.preferred_datetime,
            topic: request.topic,
            admin_notes: request.admin_notes,
        }
    }
}

/// `status` is left untyped so that a missing, null or non-string value
/// reaches the handler and is rejected as an invalid status.
#[derive(Debug, Deserialize)]
pub struct UpdateMeetingStatusRequest {
    #[serde(default)]
    pub status: serde_json::Value,
    #[serde(default)]
    pub admin_notes: Option<String>,
}
