use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    Pending,
    Approved,
    Rejected,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Pending => "pending",
            MeetingStatus::Approved => "approved",
            MeetingStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeetingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MeetingStatus::Pending),
            "approved" => Ok(MeetingStatus::Approved),
            "rejected" => Ok(MeetingStatus::Rejected),
            other => Err(format!("Invalid meeting status: {}", other)),
        }
    }
}

/// A meeting the assistant scheduled on behalf of a visitor, awaiting admin review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingRequest {
    pub id: String,
    pub session_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub preferred_datetime: String,
    pub topic: String,
    pub status: MeetingStatus,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl MeetingRequest {
    pub fn new(
        session_id: String,
        name: String,
        email: String,
        phone: Option<String>,
        preferred_datetime: String,
        topic: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id,
            name,
            email,
            phone,
            preferred_datetime,
            topic,
            status: MeetingStatus::Pending,
            admin_notes: None,
            created_at: Utc::now(),
        }
    }
}
