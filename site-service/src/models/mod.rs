mod admin;
mod chat_session;
mod contact;
mod content;
mod meeting_request;
mod social;

pub use admin::Admin;
pub use chat_session::{ChatMessage, ChatRole, ChatSession, Lead};
pub use contact::Contact;
pub use content::{AboutContent, Expertise, SaasProduct, Service};
pub use meeting_request::{MeetingRequest, MeetingStatus};
pub use social::{
    FacebookIntegration, InstagramIntegration, LinkedInIntegration, SocialIntegrations,
    SocialPlatforms, TikTokIntegration, YouTubeIntegration,
};
