use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FacebookIntegration {
    pub enabled: bool,
    pub pixel_id: String,
    pub access_token: String,
    pub page_id: String,
    pub app_id: String,
    pub app_secret: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstagramIntegration {
    pub enabled: bool,
    pub access_token: String,
    pub business_account_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TikTokIntegration {
    pub enabled: bool,
    pub pixel_id: String,
    pub access_token: String,
    pub advertiser_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkedInIntegration {
    pub enabled: bool,
    pub partner_id: String,
    pub access_token: String,
    pub organization_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct YouTubeIntegration {
    pub enabled: bool,
    pub api_key: String,
    pub channel_id: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Per-platform tracking and API settings edited from the admin panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialPlatforms {
    pub facebook: FacebookIntegration,
    pub instagram: InstagramIntegration,
    pub tiktok: TikTokIntegration,
    pub linkedin: LinkedInIntegration,
    pub youtube: YouTubeIntegration,
}

/// Singleton settings document. Every platform starts disabled and empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialIntegrations {
    pub id: String,
    #[serde(flatten)]
    pub platforms: SocialPlatforms,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl SocialIntegrations {
    pub fn new(platforms: SocialPlatforms) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            platforms,
            updated_at: Utc::now(),
        }
    }
}
