use super::rfc3339;
use crate::models::{SocialIntegrations, SocialPlatforms};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

const MAX_SETTING_LEN: usize = 2000;

/// Replaces every platform's settings. A platform left out of the body is
/// reset to disabled and empty.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSocialIntegrationsRequest {
    #[serde(flatten)]
    #[validate(custom(function = "settings_within_limit"))]
    pub platforms: SocialPlatforms,
}

fn settings_within_limit(platforms: &SocialPlatforms) -> Result<(), ValidationError> {
    let value = serde_json::to_value(platforms).map_err(|_| ValidationError::new("invalid"))?;
    if longest_string(&value) > MAX_SETTING_LEN {
        let mut err = ValidationError::new("length");
        err.message = Some(format!("values may not exceed {MAX_SETTING_LEN} characters").into());
        return Err(err);
    }
    Ok(())
}

fn longest_string(value: &Value) -> usize {
    match value {
        Value::String(s) => s.chars().count(),
        Value::Object(fields) => fields.values().map(longest_string).max().unwrap_or(0),
        _ => 0,
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SocialIntegrationsResponse {
    #[serde(flatten)]
    pub platforms: SocialPlatforms,
    /// `None` until the settings have been saved once.
    pub updated_at: Option<String>,
}

impl SocialIntegrationsResponse {
    pub fn unset() -> Self {
        Self {
            platforms: SocialPlatforms::default(),
            updated_at: None,
        }
    }
}

impl From<SocialIntegrations> for SocialIntegrationsResponse {
    fn from(settings: SocialIntegrations) -> Self {
        Self {
            updated_at: Some(rfc3339(&settings.updated_at)),
            platforms: settings.platforms,
        }
    }
}
