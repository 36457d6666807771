use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Service {
    pub fn new(title: String, description: String, icon: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description,
            icon,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaasProduct {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl SaasProduct {
    pub fn new(
        name: String,
        description: String,
        url: String,
        features: Vec<String>,
        price: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            url,
            features,
            price,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expertise {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<String>,
}

/// Singleton "About" page content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AboutContent {
    pub id: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub years_experience: Option<String>,
    #[serde(default)]
    pub story: Option<String>,
    #[serde(default)]
    pub expertise: Vec<Expertise>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl AboutContent {
    pub fn empty() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            company_name: None,
            description: None,
            years_experience: None,
            story: None,
            expertise: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}
