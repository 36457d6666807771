use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contact-form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    #[serde(default)]
    pub comment: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Contact {
    pub fn new(name: String, email: String, phone: String, service: String, comment: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email,
            phone,
            service,
            comment,
            created_at: Utc::now(),
        }
    }

    /// Case-insensitive substring match over the searchable fields.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [&self.name, &self.email, &self.phone, &self.service]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_is_case_insensitive_across_fields() {
        let c = Contact::new(
            "Anna Berg".into(),
            "anna@firm.se".into(),
            "+46 70 000 0000".into(),
            "saas".into(),
            String::new(),
        );
        assert!(c.matches("berg"));
        assert!(c.matches("FIRM.SE"));
        assert!(c.matches("SaaS"));
        assert!(!c.matches("leadership"));
    }
}
