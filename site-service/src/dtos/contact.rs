use super::rfc3339;
use crate::models::Contact;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_PAGE_LIMIT: u64 = 50;
pub const MAX_PAGE_LIMIT: u64 = 200;

#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 50))]
    pub phone: String,
    #[validate(length(min = 1, max = 100))]
    pub service: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub comment: String,
    #[serde(default)]
    pub recaptcha_token: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateContactRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub service: Option<String>,
    #[validate(length(max = 5000))]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitContactResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub comment: String,
    pub created_at: String,
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        Self {
            created_at: rfc3339(&contact.created_at),
            id: contact.id,
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            service: contact.service,
            comment: contact.comment,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactListResponse {
    pub data: Vec<ContactResponse>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}
