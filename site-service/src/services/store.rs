//! Narrow persistence traits consumed by handlers and the chat pipeline.
//!
//! Every record is addressed by its string `id`. `MongoStore` and
//! `MemoryStore` implement all of them; `Stores` fans one backend out into
//! the trait objects kept in `AppState`.

use crate::models::{
    AboutContent, Admin, ChatSession, Contact, MeetingRequest, MeetingStatus, SaasProduct,
    Service, SocialIntegrations,
};
use async_trait::async_trait;
use service_core::error::AppError;
use std::sync::Arc;

/// Page/limit/search parameters for the admin contact list.
#[derive(Debug, Clone)]
pub struct ContactQuery {
    pub page: u64,
    pub limit: u64,
    pub search: Option<String>,
}

impl ContactQuery {
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1) * self.limit
    }
}

#[derive(Debug, Clone)]
pub struct ContactPage {
    pub data: Vec<Contact>,
    pub total: u64,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn list_services(&self) -> Result<Vec<Service>, AppError>;
    async fn get_service(&self, id: &str) -> Result<Option<Service>, AppError>;
    async fn insert_service(&self, service: &Service) -> Result<(), AppError>;
    /// Returns false when no service has this id.
    async fn replace_service(&self, service: &Service) -> Result<bool, AppError>;
    async fn delete_service(&self, id: &str) -> Result<bool, AppError>;

    async fn list_products(&self) -> Result<Vec<SaasProduct>, AppError>;
    async fn get_product(&self, id: &str) -> Result<Option<SaasProduct>, AppError>;
    async fn insert_product(&self, product: &SaasProduct) -> Result<(), AppError>;
    async fn replace_product(&self, product: &SaasProduct) -> Result<bool, AppError>;
    async fn delete_product(&self, id: &str) -> Result<bool, AppError>;

    async fn get_about(&self) -> Result<Option<AboutContent>, AppError>;
    async fn upsert_about(&self, about: &AboutContent) -> Result<(), AppError>;

    async fn get_social_integrations(&self) -> Result<Option<SocialIntegrations>, AppError>;
    async fn upsert_social_integrations(
        &self,
        settings: &SocialIntegrations,
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert_contact(&self, contact: &Contact) -> Result<(), AppError>;
    /// Newest first.
    async fn list_contacts(&self, query: &ContactQuery) -> Result<ContactPage, AppError>;
    async fn get_contact(&self, id: &str) -> Result<Option<Contact>, AppError>;
    async fn replace_contact(&self, contact: &Contact) -> Result<bool, AppError>;
    async fn delete_contact(&self, id: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, AppError>;
    async fn insert_admin(&self, admin: &Admin) -> Result<(), AppError>;
    async fn update_admin_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn get_session(&self, id: &str) -> Result<Option<ChatSession>, AppError>;

    /// Compare-and-swap write keyed on `session.version`.
    ///
    /// Version 0 inserts; anything else replaces only if the stored version
    /// is unchanged. Returns the new version, or `AppError::Conflict` when
    /// another writer got there first.
    async fn save_session(&self, session: &ChatSession) -> Result<i64, AppError>;

    /// Most recently updated first.
    async fn list_sessions(&self) -> Result<Vec<ChatSession>, AppError>;
    async fn delete_session(&self, id: &str) -> Result<bool, AppError>;

    async fn insert_meeting_request(&self, request: &MeetingRequest) -> Result<(), AppError>;
    /// Newest first.
    async fn list_meeting_requests(&self) -> Result<Vec<MeetingRequest>, AppError>;
    async fn get_meeting_request(&self, id: &str) -> Result<Option<MeetingRequest>, AppError>;
    async fn update_meeting_status(
        &self,
        id: &str,
        status: MeetingStatus,
        admin_notes: &str,
    ) -> Result<bool, AppError>;
    async fn delete_meeting_request(&self, id: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;
}

/// One backend, viewed through each trait.
#[derive(Clone)]
pub struct Stores {
    pub content: Arc<dyn ContentStore>,
    pub contacts: Arc<dyn ContactStore>,
    pub admins: Arc<dyn AdminStore>,
    pub chat: Arc<dyn ChatStore>,
    pub health: Arc<dyn StoreHealth>,
}

impl Stores {
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: ContentStore + ContactStore + AdminStore + ChatStore + StoreHealth + 'static,
    {
        Self {
            content: backend.clone(),
            contacts: backend.clone(),
            admins: backend.clone(),
            chat: backend.clone(),
            health: backend,
        }
    }
}

pub(crate) fn conflict(session_id: &str) -> AppError {
    AppError::Conflict(anyhow::anyhow!(
        "Chat session {} was modified concurrently",
        session_id
    ))
}
