//! In-process store used by tests and database-less local runs.

use super::store::{
    conflict, AdminStore, ChatStore, ContactPage, ContactQuery, ContactStore, ContentStore,
    StoreHealth,
};
use crate::models::{
    AboutContent, Admin, ChatSession, Contact, MeetingRequest, MeetingStatus, SaasProduct,
    Service, SocialIntegrations,
};
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use service_core::error::AppError;
use std::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    services: DashMap<String, Service>,
    products: DashMap<String, SaasProduct>,
    about: RwLock<Option<AboutContent>>,
    social: RwLock<Option<SocialIntegrations>>,
    contacts: DashMap<String, Contact>,
    admins: DashMap<String, Admin>,
    sessions: DashMap<String, ChatSession>,
    meetings: DashMap<String, MeetingRequest>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn values<T: Clone>(map: &DashMap<String, T>) -> Vec<T> {
    map.iter().map(|entry| entry.value().clone()).collect()
}

fn replace<T: Clone>(map: &DashMap<String, T>, id: &str, value: &T) -> bool {
    match map.get_mut(id) {
        Some(mut slot) => {
            *slot = value.clone();
            true
        }
        None => false,
    }
}

fn poisoned(what: &str) -> AppError {
    AppError::InternalError(anyhow::anyhow!("{what} lock poisoned"))
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list_services(&self) -> Result<Vec<Service>, AppError> {
        let mut services = values(&self.services);
        services.sort_by_key(|s| s.created_at);
        Ok(services)
    }

    async fn get_service(&self, id: &str) -> Result<Option<Service>, AppError> {
        Ok(self.services.get(id).map(|s| s.clone()))
    }

    async fn insert_service(&self, service: &Service) -> Result<(), AppError> {
        self.services.insert(service.id.clone(), service.clone());
        Ok(())
    }

    async fn replace_service(&self, service: &Service) -> Result<bool, AppError> {
        Ok(replace(&self.services, &service.id, service))
    }

    async fn delete_service(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.services.remove(id).is_some())
    }

    async fn list_products(&self) -> Result<Vec<SaasProduct>, AppError> {
        let mut products = values(&self.products);
        products.sort_by_key(|p| p.created_at);
        Ok(products)
    }

    async fn get_product(&self, id: &str) -> Result<Option<SaasProduct>, AppError> {
        Ok(self.products.get(id).map(|p| p.clone()))
    }

    async fn insert_product(&self, product: &SaasProduct) -> Result<(), AppError> {
        self.products.insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn replace_product(&self, product: &SaasProduct) -> Result<bool, AppError> {
        Ok(replace(&self.products, &product.id, product))
    }

    async fn delete_product(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.products.remove(id).is_some())
    }

    async fn get_about(&self) -> Result<Option<AboutContent>, AppError> {
        Ok(self.about.read().map_err(|_| poisoned("About content"))?.clone())
    }

    async fn upsert_about(&self, about: &AboutContent) -> Result<(), AppError> {
        *self.about.write().map_err(|_| poisoned("About content"))? = Some(about.clone());
        Ok(())
    }

    async fn get_social_integrations(&self) -> Result<Option<SocialIntegrations>, AppError> {
        Ok(self
            .social
            .read()
            .map_err(|_| poisoned("Social integrations"))?
            .clone())
    }

    async fn upsert_social_integrations(
        &self,
        settings: &SocialIntegrations,
    ) -> Result<(), AppError> {
        *self
            .social
            .write()
            .map_err(|_| poisoned("Social integrations"))? = Some(settings.clone());
        Ok(())
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn insert_contact(&self, contact: &Contact) -> Result<(), AppError> {
        self.contacts.insert(contact.id.clone(), contact.clone());
        Ok(())
    }

    async fn list_contacts(&self, query: &ContactQuery) -> Result<ContactPage, AppError> {
        let mut matching: Vec<Contact> = self
            .contacts
            .iter()
            .filter(|c| match query.search.as_deref() {
                Some(needle) => c.matches(needle),
                None => true,
            })
            .map(|c| c.value().clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let data = matching
            .into_iter()
            .skip(query.skip() as usize)
            .take(query.limit as usize)
            .collect();
        Ok(ContactPage { data, total })
    }

    async fn get_contact(&self, id: &str) -> Result<Option<Contact>, AppError> {
        Ok(self.contacts.get(id).map(|c| c.clone()))
    }

    async fn replace_contact(&self, contact: &Contact) -> Result<bool, AppError> {
        Ok(replace(&self.contacts, &contact.id, contact))
    }

    async fn delete_contact(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.contacts.remove(id).is_some())
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, AppError> {
        Ok(self.admins.get(username).map(|a| a.clone()))
    }

    async fn insert_admin(&self, admin: &Admin) -> Result<(), AppError> {
        match self.admins.entry(admin.username.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict(anyhow::anyhow!(
                "Admin {} already exists",
                admin.username
            ))),
            Entry::Vacant(slot) => {
                slot.insert(admin.clone());
                Ok(())
            }
        }
    }

    async fn update_admin_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<bool, AppError> {
        match self.admins.get_mut(username) {
            Some(mut admin) => {
                admin.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn get_session(&self, id: &str) -> Result<Option<ChatSession>, AppError> {
        Ok(self.sessions.get(id).map(|s| s.clone()))
    }

    async fn save_session(&self, session: &ChatSession) -> Result<i64, AppError> {
        let next = session.version + 1;
        match self.sessions.entry(session.id.clone()) {
            Entry::Occupied(mut slot) => {
                if session.version == 0 || slot.get().version != session.version {
                    return Err(conflict(&session.id));
                }
                let mut stored = session.clone();
                stored.version = next;
                slot.insert(stored);
            }
            Entry::Vacant(slot) => {
                if session.version != 0 {
                    return Err(conflict(&session.id));
                }
                let mut stored = session.clone();
                stored.version = next;
                slot.insert(stored);
            }
        }
        Ok(next)
    }

    async fn list_sessions(&self) -> Result<Vec<ChatSession>, AppError> {
        let mut sessions = values(&self.sessions);
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    async fn delete_session(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.sessions.remove(id).is_some())
    }

    async fn insert_meeting_request(&self, request: &MeetingRequest) -> Result<(), AppError> {
        self.meetings.insert(request.id.clone(), request.clone());
        Ok(())
    }

    async fn list_meeting_requests(&self) -> Result<Vec<MeetingRequest>, AppError> {
        let mut requests = values(&self.meetings);
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn get_meeting_request(&self, id: &str) -> Result<Option<MeetingRequest>, AppError> {
        Ok(self.meetings.get(id).map(|m| m.clone()))
    }

    async fn update_meeting_status(
        &self,
        id: &str,
        status: MeetingStatus,
        admin_notes: &str,
    ) -> Result<bool, AppError> {
        match self.meetings.get_mut(id) {
            Some(mut request) => {
                request.status = status;
                request.admin_notes = Some(admin_notes.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_meeting_request(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.meetings.remove(id).is_some())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_session_is_compare_and_swap() {
        let store = MemoryStore::new();
        let mut session = ChatSession::new();
        session.append_turn("hi", "hello");

        let v1 = store.save_session(&session).await.unwrap();
        assert_eq!(v1, 1);

        // Inserting the same id twice is a conflict.
        assert!(store.save_session(&session).await.unwrap_err().is_conflict());

        session.version = v1;
        let v2 = store.save_session(&session).await.unwrap();
        assert_eq!(v2, 2);

        // Writing from the stale version loses.
        session.version = v1;
        assert!(store.save_session(&session).await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn contact_listing_pages_and_filters() {
        let store = MemoryStore::new();
        for i in 0..5 {
            let mut c = Contact::new(
                format!("Person {}", i),
                format!("p{}@example.com", i),
                "0700000000".into(),
                if i % 2 == 0 { "saas" } else { "leadership" }.into(),
                String::new(),
            );
            c.created_at += chrono::Duration::seconds(i);
            store.insert_contact(&c).await.unwrap();
        }

        let page = store
            .list_contacts(&ContactQuery {
                page: 1,
                limit: 2,
                search: None,
            })
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].name, "Person 4");

        let filtered = store
            .list_contacts(&ContactQuery {
                page: 1,
                limit: 50,
                search: Some("LEADER".into()),
            })
            .await
            .unwrap();
        assert_eq!(filtered.total, 2);
    }

    #[tokio::test]
    async fn meeting_status_update_reports_missing_ids() {
        let store = MemoryStore::new();
        assert!(!store
            .update_meeting_status("nope", MeetingStatus::Approved, "")
            .await
            .unwrap());
    }
}
