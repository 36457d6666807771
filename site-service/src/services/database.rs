use super::store::{
    conflict, AdminStore, ChatStore, ContactPage, ContactQuery, ContactStore, ContentStore,
    StoreHealth,
};
use crate::models::{
    AboutContent, Admin, ChatSession, Contact, MeetingRequest, MeetingStatus, SaasProduct,
    Service, SocialIntegrations,
};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    error::{ErrorKind, WriteFailure},
    options::{FindOptions, IndexOptions, ReplaceOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use service_core::error::AppError;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoStore {
    client: MongoClient,
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for site-service");

        let id_key = || doc! { "id": 1 };
        create_index(&self.services(), id_key(), "id_unique", true).await?;
        create_index(&self.products(), id_key(), "id_unique", true).await?;
        create_index(&self.about(), id_key(), "id_unique", true).await?;
        create_index(&self.social_integrations(), id_key(), "id_unique", true).await?;
        create_index(&self.contacts(), id_key(), "id_unique", true).await?;
        create_index(&self.admins(), id_key(), "id_unique", true).await?;
        create_index(&self.sessions(), id_key(), "id_unique", true).await?;
        create_index(&self.meeting_requests(), id_key(), "id_unique", true).await?;

        create_index(
            &self.sessions(),
            doc! { "updated_at": -1 },
            "updated_at_desc",
            false,
        )
        .await?;
        create_index(
            &self.meeting_requests(),
            doc! { "created_at": -1 },
            "created_at_desc",
            false,
        )
        .await?;
        create_index(
            &self.meeting_requests(),
            doc! { "session_id": 1 },
            "session_lookup",
            false,
        )
        .await?;
        create_index(
            &self.contacts(),
            doc! { "created_at": -1 },
            "created_at_desc",
            false,
        )
        .await?;
        create_index(
            &self.admins(),
            doc! { "username": 1 },
            "username_unique",
            true,
        )
        .await?;

        Ok(())
    }

    fn services(&self) -> Collection<Service> {
        self.db.collection("services")
    }

    fn products(&self) -> Collection<SaasProduct> {
        self.db.collection("saas_products")
    }

    fn about(&self) -> Collection<AboutContent> {
        self.db.collection("about_content")
    }

    fn social_integrations(&self) -> Collection<SocialIntegrations> {
        self.db.collection("social_integrations")
    }

    fn contacts(&self) -> Collection<Contact> {
        self.db.collection("contacts")
    }

    fn admins(&self) -> Collection<Admin> {
        self.db.collection("admins")
    }

    fn sessions(&self) -> Collection<ChatSession> {
        self.db.collection("chat_sessions")
    }

    fn meeting_requests(&self) -> Collection<MeetingRequest> {
        self.db.collection("meeting_requests")
    }
}

async fn create_index<T>(
    collection: &Collection<T>,
    keys: Document,
    name: &str,
    unique: bool,
) -> Result<(), AppError>
where
    T: Send + Sync,
{
    let index = IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .name(name.to_string())
                .unique(unique)
                .build(),
        )
        .build();

    collection.create_index(index, None).await.map_err(|e| {
        tracing::error!(
            "Failed to create {} index on {} collection: {}",
            name,
            collection.name(),
            e
        );
        AppError::from(e)
    })?;
    tracing::info!("Created index {} on {}", name, collection.name());
    Ok(())
}

async fn find_all<T>(
    collection: &Collection<T>,
    filter: Document,
    sort: Document,
) -> Result<Vec<T>, AppError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let options = FindOptions::builder().sort(sort).build();
    let cursor = collection.find(filter, options).await?;
    Ok(cursor.try_collect().await?)
}

async fn replace_by_id<T>(collection: &Collection<T>, id: &str, value: &T) -> Result<bool, AppError>
where
    T: Serialize + Send + Sync,
{
    let result = collection
        .replace_one(doc! { "id": id }, value, None)
        .await?;
    Ok(result.matched_count > 0)
}

async fn delete_by_id<T>(collection: &Collection<T>, id: &str) -> Result<bool, AppError>
where
    T: Send + Sync,
{
    let result = collection.delete_one(doc! { "id": id }, None).await?;
    Ok(result.deleted_count > 0)
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl ContentStore for MongoStore {
    async fn list_services(&self) -> Result<Vec<Service>, AppError> {
        find_all(&self.services(), doc! {}, doc! { "created_at": 1 }).await
    }

    async fn get_service(&self, id: &str) -> Result<Option<Service>, AppError> {
        Ok(self.services().find_one(doc! { "id": id }, None).await?)
    }

    async fn insert_service(&self, service: &Service) -> Result<(), AppError> {
        self.services().insert_one(service, None).await?;
        Ok(())
    }

    async fn replace_service(&self, service: &Service) -> Result<bool, AppError> {
        replace_by_id(&self.services(), &service.id, service).await
    }

    async fn delete_service(&self, id: &str) -> Result<bool, AppError> {
        delete_by_id(&self.services(), id).await
    }

    async fn list_products(&self) -> Result<Vec<SaasProduct>, AppError> {
        find_all(&self.products(), doc! {}, doc! { "created_at": 1 }).await
    }

    async fn get_product(&self, id: &str) -> Result<Option<SaasProduct>, AppError> {
        Ok(self.products().find_one(doc! { "id": id }, None).await?)
    }

    async fn insert_product(&self, product: &SaasProduct) -> Result<(), AppError> {
        self.products().insert_one(product, None).await?;
        Ok(())
    }

    async fn replace_product(&self, product: &SaasProduct) -> Result<bool, AppError> {
        replace_by_id(&self.products(), &product.id, product).await
    }

    async fn delete_product(&self, id: &str) -> Result<bool, AppError> {
        delete_by_id(&self.products(), id).await
    }

    async fn get_about(&self) -> Result<Option<AboutContent>, AppError> {
        Ok(self.about().find_one(doc! {}, None).await?)
    }

    async fn upsert_about(&self, about: &AboutContent) -> Result<(), AppError> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.about()
            .replace_one(doc! { "id": about.id.as_str() }, about, options)
            .await?;
        Ok(())
    }

    async fn get_social_integrations(&self) -> Result<Option<SocialIntegrations>, AppError> {
        Ok(self.social_integrations().find_one(doc! {}, None).await?)
    }

    async fn upsert_social_integrations(
        &self,
        settings: &SocialIntegrations,
    ) -> Result<(), AppError> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.social_integrations()
            .replace_one(doc! { "id": settings.id.as_str() }, settings, options)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ContactStore for MongoStore {
    async fn insert_contact(&self, contact: &Contact) -> Result<(), AppError> {
        self.contacts().insert_one(contact, None).await?;
        Ok(())
    }

    async fn list_contacts(&self, query: &ContactQuery) -> Result<ContactPage, AppError> {
        let filter = match query.search.as_deref().filter(|s| !s.is_empty()) {
            Some(search) => {
                let pattern = regex::escape(search);
                let clause = |field: &str| doc! { field: { "$regex": pattern.as_str(), "$options": "i" } };
                doc! {
                    "$or": [clause("name"), clause("email"), clause("phone"), clause("service")]
                }
            }
            None => doc! {},
        };

        let total = self
            .contacts()
            .count_documents(filter.clone(), None)
            .await?;

        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .skip(query.skip())
            .limit(query.limit as i64)
            .build();
        let cursor = self.contacts().find(filter, options).await?;
        let data = cursor.try_collect().await?;

        Ok(ContactPage { data, total })
    }

    async fn get_contact(&self, id: &str) -> Result<Option<Contact>, AppError> {
        Ok(self.contacts().find_one(doc! { "id": id }, None).await?)
    }

    async fn replace_contact(&self, contact: &Contact) -> Result<bool, AppError> {
        replace_by_id(&self.contacts(), &contact.id, contact).await
    }

    async fn delete_contact(&self, id: &str) -> Result<bool, AppError> {
        delete_by_id(&self.contacts(), id).await
    }
}

#[async_trait]
impl AdminStore for MongoStore {
    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, AppError> {
        Ok(self
            .admins()
            .find_one(doc! { "username": username }, None)
            .await?)
    }

    async fn insert_admin(&self, admin: &Admin) -> Result<(), AppError> {
        match self.admins().insert_one(admin, None).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(AppError::Conflict(anyhow::anyhow!(
                "Admin {} already exists",
                admin.username
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_admin_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<bool, AppError> {
        let result = self
            .admins()
            .update_one(
                doc! { "username": username },
                doc! { "$set": { "password_hash": password_hash } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}

#[async_trait]
impl ChatStore for MongoStore {
    async fn get_session(&self, id: &str) -> Result<Option<ChatSession>, AppError> {
        Ok(self.sessions().find_one(doc! { "id": id }, None).await?)
    }

    async fn save_session(&self, session: &ChatSession) -> Result<i64, AppError> {
        let next = session.version + 1;
        let mut stored = session.clone();
        stored.version = next;

        if session.version == 0 {
            // Sessions written before versioning carry no `version` field.
            let legacy = self
                .sessions()
                .replace_one(
                    doc! { "id": session.id.as_str(), "version": { "$exists": false } },
                    &stored,
                    None,
                )
                .await?;
            if legacy.matched_count > 0 {
                return Ok(next);
            }
            return match self.sessions().insert_one(&stored, None).await {
                Ok(_) => Ok(next),
                Err(e) if is_duplicate_key(&e) => Err(conflict(&session.id)),
                Err(e) => Err(e.into()),
            };
        }

        let result = self
            .sessions()
            .replace_one(
                doc! { "id": session.id.as_str(), "version": session.version },
                &stored,
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(conflict(&session.id));
        }
        Ok(next)
    }

    async fn list_sessions(&self) -> Result<Vec<ChatSession>, AppError> {
        find_all(&self.sessions(), doc! {}, doc! { "updated_at": -1 }).await
    }

    async fn delete_session(&self, id: &str) -> Result<bool, AppError> {
        delete_by_id(&self.sessions(), id).await
    }

    async fn insert_meeting_request(&self, request: &MeetingRequest) -> Result<(), AppError> {
        self.meeting_requests().insert_one(request, None).await?;
        Ok(())
    }

    async fn list_meeting_requests(&self) -> Result<Vec<MeetingRequest>, AppError> {
        find_all(&self.meeting_requests(), doc! {}, doc! { "created_at": -1 }).await
    }

    async fn get_meeting_request(&self, id: &str) -> Result<Option<MeetingRequest>, AppError> {
        Ok(self
            .meeting_requests()
            .find_one(doc! { "id": id }, None)
            .await?)
    }

    async fn update_meeting_status(
        &self,
        id: &str,
        status: MeetingStatus,
        admin_notes: &str,
    ) -> Result<bool, AppError> {
        let result = self
            .meeting_requests()
            .update_one(
                doc! { "id": id },
                doc! { "$set": { "status": status.as_str(), "admin_notes": admin_notes } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_meeting_request(&self, id: &str) -> Result<bool, AppError> {
        delete_by_id(&self.meeting_requests(), id).await
    }
}

#[async_trait]
impl StoreHealth for MongoStore {
    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
