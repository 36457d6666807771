pub mod chat;
pub mod database;
pub mod email;
pub mod export;
pub mod jwt;
pub mod leads;
pub mod memory;
pub mod metrics;
pub mod prompt;
pub mod providers;
pub mod recaptcha;
pub mod seed;
pub mod sessions;
pub mod store;

pub use chat::{ChatReply, ChatService};
pub use database::MongoStore;
pub use email::{MockNotifier, Notifier, SmtpNotifier};
pub use jwt::{AdminClaims, JwtService};
pub use memory::MemoryStore;
pub use prompt::PromptBuilder;
pub use recaptcha::RecaptchaVerifier;
pub use sessions::{SessionLookup, SessionManager};
pub use store::{
    AdminStore, ChatStore, ContactPage, ContactQuery, ContactStore, ContentStore, StoreHealth,
    Stores,
};
