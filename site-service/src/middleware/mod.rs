pub mod auth;

pub use auth::{admin_auth_middleware, AdminUser};
