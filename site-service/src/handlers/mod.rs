//! HTTP handlers for site-service.

pub mod admin_chat;
pub mod auth;
pub mod chat;
pub mod contact;
pub mod content;
pub mod health;
pub mod social;
