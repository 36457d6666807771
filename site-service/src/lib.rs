pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use service_core::middleware::{
    ip_rate_limit_middleware, make_request_span, metrics_middleware, request_id_middleware,
    security_headers_middleware, IpRateLimiter,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::SiteConfig;
use crate::services::{ChatService, JwtService, Notifier, RecaptchaVerifier, Stores};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SiteConfig>,
    pub stores: Stores,
    pub chat: ChatService,
    pub notifier: Arc<dyn Notifier>,
    pub jwt: JwtService,
    pub recaptcha: RecaptchaVerifier,
    pub chat_rate_limiter: IpRateLimiter,
    pub contact_rate_limiter: IpRateLimiter,
    pub login_rate_limiter: IpRateLimiter,
}

pub fn build_router(state: AppState) -> Router {
    // Admin routes
    let admin_routes = Router::new()
        .route("/api/admin/logout", post(handlers::auth::logout))
        .route(
            "/api/admin/change-password",
            post(handlers::auth::change_password),
        )
        .route("/api/admin/contacts", get(handlers::contact::list_contacts))
        .route(
            "/api/admin/contacts/export/pdf",
            get(handlers::contact::export_contacts_pdf),
        )
        .route(
            "/api/admin/contacts/export/excel",
            get(handlers::contact::export_contacts_excel),
        )
        .route(
            "/api/admin/contacts/:id",
            put(handlers::contact::update_contact).delete(handlers::contact::delete_contact),
        )
        .route("/api/admin/services", post(handlers::content::create_service))
        .route(
            "/api/admin/services/:id",
            put(handlers::content::update_service).delete(handlers::content::delete_service),
        )
        .route(
            "/api/admin/saas-products",
            post(handlers::content::create_product),
        )
        .route(
            "/api/admin/saas-products/:id",
            put(handlers::content::update_product).delete(handlers::content::delete_product),
        )
        .route("/api/admin/about", put(handlers::content::update_about))
        .route(
            "/api/admin/social-integrations",
            get(handlers::social::get_social_integrations)
                .put(handlers::social::update_social_integrations),
        )
        .route(
            "/api/admin/chat-sessions",
            get(handlers::admin_chat::list_sessions),
        )
        .route(
            "/api/admin/chat-sessions/:id",
            get(handlers::admin_chat::get_session).delete(handlers::admin_chat::delete_session),
        )
        .route(
            "/api/admin/meeting-requests",
            get(handlers::admin_chat::list_meeting_requests),
        )
        .route(
            "/api/admin/meeting-requests/:id/status",
            put(handlers::admin_chat::update_meeting_status),
        )
        .route(
            "/api/admin/meeting-requests/:id",
            axum::routing::delete(handlers::admin_chat::delete_meeting_request),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::admin_auth_middleware,
        ));

    let login_route = Router::new()
        .route("/api/admin/login", post(handlers::auth::login))
        .layer(from_fn_with_state(
            state.login_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    let chat_route = Router::new()
        .route("/api/chat/message", post(handlers::chat::send_message))
        .layer(from_fn_with_state(
            state.chat_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    let contact_route = Router::new()
        .route("/api/contact", post(handlers::contact::submit_contact))
        .layer(from_fn_with_state(
            state.contact_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    let cors = cors_layer(&state.config.security.allowed_origins);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::health::metrics_handler))
        .route("/api/", get(handlers::health::api_root))
        .route("/api/services", get(handlers::content::list_services))
        .route("/api/saas-products", get(handlers::content::list_products))
        .route("/api/about", get(handlers::content::get_about))
        .merge(chat_route)
        .merge(contact_route)
        .merge(login_route)
        .merge(admin_routes)
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static(service_core::middleware::REQUEST_ID_HEADER),
        ])
}
