//! Shared setup for site-service HTTP tests: the real router over an
//! in-memory store, a scripted model provider and a recording notifier.

#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use serde_json::Value;
use site_service::{
    build_router,
    config::{
        AdminBootstrapConfig, CompanyConfig, Environment, JwtConfig, LlmConfig, LlmProviderKind,
        MongoConfig, RateLimitConfig, RecaptchaConfig, SecurityConfig, SiteConfig, SmtpConfig,
        StoreBackend, StoreConfig,
    },
    services::{
        providers::mock::MockChatProvider, seed, MemoryStore, MockNotifier, Stores,
    },
    startup::build_state,
    AppState,
};
use std::sync::Arc;
use tower::ServiceExt;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";
pub const ADMIN_EMAIL: &str = "admin@mitaict.test";
pub const NOTIFY_EMAIL: &str = "sales@mitaict.test";

pub fn test_company() -> CompanyConfig {
    CompanyConfig {
        name: "MITA ICT".to_string(),
        contact_email: "info@mitaict.test".to_string(),
        website: "www.mitaict.test".to_string(),
    }
}

pub fn test_config() -> SiteConfig {
    SiteConfig {
        common: service_core::config::Config::default(),
        environment: Environment::Dev,
        service_name: "site-service-test".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        store: StoreConfig {
            backend: StoreBackend::Memory,
            mongodb: MongoConfig {
                uri: "mongodb://localhost:27017".to_string(),
                database: "site_test".to_string(),
            },
        },
        llm: LlmConfig {
            provider: LlmProviderKind::Mock,
            api_key: Secret::new(String::new()),
            model: "mock".to_string(),
            timeout_secs: 5,
            max_tokens: 256,
        },
        smtp: SmtpConfig {
            host: "localhost".to_string(),
            port: 465,
            username: String::new(),
            password: Secret::new(String::new()),
            from_email: "noreply@mitaict.test".to_string(),
            from_name: "MITA ICT".to_string(),
            to_email: NOTIFY_EMAIL.to_string(),
            implicit_tls: true,
            enabled: false,
        },
        jwt: JwtConfig {
            secret: Secret::new("test-secret-that-is-long-enough-for-hs256".to_string()),
            expiration_hours: 1,
        },
        admin: AdminBootstrapConfig {
            username: ADMIN_USERNAME.to_string(),
            password: Secret::new(ADMIN_PASSWORD.to_string()),
            email: ADMIN_EMAIL.to_string(),
        },
        recaptcha: RecaptchaConfig { secret_key: None },
        company: test_company(),
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        rate_limit: RateLimitConfig {
            chat_per_minute: 1000,
            contact_per_hour: 1000,
            login_per_minute: 1000,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub provider: Arc<MockChatProvider>,
    pub notifier: Arc<MockNotifier>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::build(MockChatProvider::new(true), true, test_config()).await
    }

    pub async fn with_provider(provider: MockChatProvider) -> Self {
        Self::build(provider, true, test_config()).await
    }

    /// Notifier that fails every send.
    pub async fn with_failing_notifier(provider: MockChatProvider) -> Self {
        Self::build(provider, false, test_config()).await
    }

    pub async fn with_config(config: SiteConfig) -> Self {
        Self::build(MockChatProvider::new(true), true, config).await
    }

    async fn build(provider: MockChatProvider, notifier_enabled: bool, config: SiteConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        seed::ensure_admin(&*store, &config.admin)
            .await
            .expect("admin bootstrap");

        let provider = Arc::new(provider);
        let notifier = Arc::new(MockNotifier::new(
            notifier_enabled,
            NOTIFY_EMAIL,
            config.company.clone(),
        ));

        let state = build_state(
            config,
            Stores::from_backend(store.clone()),
            provider.clone(),
            notifier.clone(),
        )
        .expect("state");
        let router = build_router(state.clone());

        Self {
            router,
            state,
            store,
            provider,
            notifier,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    /// Authenticated GET that keeps the raw body and headers.
    pub async fn download(&self, uri: &str, token: &str) -> (StatusCode, HeaderMap, Bytes) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, bytes)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn admin_token(&self) -> String {
        let (status, body) = self
            .post_json(
                "/api/admin/login",
                serde_json::json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn chat(&self, session_id: Option<&str>, message: &str) -> (StatusCode, Value) {
        let mut body = serde_json::json!({ "message": message });
        if let Some(id) = session_id {
            body["session_id"] = Value::String(id.to_string());
        }
        self.post_json("/api/chat/message", body).await
    }
}
