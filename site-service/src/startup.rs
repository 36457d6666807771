use crate::config::{SiteConfig, StoreBackend};
use crate::services::{
    providers::{build_provider, ChatProvider, GenerationParams},
    seed, ChatService, JwtService, MemoryStore, MongoStore, Notifier, PromptBuilder,
    RecaptchaVerifier, SessionManager, SmtpNotifier, Stores,
};
use crate::{build_router, AppState};
use axum::Router;
use service_core::error::AppError;
use service_core::middleware::create_ip_rate_limiter;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Wire the shared state from already-constructed backends.
pub fn build_state(
    config: SiteConfig,
    stores: Stores,
    provider: Arc<dyn ChatProvider>,
    notifier: Arc<dyn Notifier>,
) -> Result<AppState, AppError> {
    let params = GenerationParams {
        max_tokens: Some(config.llm.max_tokens),
        ..GenerationParams::default()
    };

    let sessions = SessionManager::new(stores.chat.clone());
    let prompts = PromptBuilder::new(stores.content.clone(), config.company.clone());
    let chat = ChatService::new(
        sessions,
        prompts,
        provider,
        notifier.clone(),
        stores.chat.clone(),
        params,
    );

    let jwt = JwtService::new(&config.jwt);
    let recaptcha = RecaptchaVerifier::new(config.recaptcha.secret_key.clone())?;

    let chat_rate_limiter = create_ip_rate_limiter(config.rate_limit.chat_per_minute, 60);
    let contact_rate_limiter = create_ip_rate_limiter(config.rate_limit.contact_per_hour, 3600);
    let login_rate_limiter = create_ip_rate_limiter(config.rate_limit.login_per_minute, 60);

    Ok(AppState {
        config: Arc::new(config),
        stores,
        chat,
        notifier,
        jwt,
        recaptcha,
        chat_rate_limiter,
        contact_rate_limiter,
        login_rate_limiter,
    })
}

async fn open_stores(config: &SiteConfig) -> Result<Stores, AppError> {
    match config.store.backend {
        StoreBackend::Mongo => {
            let db = MongoStore::connect(&config.store.mongodb.uri, &config.store.mongodb.database)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to connect to MongoDB");
                    e
                })?;
            db.initialize_indexes().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to initialize database indexes");
                e
            })?;
            Ok(Stores::from_backend(Arc::new(db)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Stores::from_backend(Arc::new(MemoryStore::new())))
        }
    }
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    state: AppState,
}

impl Application {
    pub async fn build(config: SiteConfig) -> Result<Self, AppError> {
        let stores = open_stores(&config).await?;

        seed::seed_content(stores.content.as_ref(), &config.company).await?;
        seed::ensure_admin(stores.admins.as_ref(), &config.admin).await?;

        let provider = build_provider(&config.llm)?;
        tracing::info!(provider = provider.name(), model = %config.llm.model, "Chat provider initialized");

        let notifier: Arc<dyn Notifier> = Arc::new(SmtpNotifier::new(
            config.smtp.clone(),
            config.company.clone(),
        )?);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let state = build_state(config, stores, provider, notifier)?;
        let router = build_router(state.clone());

        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(address = %addr, error = %e, "Failed to bind TCP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn run_until_stopped<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(port = self.port, "Listening");
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
    }
}
