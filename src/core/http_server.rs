use crate::communication::telegram::webhook::telegram_webhook;
use crate::communication::trigger::trigger_notification;
use crate::communication::viber::webhook::viber_webhook;
use crate::communication::{TelegramChannel, ViberChannel};
use crate::configuration::{Context, DirectoryBackend};
use crate::core::service_manager::{Error as ServiceManagerError, Service};
use crate::database::{InMemoryUserDirectory, PostgrestUserDirectory, UserDirectory};
use crate::notification::NotificationService;
use async_trait::async_trait;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub notifier: Arc<NotificationService>,
    pub directory: Arc<dyn UserDirectory>,
    pub telegram: Arc<TelegramChannel>,
    pub viber: Arc<ViberChannel>,
    pub internal_api_key: String,
}

impl AppState {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        telegram: Arc<TelegramChannel>,
        viber: Arc<ViberChannel>,
        internal_api_key: &str,
    ) -> Self {
        let notifier = NotificationService::new(directory.clone(), telegram.clone(), viber.clone());
        Self {
            notifier: Arc::new(notifier),
            directory,
            telegram,
            viber,
            internal_api_key: internal_api_key.to_string(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/trigger-notification", post(trigger_notification))
        .route("/webhook/telegram", post(telegram_webhook))
        .route("/webhook/viber", post(viber_webhook))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// HTTP front of the notifier: trigger endpoint plus both contact-capture webhooks.
pub struct NotifierService {
    port: u16,
    state: AppState,
}

#[async_trait]
impl Service for NotifierService {
    type Context = Context;

    async fn new(context: Context) -> Result<Self, ServiceManagerError> {
        let directory: Arc<dyn UserDirectory> = match context.config.directory.backend {
            DirectoryBackend::Memory => {
                warn!("Using in-memory user directory, links are lost on restart");
                Arc::new(InMemoryUserDirectory::new())
            }
            DirectoryBackend::Postgrest => {
                Arc::new(PostgrestUserDirectory::from_env().map_err(ServiceManagerError::from)?)
            }
        };

        let telegram = TelegramChannel::new(
            &context.secrets.telegram_bot_token,
            &context.config.telegram,
        )
        .map_err(ServiceManagerError::from)?;
        let viber = ViberChannel::new(&context.secrets.viber_auth_token, &context.config.viber)
            .map_err(ServiceManagerError::from)?;

        Ok(Self {
            port: context.config.server.port,
            state: AppState::new(
                directory,
                Arc::new(telegram),
                Arc::new(viber),
                &context.secrets.internal_api_key,
            ),
        })
    }

    async fn run(self) -> Result<(), ServiceManagerError> {
        let app = router(self.state);

        let listener = TcpListener::bind(format!("0.0.0.0:{}", self.port))
            .await
            .map_err(|e| ServiceManagerError::new(&format!("Failed to bind port: {}", e)))?;

        info!("Notifier HTTP server running on port {}", self.port);

        axum::serve(listener, app)
            .await
            .map_err(|e| ServiceManagerError::new(&format!("HTTP server error: {}", e)))
    }
}
