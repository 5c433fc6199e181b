use dotenvy::dotenv;
use omnibot::configuration::Context;
use omnibot::core::{NotifierService, ServiceManager};
use omnibot::AppError;
use std::env;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_FILE: &str = "config.json";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    let config_file =
        env::var("OMNIBOT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let context =
        Context::new(&config_file).map_err(|e| AppError::ConfigError(e.to_string()))?;

    let log_level = Level::from_str(&context.config.log_level).unwrap_or(Level::INFO);
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(log_level.to_string()))
        .init();
    tracing::info!("Starting OmniBot notifier");

    let mut service_manager = ServiceManager::new(context);
    service_manager.spawn::<NotifierService>();

    service_manager
        .wait()
        .await
        .map_err(|_| AppError::ServiceError)
}
