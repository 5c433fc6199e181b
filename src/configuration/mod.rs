use serde::Deserialize;
use std::{env, fmt, fs};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File read error")]
    FileError,

    #[error("Deserialization error:{0}")]
    DeserializationError(String),

    #[error("Environment variable {0} not set")]
    MissingEnv(String),
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub viber: ViberConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViberConfig {
    #[serde(default = "default_viber_api_url")]
    pub api_url: String,
    #[serde(default = "default_viber_bot_name")]
    pub bot_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryBackend {
    #[default]
    Memory,
    Postgrest,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub backend: DirectoryBackend,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_viber_api_url() -> String {
    "https://chatapi.viber.com/pa".to_string()
}

fn default_viber_bot_name() -> String {
    "OmniShopBot".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 5000 }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: default_telegram_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ViberConfig {
    fn default() -> Self {
        Self {
            api_url: default_viber_api_url(),
            bot_name: default_viber_bot_name(),
            avatar_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Tokens and keys read from the process environment.
#[derive(Clone)]
pub struct Secrets {
    pub telegram_bot_token: String,
    pub viber_auth_token: String,
    pub internal_api_key: String,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("telegram_bot_token", &"<redacted>")
            .field("viber_auth_token", &"<redacted>")
            .field("internal_api_key", &"<redacted>")
            .finish()
    }
}

impl Secrets {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            telegram_bot_token: required_env("TELEGRAM_BOT_TOKEN")?,
            viber_auth_token: required_env("VIBER_AUTH_TOKEN")?,
            internal_api_key: required_env("INTERNAL_API_KEY")?,
        })
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConfigError::MissingEnv(name.to_string()))
}

#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub secrets: Secrets,
}

impl Context {
    pub fn new(config_file: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            config: Config::new(config_file)?,
            secrets: Secrets::from_env()?,
        })
    }
}

impl Config {
    pub fn new(config_file: &str) -> Result<Self, ConfigError> {
        let config_str = fs::read_to_string(config_file).map_err(|_| ConfigError::FileError)?;
        Self::from_json(&config_str)
    }

    pub fn from_json(config_str: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(config_str)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;
        Ok(config)
    }
}
