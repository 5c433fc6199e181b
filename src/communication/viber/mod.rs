use super::{NotificationChannel, Platform};
use crate::configuration::ViberConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

mod types;
pub mod webhook;
pub mod webhook_validation;

use types::{
    Keyboard, KeyboardButton, OutgoingMessage, ViberResponse, ViberSender,
    KEYBOARD_MIN_API_VERSION, TEXT_MIN_API_VERSION,
};

const AUTH_TOKEN_HEADER: &str = "X-Viber-Auth-Token";
const WELCOME_TEXT: &str = "👋 Welcome! Please share your number so we can link your orders.";
const SHARE_PHONE_BUTTON: &str = "📱 Share Phone Number";

#[derive(Debug, Error)]
pub enum ViberError {
    #[error("Error building HTTP client: {0}")]
    ClientError(String),
    #[error("Transport error: {0}")]
    TransportError(String),
    #[error("HTTP status {0}")]
    HttpError(u16),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Viber API error {status}: {message}")]
    ApiError { status: i64, message: String },
}

pub struct ViberChannel {
    client: Client,
    api_url: String,
    auth_token: String,
    sender: ViberSender,
}

impl ViberChannel {
    pub fn new(auth_token: &str, config: &ViberConfig) -> Result<Self, ViberError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ViberError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.to_string(),
            sender: ViberSender {
                name: config.bot_name.clone(),
                avatar: config.avatar_url.clone(),
            },
        })
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    /// Reply body for `conversation_started`, asking the user to share their number.
    pub fn welcome_message(&self) -> OutgoingMessage {
        OutgoingMessage {
            receiver: None,
            min_api_version: KEYBOARD_MIN_API_VERSION,
            sender: self.sender.clone(),
            kind: "text",
            text: WELCOME_TEXT.to_string(),
            keyboard: Some(Keyboard {
                kind: "keyboard",
                default_height: false,
                buttons: vec![KeyboardButton {
                    action_type: "share-phone",
                    action_body: "share-phone",
                    text: SHARE_PHONE_BUTTON,
                }],
            }),
        }
    }

    pub async fn send_text(&self, receiver: &str, text: &str) -> Result<(), ViberError> {
        let url = format!("{}/send_message", self.api_url);
        let payload = OutgoingMessage {
            receiver: Some(receiver.to_string()),
            min_api_version: TEXT_MIN_API_VERSION,
            sender: self.sender.clone(),
            kind: "text",
            text: text.to_string(),
            keyboard: None,
        };

        let response = self
            .client
            .post(&url)
            .header(AUTH_TOKEN_HEADER, &self.auth_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ViberError::TransportError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ViberError::HttpError(response.status().as_u16()));
        }

        let body: ViberResponse = response
            .json()
            .await
            .map_err(|e| ViberError::InvalidResponse(e.to_string()))?;

        if body.status != 0 {
            return Err(ViberError::ApiError {
                status: body.status,
                message: body.status_message,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for ViberChannel {
    async fn send(&self, identity: &str, message: &str) -> bool {
        match self.send_text(identity, message).await {
            Ok(()) => {
                info!(identity = %identity, platform = self.platform_name(), "Sent Viber message");
                true
            }
            Err(e) => {
                error!(identity = %identity, platform = self.platform_name(), error = %e, "Viber send failed");
                false
            }
        }
    }

    fn platform_name(&self) -> &'static str {
        Platform::Viber.name()
    }
}
