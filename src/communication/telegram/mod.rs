use super::{NotificationChannel, Platform};
use crate::configuration::TelegramConfig;
use async_trait::async_trait;
use std::time::Duration;
use teloxide::payloads::SendMessageSetters;
use teloxide::requests::Requester;
use teloxide::types::{ButtonRequest, ChatId, KeyboardButton, KeyboardMarkup, ParseMode, Recipient};
use teloxide::Bot;
use thiserror::Error;
use tracing::{error, info};

pub mod webhook;

const WELCOME_TEXT: &str = "👋 Welcome! Please share your number so we can link your orders.";
const SHARE_PHONE_BUTTON: &str = "📱 Share Phone Number";

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Invalid Telegram API url: {0}")]
    InvalidApiUrl(String),
    #[error("Error building HTTP client: {0}")]
    ClientError(String),
}

pub struct TelegramChannel {
    bot: Bot,
}

impl TelegramChannel {
    pub fn new(bot_token: &str, config: &TelegramConfig) -> Result<Self, TelegramError> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TelegramError::ClientError(e.to_string()))?;
        let api_url = reqwest::Url::parse(&config.api_url)
            .map_err(|e| TelegramError::InvalidApiUrl(e.to_string()))?;

        let bot = Bot::with_client(bot_token, client).set_api_url(api_url);
        Ok(Self { bot })
    }

    /// Asks the user to share their phone number through a contact-request keyboard.
    pub async fn send_welcome_button(&self, chat_id: i64) -> bool {
        let keyboard = KeyboardMarkup::new(vec![vec![
            KeyboardButton::new(SHARE_PHONE_BUTTON).request(ButtonRequest::Contact)
        ]]);

        match self
            .bot
            .send_message(ChatId(chat_id), WELCOME_TEXT)
            .reply_markup(keyboard)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                error!(chat_id = %chat_id, error = %e, "Failed to send Telegram welcome button");
                false
            }
        }
    }
}

// Chat ids are numeric, anything else is treated as a channel username
fn recipient(identity: &str) -> Recipient {
    match identity.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(identity.to_string()),
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    async fn send(&self, identity: &str, message: &str) -> bool {
        #[allow(deprecated)]
        let request = self
            .bot
            .send_message(recipient(identity), message)
            .parse_mode(ParseMode::Markdown);

        match request.await {
            Ok(_) => {
                info!(identity = %identity, platform = self.platform_name(), "Sent Telegram message");
                true
            }
            Err(e) => {
                error!(identity = %identity, platform = self.platform_name(), error = %e, "Telegram send failed");
                false
            }
        }
    }

    fn platform_name(&self) -> &'static str {
        Platform::Telegram.name()
    }
}
