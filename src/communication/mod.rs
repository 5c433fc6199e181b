use async_trait::async_trait;
use std::fmt;

pub mod telegram;
pub mod trigger;
pub mod viber;

pub use telegram::TelegramChannel;
pub use viber::ViberChannel;

pub const CONNECTED_MESSAGE: &str = "✅ Connected! You will receive updates here.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Telegram,
    Viber,
}

impl Platform {
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Telegram => "telegram",
            Platform::Viber => "viber",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Platform::Telegram => "Telegram",
            Platform::Viber => "Viber",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A messaging platform able to deliver text to one of its own identities.
///
/// `send` never fails loudly: platform errors, transport errors and timeouts are
/// logged by the implementation and reported as `false`.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, identity: &str, message: &str) -> bool;

    /// Stable identifier used in logs.
    fn platform_name(&self) -> &'static str;
}
