use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer's phone number together with every chat identity captured for it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserLink {
    pub phone_number: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viber_id: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Contact details shared from one platform. Identities left as `None` are
/// untouched when merged into an existing link.
#[derive(Debug, Clone, Default)]
pub struct ContactUpdate {
    pub phone_number: String,
    pub display_name: String,
    pub telegram_id: Option<String>,
    pub viber_id: Option<String>,
}

impl ContactUpdate {
    pub fn telegram(phone: &str, name: &str, chat_id: &str) -> Self {
        Self {
            phone_number: normalize_phone(phone),
            display_name: name.to_string(),
            telegram_id: Some(chat_id.to_string()),
            viber_id: None,
        }
    }

    pub fn viber(phone: &str, name: &str, user_id: &str) -> Self {
        Self {
            phone_number: normalize_phone(phone),
            display_name: name.to_string(),
            telegram_id: None,
            viber_id: Some(user_id.to_string()),
        }
    }
}

impl UserLink {
    pub fn from_contact(update: ContactUpdate) -> Self {
        let now = Utc::now();
        Self {
            phone_number: update.phone_number,
            display_name: update.display_name,
            telegram_id: non_empty(update.telegram_id),
            viber_id: non_empty(update.viber_id),
            created_at: now,
            updated_at: now,
        }
    }

    /// Name is last-write-wins, identities are only replaced by a new non-empty value.
    pub fn merge(self, update: ContactUpdate) -> Self {
        Self {
            phone_number: self.phone_number,
            display_name: update.display_name,
            telegram_id: non_empty(update.telegram_id).or(self.telegram_id),
            viber_id: non_empty(update.viber_id).or(self.viber_id),
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }
}

fn non_empty(identity: Option<String>) -> Option<String> {
    identity.filter(|id| !id.is_empty())
}

// Telegram sometimes sends numbers without the leading '+'
pub fn normalize_phone(phone: &str) -> String {
    let phone = phone.trim();
    if phone.starts_with('+') {
        phone.to_string()
    } else {
        format!("+{}", phone)
    }
}
