use serde::{Deserialize, Serialize};

pub const TEXT_MIN_API_VERSION: u8 = 1;
// share-phone buttons need API level 3
pub const KEYBOARD_MIN_API_VERSION: u8 = 3;

#[derive(Debug, Clone, Serialize)]
pub struct ViberSender {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OutgoingMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    pub min_api_version: u8,
    pub sender: ViberSender,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Keyboard>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Keyboard {
    #[serde(rename = "Type")]
    pub kind: &'static str,
    pub default_height: bool,
    pub buttons: Vec<KeyboardButton>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyboardButton {
    pub action_type: &'static str,
    pub action_body: &'static str,
    pub text: &'static str,
}

/// Body returned by every Viber REST call; `status == 0` means success.
#[derive(Debug, Deserialize)]
pub struct ViberResponse {
    pub status: i64,
    #[serde(default)]
    pub status_message: String,
}

/// Callback events posted to the webhook.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ViberEvent {
    ConversationStarted {
        user: ViberUser,
        #[serde(default)]
        context: Option<String>,
    },
    Message {
        sender: ViberUser,
        message: IncomingMessage,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct ViberUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub contact: Option<SharedContact>,
}

#[derive(Debug, Deserialize)]
pub struct SharedContact {
    #[serde(default)]
    pub name: Option<String>,
    pub phone_number: String,
}

impl IncomingMessage {
    pub fn shared_contact(&self) -> Option<&SharedContact> {
        if self.kind == "contact" {
            self.contact.as_ref()
        } else {
            None
        }
    }
}
