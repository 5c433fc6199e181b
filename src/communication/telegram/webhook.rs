use crate::communication::{NotificationChannel, CONNECTED_MESSAGE};
use crate::core::http_server::AppState;
use crate::database::{ContactUpdate, UserLink};
use axum::{body::Bytes, extract::State, http::StatusCode};
use teloxide::types::{Message, Update, UpdateKind};
use tracing::{error, info, warn};

const DEFAULT_CONTACT_NAME: &str = "Client";

// Telegram retries deliveries that are not acknowledged, so every update gets a 200
pub async fn telegram_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "Ignoring unparseable Telegram update");
            return (StatusCode::OK, "OK");
        }
    };

    if let UpdateKind::Message(msg) = update.kind {
        handle_message(&state, &msg).await;
    }

    (StatusCode::OK, "OK")
}

async fn handle_message(state: &AppState, msg: &Message) {
    let chat_id = msg.chat.id.0;

    if let Some(text) = msg.text() {
        if text.starts_with("/start") {
            if let Some(context) = start_context(text) {
                info!(chat_id = %chat_id, context = %context, "Telegram deep link");
            }
            state.telegram.send_welcome_button(chat_id).await;
        }
    } else if let Some(contact) = msg.contact() {
        let name = if contact.first_name.trim().is_empty() {
            DEFAULT_CONTACT_NAME
        } else {
            contact.first_name.as_str()
        };
        register_contact(state, chat_id, &contact.phone_number, name).await;
    }
}

/// Deep-link payload of `/start ORD-123`.
pub fn start_context(text: &str) -> Option<&str> {
    let mut args = text.split_whitespace();
    match args.next() {
        Some(command) if command.starts_with("/start") => args.next(),
        _ => None,
    }
}

pub async fn register_contact(
    state: &AppState,
    chat_id: i64,
    phone: &str,
    name: &str,
) -> Option<UserLink> {
    let identity = chat_id.to_string();
    let update = ContactUpdate::telegram(phone, name, &identity);
    info!(phone = %update.phone_number, "Captured Telegram contact");

    match state.directory.save_or_update(update).await {
        Ok(link) => {
            state.telegram.send(&identity, CONNECTED_MESSAGE).await;
            Some(link)
        }
        Err(e) => {
            error!(chat_id = %chat_id, error = %e, "Failed to register Telegram contact");
            None
        }
    }
}
