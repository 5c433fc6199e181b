use super::types::{SharedContact, ViberEvent, ViberUser};
use super::webhook_validation::{validate_viber_signature, SIGNATURE_HEADER};
use crate::communication::{NotificationChannel, CONNECTED_MESSAGE};
use crate::core::http_server::AppState;
use crate::database::{ContactUpdate, UserLink};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::{error, info, warn};

const DEFAULT_CONTACT_NAME: &str = "Client";
const ORDER_CONTEXT_PREFIX: &str = "ORD-";

pub async fn viber_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !validate_viber_signature(signature, &body, state.viber.auth_token()) {
        warn!("Rejected Viber callback with invalid signature");
        return StatusCode::FORBIDDEN.into_response();
    }

    let event: ViberEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Ignoring unparseable Viber callback");
            return StatusCode::OK.into_response();
        }
    };

    match event {
        ViberEvent::ConversationStarted { user, context } => {
            if let Some(context) = context
                .as_deref()
                .filter(|c| c.starts_with(ORDER_CONTEXT_PREFIX))
            {
                info!(user_id = %user.id, context = %context, "Viber deep link");
            }
            // conversation_started must be answered inline, sending is not allowed yet
            Json(state.viber.welcome_message()).into_response()
        }
        ViberEvent::Message { sender, message } => {
            if let Some(contact) = message.shared_contact() {
                register_contact(&state, &sender, contact).await;
            }
            StatusCode::OK.into_response()
        }
        ViberEvent::Other => StatusCode::OK.into_response(),
    }
}

async fn register_contact(
    state: &AppState,
    sender: &ViberUser,
    contact: &SharedContact,
) -> Option<UserLink> {
    let name = [contact.name.as_deref(), sender.name.as_deref()]
        .into_iter()
        .flatten()
        .find(|name| !name.trim().is_empty())
        .unwrap_or(DEFAULT_CONTACT_NAME);
    let update = ContactUpdate::viber(&contact.phone_number, name, &sender.id);
    info!(phone = %update.phone_number, "Captured Viber contact");

    match state.directory.save_or_update(update).await {
        Ok(link) => {
            state.viber.send(&sender.id, CONNECTED_MESSAGE).await;
            Some(link)
        }
        Err(e) => {
            error!(user_id = %sender.id, error = %e, "Failed to register Viber contact");
            None
        }
    }
}
