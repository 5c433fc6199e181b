use crate::core::http_server::AppState;
use crate::notification::NotificationRequest;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

pub const API_KEY_HEADER: &str = "X-Internal-API-Key";

#[derive(Debug, Deserialize)]
struct TriggerPayload {
    phone: String,
    #[serde(default)]
    order_id: Option<Value>,
    #[serde(default)]
    items: Option<Vec<String>>,
}

#[derive(Debug, PartialEq)]
pub enum PayloadError {
    MissingPhone,
    Invalid(String),
}

// Expects: { "phone": "+123...", "order_id": "123", "items": ["A", "B"] }
pub fn parse_trigger_payload(body: &[u8]) -> Result<NotificationRequest, PayloadError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| PayloadError::MissingPhone)?;
    if !value.get("phone").is_some_and(Value::is_string) {
        return Err(PayloadError::MissingPhone);
    }

    let payload: TriggerPayload =
        serde_json::from_value(value).map_err(|e| PayloadError::Invalid(e.to_string()))?;

    let order_id = match payload.order_id {
        None | Some(Value::Null) => None,
        Some(Value::String(order_id)) => Some(order_id),
        Some(other) => Some(other.to_string()),
    };

    Ok(NotificationRequest::new(
        &payload.phone,
        order_id,
        payload.items.unwrap_or_default(),
    ))
}

pub async fn trigger_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let key = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    if key != Some(state.internal_api_key.as_str()) {
        warn!("Rejected trigger request with bad API key");
        return (StatusCode::FORBIDDEN, "Unauthorized").into_response();
    }

    let request = match parse_trigger_payload(&body) {
        Ok(request) => request,
        Err(PayloadError::MissingPhone) => {
            return (StatusCode::BAD_REQUEST, "Missing 'phone' in payload").into_response()
        }
        Err(PayloadError::Invalid(e)) => {
            return (StatusCode::BAD_REQUEST, format!("Invalid payload: {}", e)).into_response()
        }
    };

    let request_id = Uuid::new_v4();
    match state.notifier.dispatch_request(&request).await {
        Ok(outcome) => {
            info!(request_id = %request_id, phone = %request.phone, result = %outcome, "Trigger Result");
            (StatusCode::OK, Json(json!({ "status": outcome.to_string() }))).into_response()
        }
        Err(e) => {
            error!(request_id = %request_id, phone = %request.phone, error = %e, "Trigger failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "System error" })),
            )
                .into_response()
        }
    }
}
