use crate::communication::Platform;
use std::fmt;

pub const UNKNOWN_ORDER_ID: &str = "Unknown";

/// One order-ready notification for one phone number.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub phone: String,
    pub order_id: String,
    pub items: Vec<String>,
}

impl NotificationRequest {
    pub fn new(phone: &str, order_id: Option<String>, items: Vec<String>) -> Self {
        Self {
            phone: phone.to_string(),
            order_id: order_id.unwrap_or_else(|| UNKNOWN_ORDER_ID.to_string()),
            items,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    SentVia(Platform),
    UserNotFound,
    NoActiveChannel,
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::SentVia(platform) => write!(f, "Sent via {}", platform.label()),
            DispatchOutcome::UserNotFound => f.write_str("User not found in database."),
            DispatchOutcome::NoActiveChannel => {
                f.write_str("Failed: User exists but has no active messaging channels.")
            }
        }
    }
}

pub fn compose_order_ready_message(order_id: &str, items: &[String]) -> String {
    format!(
        "📦 *Order #{} Ready!*\nItems: {}\n📍 Come pick it up!",
        order_id,
        items.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_strings() {
        assert_eq!(
            DispatchOutcome::SentVia(Platform::Telegram).to_string(),
            "Sent via Telegram"
        );
        assert_eq!(DispatchOutcome::SentVia(Platform::Viber).to_string(), "Sent via Viber");
        assert_eq!(
            DispatchOutcome::UserNotFound.to_string(),
            "User not found in database."
        );
        assert_eq!(
            DispatchOutcome::NoActiveChannel.to_string(),
            "Failed: User exists but has no active messaging channels."
        );
    }

    #[test]
    fn test_request_defaults_order_id() {
        let request = NotificationRequest::new("+123", None, vec![]);
        assert_eq!(request.order_id, "Unknown");
        assert!(request.items.is_empty());
    }

    #[test]
    fn test_message_embeds_order_and_items() {
        let message =
            compose_order_ready_message("ORD-1", &["Pizza".to_string(), "Cola".to_string()]);
        assert!(message.contains("Order #ORD-1"));
        assert!(message.contains("Items: Pizza, Cola\n"));
    }

    #[test]
    fn test_empty_items_segment() {
        let message = compose_order_ready_message("ORD-1", &[]);
        assert!(message.contains("Items: \n"));
    }
}
