use crate::communication::{NotificationChannel, Platform};
use crate::database::{DatabaseError, UserDirectory};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

mod types;

pub use types::{
    compose_order_ready_message, DispatchOutcome, NotificationRequest, UNKNOWN_ORDER_ID,
};

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Directory lookup failed: {0}")]
    DirectoryError(#[from] DatabaseError),
}

/// Delivers order-ready notifications, Telegram first and Viber as fallback.
pub struct NotificationService {
    directory: Arc<dyn UserDirectory>,
    telegram: Arc<dyn NotificationChannel>,
    viber: Arc<dyn NotificationChannel>,
}

impl NotificationService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        telegram: Arc<dyn NotificationChannel>,
        viber: Arc<dyn NotificationChannel>,
    ) -> Self {
        Self {
            directory,
            telegram,
            viber,
        }
    }

    pub async fn dispatch_request(
        &self,
        request: &NotificationRequest,
    ) -> Result<DispatchOutcome, NotificationError> {
        self.dispatch(&request.phone, &request.order_id, &request.items)
            .await
    }

    /// Tries each linked channel once, in priority order, stopping at the first
    /// accepted send. A channel without an identity is skipped without an attempt.
    pub async fn dispatch(
        &self,
        phone: &str,
        order_id: &str,
        items: &[String],
    ) -> Result<DispatchOutcome, NotificationError> {
        let Some(user) = self.directory.find_by_phone(phone).await? else {
            info!(phone = %phone, "No user linked to phone");
            return Ok(DispatchOutcome::UserNotFound);
        };

        let message = compose_order_ready_message(order_id, items);

        let attempts = [
            (Platform::Telegram, user.telegram_id.as_deref(), &self.telegram),
            (Platform::Viber, user.viber_id.as_deref(), &self.viber),
        ];

        for (platform, identity, channel) in attempts {
            // Rows written by other tools may carry "" instead of null
            let Some(identity) = identity.filter(|id| !id.is_empty()) else {
                continue;
            };

            info!(
                platform = channel.platform_name(),
                user = %user.display_name,
                order_id = %order_id,
                "Sending order notification"
            );
            if channel.send(identity, &message).await {
                return Ok(DispatchOutcome::SentVia(platform));
            }
            warn!(platform = channel.platform_name(), phone = %phone, "Channel did not accept notification");
        }

        Ok(DispatchOutcome::NoActiveChannel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{ContactUpdate, InMemoryUserDirectory, UserLink};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingChannel {
        name: &'static str,
        accepts: bool,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl RecordingChannel {
        fn new(name: &'static str, accepts: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                accepts,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationChannel for RecordingChannel {
        async fn send(&self, identity: &str, message: &str) -> bool {
            self.calls
                .lock()
                .unwrap()
                .push((identity.to_string(), message.to_string()));
            self.accepts
        }

        fn platform_name(&self) -> &'static str {
            self.name
        }
    }

    struct FailingDirectory;

    #[async_trait]
    impl UserDirectory for FailingDirectory {
        async fn find_by_phone(&self, _phone: &str) -> Result<Option<UserLink>, DatabaseError> {
            Err(DatabaseError::ConnectionError("unreachable".to_string()))
        }

        async fn save_or_update(&self, _update: ContactUpdate) -> Result<UserLink, DatabaseError> {
            Err(DatabaseError::ConnectionError("unreachable".to_string()))
        }
    }

    fn user(telegram_id: Option<&str>, viber_id: Option<&str>) -> UserLink {
        UserLink::from_contact(ContactUpdate {
            phone_number: "+1234567890".to_string(),
            display_name: "Test User".to_string(),
            telegram_id: telegram_id.map(str::to_string),
            viber_id: viber_id.map(str::to_string),
        })
    }

    // Row as read back from the database, bypassing contact normalization
    fn stored_row(telegram_id: &str, viber_id: &str) -> UserLink {
        serde_json::from_value(serde_json::json!({
            "phone_number": "+1234567890",
            "name": "Test User",
            "telegram_id": telegram_id,
            "viber_id": viber_id,
        }))
        .unwrap()
    }

    fn service(
        users: Vec<UserLink>,
        telegram: &Arc<RecordingChannel>,
        viber: &Arc<RecordingChannel>,
    ) -> NotificationService {
        NotificationService::new(
            Arc::new(InMemoryUserDirectory::with_users(users)),
            telegram.clone(),
            viber.clone(),
        )
    }

    fn items() -> Vec<String> {
        vec!["Item".to_string()]
    }

    #[tokio::test]
    async fn test_user_not_found() {
        let telegram = RecordingChannel::new("telegram", true);
        let viber = RecordingChannel::new("viber", true);
        let service = service(vec![], &telegram, &viber);

        let result = service.dispatch("+000", "ORD", &[]).await.unwrap();

        assert_eq!(result, DispatchOutcome::UserNotFound);
        assert!(telegram.calls().is_empty());
        assert!(viber.calls().is_empty());
    }

    #[tokio::test]
    async fn test_uses_telegram_first_if_user_has_both() {
        let telegram = RecordingChannel::new("telegram", true);
        let viber = RecordingChannel::new("viber", true);
        let service = service(vec![user(Some("tg_999"), Some("viber_123"))], &telegram, &viber);

        let result = service
            .dispatch("+1234567890", "ORD-1", &items())
            .await
            .unwrap();

        assert_eq!(result, DispatchOutcome::SentVia(Platform::Telegram));
        assert_eq!(result.to_string(), "Sent via Telegram");
        let calls = telegram.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "tg_999");
        assert!(calls[0].1.contains("ORD-1"));
        assert!(viber.calls().is_empty());
    }

    #[tokio::test]
    async fn test_viber_only_user_skips_telegram() {
        let telegram = RecordingChannel::new("telegram", true);
        let viber = RecordingChannel::new("viber", true);
        let service = service(vec![user(None, Some("vib_1"))], &telegram, &viber);

        let result = service
            .dispatch("+1234567890", "ORD-1", &items())
            .await
            .unwrap();

        assert_eq!(result, DispatchOutcome::SentVia(Platform::Viber));
        assert!(telegram.calls().is_empty());
        assert_eq!(viber.calls().len(), 1);
        assert_eq!(viber.calls()[0].0, "vib_1");
    }

    #[tokio::test]
    async fn test_falls_back_to_viber_if_telegram_fails() {
        let telegram = RecordingChannel::new("telegram", false);
        let viber = RecordingChannel::new("viber", true);
        let service = service(vec![user(Some("tg_999"), Some("viber_123"))], &telegram, &viber);

        let result = service
            .dispatch("+1234567890", "ORD-1", &items())
            .await
            .unwrap();

        assert_eq!(result, DispatchOutcome::SentVia(Platform::Viber));
        assert_eq!(telegram.calls().len(), 1);
        assert_eq!(viber.calls().len(), 1);
        assert_eq!(telegram.calls()[0].1, viber.calls()[0].1);
    }

    #[tokio::test]
    async fn test_user_without_identities() {
        let telegram = RecordingChannel::new("telegram", true);
        let viber = RecordingChannel::new("viber", true);
        let service = service(vec![user(None, None)], &telegram, &viber);

        let result = service
            .dispatch("+1234567890", "ORD-1", &items())
            .await
            .unwrap();

        assert_eq!(result, DispatchOutcome::NoActiveChannel);
        assert!(telegram.calls().is_empty());
        assert!(viber.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_telegram_identity_is_skipped() {
        let telegram = RecordingChannel::new("telegram", false);
        let viber = RecordingChannel::new("viber", true);
        let service = service(vec![stored_row("", "vib_1")], &telegram, &viber);

        let result = service
            .dispatch("+1234567890", "ORD-1", &items())
            .await
            .unwrap();

        assert_eq!(result, DispatchOutcome::SentVia(Platform::Viber));
        assert!(telegram.calls().is_empty());
        assert_eq!(viber.calls()[0].0, "vib_1");
    }

    #[tokio::test]
    async fn test_empty_identities_mean_no_active_channel() {
        let telegram = RecordingChannel::new("telegram", true);
        let viber = RecordingChannel::new("viber", true);
        let service = service(vec![stored_row("", "")], &telegram, &viber);

        let result = service
            .dispatch("+1234567890", "ORD-1", &items())
            .await
            .unwrap();

        assert_eq!(result, DispatchOutcome::NoActiveChannel);
        assert!(telegram.calls().is_empty());
        assert!(viber.calls().is_empty());
    }

    #[tokio::test]
    async fn test_all_channels_fail() {
        let telegram = RecordingChannel::new("telegram", false);
        let viber = RecordingChannel::new("viber", false);
        let service = service(vec![user(Some("tg_999"), Some("viber_123"))], &telegram, &viber);

        let result = service
            .dispatch("+1234567890", "ORD-1", &items())
            .await
            .unwrap();

        assert_eq!(result, DispatchOutcome::NoActiveChannel);
        assert_eq!(telegram.calls().len(), 1);
        assert_eq!(viber.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_telegram_only_user_failing_gets_no_fallback() {
        let telegram = RecordingChannel::new("telegram", false);
        let viber = RecordingChannel::new("viber", true);
        let service = service(vec![user(Some("tg_999"), None)], &telegram, &viber);

        let result = service
            .dispatch("+1234567890", "ORD-1", &items())
            .await
            .unwrap();

        assert_eq!(result, DispatchOutcome::NoActiveChannel);
        assert!(viber.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_is_repeatable() {
        let telegram = RecordingChannel::new("telegram", false);
        let viber = RecordingChannel::new("viber", true);
        let service = service(vec![user(Some("tg_999"), Some("viber_123"))], &telegram, &viber);

        let first = service.dispatch("+1234567890", "ORD-1", &items()).await.unwrap();
        let second = service.dispatch("+1234567890", "ORD-1", &items()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(telegram.calls().len(), 2);
        assert_eq!(viber.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_items_are_sent() {
        let telegram = RecordingChannel::new("telegram", true);
        let viber = RecordingChannel::new("viber", true);
        let service = service(vec![user(Some("tg_999"), None)], &telegram, &viber);

        let request = NotificationRequest::new("+1234567890", None, vec![]);
        let result = service.dispatch_request(&request).await.unwrap();

        assert_eq!(result, DispatchOutcome::SentVia(Platform::Telegram));
        let message = &telegram.calls()[0].1;
        assert!(message.contains("Order #Unknown"));
        assert!(message.contains("Items: \n"));
    }

    #[tokio::test]
    async fn test_directory_failure_propagates() {
        let telegram = RecordingChannel::new("telegram", true);
        let viber = RecordingChannel::new("viber", true);
        let service = NotificationService::new(Arc::new(FailingDirectory), telegram.clone(), viber.clone());

        let result = service.dispatch("+1234567890", "ORD-1", &items()).await;

        assert!(matches!(result, Err(NotificationError::DirectoryError(_))));
        assert!(telegram.calls().is_empty());
    }
}
