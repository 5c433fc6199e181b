use super::{DatabaseError, UserDirectory};
use crate::database::types::{ContactUpdate, UserLink};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local directory, keyed by normalized phone number.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, UserLink>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = UserLink>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.phone_number.clone(), user))
            .collect();
        Self {
            users: RwLock::new(users),
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<UserLink>, DatabaseError> {
        Ok(self.users.read().await.get(phone).cloned())
    }

    async fn save_or_update(&self, update: ContactUpdate) -> Result<UserLink, DatabaseError> {
        let mut users = self.users.write().await;
        let link = match users.remove(&update.phone_number) {
            Some(existing) => existing.merge(update),
            None => UserLink::from_contact(update),
        };
        users.insert(link.phone_number.clone(), link.clone());
        Ok(link)
    }
}
