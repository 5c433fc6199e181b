use super::errors::DatabaseError;
use super::types::{ContactUpdate, UserLink};
use async_trait::async_trait;

mod memory;
mod user;

pub use memory::InMemoryUserDirectory;
pub use user::PostgrestUserDirectory;

/// Phone number to chat identity lookup.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Exact match on the normalized phone number.
    async fn find_by_phone(&self, phone: &str) -> Result<Option<UserLink>, DatabaseError>;

    /// Creates the link on first contact, merges into it afterwards.
    async fn save_or_update(&self, update: ContactUpdate) -> Result<UserLink, DatabaseError>;
}
