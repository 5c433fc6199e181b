use super::{DatabaseError, UserDirectory};
use crate::database::types::{ContactUpdate, UserLink};
use async_trait::async_trait;
use postgrest::Postgrest;
use std::env;
use tracing::{error, info};

const USERS_TABLE: &str = "users";

/// Directory backed by the Supabase `users` table.
pub struct PostgrestUserDirectory {
    client: Postgrest,
}

impl PostgrestUserDirectory {
    pub fn new(url: &str, service_key: &str) -> Self {
        let rest_url = format!("{}/rest/v1", url.trim_end_matches('/'));
        let client = Postgrest::new(&rest_url)
            .insert_header("apikey", service_key)
            .insert_header("Authorization", format!("Bearer {}", service_key));

        Self { client }
    }

    pub fn from_env() -> Result<Self, DatabaseError> {
        let url = env::var("SUPABASE_URL")
            .map_err(|_| DatabaseError::ConnectionError("SUPABASE_URL not found".to_string()))?;
        let service_key = env::var("SUPABASE_KEY")
            .map_err(|_| DatabaseError::ConnectionError("SUPABASE_KEY not found".to_string()))?;

        Ok(Self::new(&url, &service_key))
    }
}

#[async_trait]
impl UserDirectory for PostgrestUserDirectory {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<UserLink>, DatabaseError> {
        let response = self
            .client
            .from(USERS_TABLE)
            .select("*")
            .eq("phone_number", phone)
            .single()
            .execute()
            .await
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        if response.status() == 406 {
            // No rows found
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "User lookup failed");
            return Err(DatabaseError::QueryError(format!(
                "Lookup failed with status {}: {}",
                status, error_text
            )));
        }

        let user: UserLink = response
            .json()
            .await
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        Ok(Some(user))
    }

    async fn save_or_update(&self, update: ContactUpdate) -> Result<UserLink, DatabaseError> {
        let link = match self.find_by_phone(&update.phone_number).await? {
            Some(existing) => existing.merge(update),
            None => UserLink::from_contact(update),
        };

        let body =
            serde_json::to_string(&link).map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        let response = self
            .client
            .from(USERS_TABLE)
            .upsert(body)
            .on_conflict("phone_number")
            .execute()
            .await
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(phone = %link.phone_number, error = %error_text, "Saving user failed");
            return Err(DatabaseError::QueryError(format!(
                "Upsert failed: {}",
                error_text
            )));
        }

        info!(phone = %link.phone_number, "User link saved");
        Ok(link)
    }
}
