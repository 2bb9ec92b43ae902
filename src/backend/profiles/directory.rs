/**
 * Profile Directory
 *
 * Read-only access to the `profiles` table of the Persistent Store, used by
 * the relay to title notifications when the sending client did not include a
 * display name.
 *
 * The store is a Supabase project; rows are read over its PostgREST API:
 *
 * ```http
 * GET /rest/v1/profiles?id=eq.<user_id>&select=name,email HTTP/1.1
 * apikey: <anon key>
 * Authorization: Bearer <anon key>
 * ```
 */

use async_trait::async_trait;
use serde::Deserialize;

use crate::backend::error::BackendError;
use crate::backend::server::config::SupabaseSettings;

/// The profile columns the relay cares about
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
pub struct ProfileSummary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl ProfileSummary {
    /// Profile name, else the local part of the email address
    pub fn display_name(&self) -> Option<String> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        let email_local = self
            .email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .map(str::trim)
            .filter(|local| !local.is_empty());

        name.or(email_local).map(str::to_string)
    }
}

#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn lookup(&self, user_id: &str) -> Result<Option<ProfileSummary>, BackendError>;
}

/// PostgREST-backed directory
#[derive(Debug, Clone)]
pub struct RestProfileDirectory {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestProfileDirectory {
    pub fn new(settings: &SupabaseSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: settings.url.trim_end_matches('/').to_string(),
            api_key: settings.anon_key.clone(),
        }
    }
}

#[async_trait]
impl ProfileDirectory for RestProfileDirectory {
    async fn lookup(&self, user_id: &str) -> Result<Option<ProfileSummary>, BackendError> {
        let url = format!("{}/rest/v1/profiles", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("id", format!("eq.{}", user_id)), ("select", "name,email".to_string())])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| BackendError::upstream("profiles", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::upstream(
                "profiles",
                format!("status {}", status.as_u16()),
            ));
        }

        let rows: Vec<ProfileSummary> = response
            .json()
            .await
            .map_err(|e| BackendError::upstream("profiles", e.to_string()))?;
        Ok(rows.into_iter().next())
    }
}
