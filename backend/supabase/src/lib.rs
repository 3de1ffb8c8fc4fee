//! Supabase REST client: GoTrue auth, PostgREST tables, storage objects.
//!
//! Every request carries the project `apikey` header plus a bearer token,
//! the signed-in user's access token when there is one and the anon key
//! otherwise.

pub mod auth;
pub mod storage;
pub mod tables;

use reqwest::{Client, RequestBuilder};

pub use auth::{MetadataUpdate, SignUpOutcome, UserUpdate};
pub use storage::StoredImage;
pub use tables::{ProfileRow, SavedPlant, SCANS_PER_PAGE};

/// Shared client for all Supabase services of one project.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl SupabaseClient {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }

    pub(crate) fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
    }

    pub(crate) fn auth_endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    pub(crate) fn table_endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    pub(crate) fn storage_endpoint(&self, path: &str) -> String {
        format!("{}/storage/v1/{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = SupabaseClient::new("https://proj.supabase.co/", "anon");
        assert_eq!(
            client.auth_endpoint("/signup"),
            "https://proj.supabase.co/auth/v1/signup"
        );
        assert_eq!(
            client.table_endpoint("plant_scans"),
            "https://proj.supabase.co/rest/v1/plant_scans"
        );
    }

    #[test]
    fn bearer_prefers_access_token() {
        let mut client = SupabaseClient::new("https://proj.supabase.co", "anon");
        assert_eq!(client.bearer(), "anon");
        client.set_access_token(Some("user-jwt".to_string()));
        assert_eq!(client.bearer(), "user-jwt");
        assert!(client.is_authenticated());
    }
}
