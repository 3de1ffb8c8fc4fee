//! GoTrue authentication endpoints.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use plantdoc_core::{PlantDocError, Session, UserProfile};

use crate::SupabaseClient;

/// What a signup produced. Projects with email confirmation enabled return
/// a bare user instead of a session.
#[derive(Debug)]
pub enum SignUpOutcome {
    SignedIn(Session),
    ConfirmationRequired,
}

/// Fields accepted by `PUT /auth/v1/user`.
#[derive(Debug, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MetadataUpdate>,
}

#[derive(Debug, Serialize)]
pub struct MetadataUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata<'a>,
}

#[derive(Serialize)]
struct SignUpMetadata<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<&'a str>,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct RecoverRequest<'a> {
    email: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    /// Unix timestamp; newer GoTrue versions include it directly.
    #[serde(default)]
    expires_at: Option<i64>,
    user: WireUser,
}

#[derive(Deserialize)]
struct WireUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<Value>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .unwrap_or_else(|| Utc::now() + Duration::seconds(self.expires_in));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: profile_from_wire(self.user),
        }
    }
}

fn metadata_str(metadata: &Option<Value>, key: &str) -> Option<String> {
    metadata
        .as_ref()
        .and_then(|m| m.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn profile_from_wire(user: WireUser) -> UserProfile {
    let full_name = metadata_str(&user.user_metadata, "full_name");
    let avatar_url = metadata_str(&user.user_metadata, "avatar_url");
    UserProfile {
        id: user.id,
        email: user.email.unwrap_or_default(),
        full_name,
        avatar_url,
        created_at: user.created_at,
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Convert a raw GoTrue message into the wording shown to users.
/// Unrecognized messages pass through unchanged.
pub fn friendly_auth_message(remote: &str) -> String {
    const MAPPINGS: &[(&str, &str)] = &[
        (
            "Invalid login credentials",
            "Invalid email or password. Please check your credentials and try again.",
        ),
        (
            "Email not confirmed",
            "Please confirm your email address before signing in. Check your inbox for the confirmation link.",
        ),
        (
            "Too many requests",
            "Too many login attempts. Please wait a moment and try again.",
        ),
        (
            "User already registered",
            "An account with this email already exists. Please sign in instead.",
        ),
        (
            "Password should be at least",
            "Password must be at least 8 characters long.",
        ),
        ("Invalid email", "Please enter a valid email address."),
        (
            "weak_password",
            "Password is too weak. Please choose a stronger password.",
        ),
    ];

    for (needle, friendly) in MAPPINGS {
        if remote.contains(needle) {
            return friendly.to_string();
        }
    }
    remote.to_string()
}

/// GoTrue error bodies are not uniform across versions; try the known
/// message keys before falling back to the raw body.
fn remote_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(v) => ["error_description", "msg", "message", "error"]
            .iter()
            .find_map(|key| v.get(key).and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}

fn auth_error(body: &str) -> PlantDocError {
    PlantDocError::AuthError(friendly_auth_message(&remote_message(body)))
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

impl SupabaseClient {
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<SignUpOutcome> {
        let body = SignUpRequest {
            email,
            password,
            data: SignUpMetadata { full_name },
        };
        let response = self
            .authed(self.http.post(self.auth_endpoint("/signup")))
            .json(&body)
            .send()
            .await
            .context("signup request failed")?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(auth_error(&text).into());
        }

        let value: Value =
            serde_json::from_str(&text).context("unexpected signup response body")?;
        if value.get("access_token").is_some() {
            let token: TokenResponse =
                serde_json::from_value(value).context("malformed signup session")?;
            info!("[Auth] Signed up and signed in {}", email);
            Ok(SignUpOutcome::SignedIn(token.into_session()))
        } else {
            info!("[Auth] Signup for {} awaits email confirmation", email);
            Ok(SignUpOutcome::ConfirmationRequired)
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}?grant_type=password", self.auth_endpoint("/token"));
        let response = self
            .authed(self.http.post(url))
            .json(&PasswordGrant { email, password })
            .send()
            .await
            .context("sign-in request failed")?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(auth_error(&text).into());
        }

        let token: TokenResponse =
            serde_json::from_str(&text).context("malformed sign-in response")?;
        info!("[Auth] Signed in {}", email);
        Ok(token.into_session())
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        let url = format!("{}?grant_type=refresh_token", self.auth_endpoint("/token"));
        let response = self
            .authed(self.http.post(url))
            .json(&RefreshGrant { refresh_token })
            .send()
            .await
            .context("session refresh request failed")?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(auth_error(&text).into());
        }

        let token: TokenResponse =
            serde_json::from_str(&text).context("malformed refresh response")?;
        Ok(token.into_session())
    }

    /// Revoke the current access token server-side.
    pub async fn sign_out(&self) -> Result<()> {
        let response = self
            .authed(self.http.post(self.auth_endpoint("/logout")))
            .send()
            .await
            .context("sign-out request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(auth_error(&text).into());
        }
        info!("[Auth] Signed out");
        Ok(())
    }

    /// Send a password recovery email.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let response = self
            .authed(self.http.post(self.auth_endpoint("/recover")))
            .json(&RecoverRequest { email })
            .send()
            .await
            .context("password reset request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(auth_error(&text).into());
        }
        Ok(())
    }

    /// Update the signed-in user's password or metadata.
    pub async fn update_user(&self, update: &UserUpdate) -> Result<UserProfile> {
        let response = self
            .authed(self.http.put(self.auth_endpoint("/user")))
            .json(update)
            .send()
            .await
            .context("user update request failed")?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(auth_error(&text).into());
        }

        let user: WireUser =
            serde_json::from_str(&text).context("malformed user update response")?;
        Ok(profile_from_wire(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_auth_errors() {
        assert_eq!(
            friendly_auth_message("Invalid login credentials"),
            "Invalid email or password. Please check your credentials and try again."
        );
        assert_eq!(
            friendly_auth_message("AuthApiError: User already registered"),
            "An account with this email already exists. Please sign in instead."
        );
        assert_eq!(
            friendly_auth_message("Password should be at least 8 characters"),
            "Password must be at least 8 characters long."
        );
    }

    #[test]
    fn unknown_auth_errors_pass_through() {
        assert_eq!(friendly_auth_message("service unavailable"), "service unavailable");
    }

    #[test]
    fn extracts_message_from_varied_bodies() {
        assert_eq!(
            remote_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(remote_message(r#"{"msg":"Email not confirmed"}"#), "Email not confirmed");
        assert_eq!(remote_message("plain text failure"), "plain text failure");
    }

    #[test]
    fn token_response_prefers_explicit_expiry() {
        let raw = r#"{
            "access_token": "jwt",
            "refresh_token": "refresh",
            "expires_in": 3600,
            "expires_at": 1755770000,
            "user": {
                "id": "6fa459ea-ee8a-3ca4-894e-db77e160355e",
                "email": "grower@example.com",
                "user_metadata": {"full_name": "A Grower"}
            }
        }"#;
        let token: TokenResponse = serde_json::from_str(raw).unwrap();
        let session = token.into_session();
        assert_eq!(session.expires_at.timestamp(), 1755770000);
        assert_eq!(session.user.email, "grower@example.com");
        assert_eq!(session.user.full_name.as_deref(), Some("A Grower"));
    }
}
