//! User identity and session types shared across the auth and persistence
//! layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// An auth session as persisted between invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_session_is_detected() {
        let user = UserProfile {
            id: Uuid::new_v4(),
            email: "grower@example.com".to_string(),
            full_name: None,
            avatar_url: None,
            created_at: None,
        };
        let session = Session {
            access_token: "tok".to_string(),
            refresh_token: "ref".to_string(),
            expires_at: Utc::now() - chrono::Duration::minutes(5),
            user,
        };
        assert!(session.is_expired());
    }
}
